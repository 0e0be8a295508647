use super::{mapping::VertexMapping, EditOperation};
use crate::graph::{Edge, SchemaGraph, VertexId, VertexKind};
use std::collections::BTreeMap;

/// The operations realizing `mapping`, in their canonical order.
pub(super) fn operations(old: &SchemaGraph, new: &SchemaGraph, mapping: &VertexMapping) -> Vec<EditOperation> {
    let mut operations = Vec::new();

    for (source, vertex) in old.vertices() {
        match mapping.image(source) {
            None => operations.push(EditOperation::DeleteVertex { source }),
            Some(target) => {
                let other = &new[target];

                if vertex.name() != other.name() || vertex.properties() != other.properties() {
                    operations.push(EditOperation::ChangeVertex { source, target });
                }
            }
        }
    }

    for (target, _) in new.vertices() {
        if mapping.preimage(target).is_none() {
            operations.push(EditOperation::InsertVertex { target });
        }
    }

    // Edges between mapped endpoints, keyed by the new endpoints.
    let mut groups: BTreeMap<(VertexId, VertexId), (Vec<Edge<'_>>, Vec<Edge<'_>>)> = BTreeMap::new();

    for edge in old.edges() {
        match (mapping.image(edge.one), mapping.image(edge.two)) {
            (Some(one), Some(two)) => groups.entry((one, two)).or_default().0.push(edge),
            _ => operations.push(EditOperation::DeleteEdge { source: edge.id }),
        }
    }

    for edge in new.edges() {
        match (mapping.preimage(edge.one), mapping.preimage(edge.two)) {
            (Some(_), Some(_)) => groups.entry((edge.one, edge.two)).or_default().1.push(edge),
            _ => operations.push(EditOperation::InsertEdge { target: edge.id }),
        }
    }

    for (mut old_edges, mut new_edges) in groups.into_values() {
        old_edges.sort_by_key(|edge| (edge.label, edge.id));
        new_edges.sort_by_key(|edge| (edge.label, edge.id));

        let (old_edges, new_edges) = without_common_labels(old_edges, new_edges);
        let mut old_edges = old_edges.into_iter();
        let mut new_edges = new_edges.into_iter();

        loop {
            match (old_edges.next(), new_edges.next()) {
                (Some(source), Some(target)) => operations.push(EditOperation::ChangeEdge {
                    source: source.id,
                    target: target.id,
                }),
                (Some(source), None) => operations.push(EditOperation::DeleteEdge { source: source.id }),
                (None, Some(target)) => operations.push(EditOperation::InsertEdge { target: target.id }),
                (None, None) => break,
            }
        }
    }

    operations.sort_by_cached_key(|operation| order_key(old, new, operation));
    operations
}

/// Both lists must be sorted by label.
fn without_common_labels<'a>(old_edges: Vec<Edge<'a>>, new_edges: Vec<Edge<'a>>) -> (Vec<Edge<'a>>, Vec<Edge<'a>>) {
    let mut remaining_old = Vec::new();
    let mut remaining_new = Vec::new();
    let mut old_edges = old_edges.into_iter().peekable();
    let mut new_edges = new_edges.into_iter().peekable();

    loop {
        match (old_edges.peek(), new_edges.peek()) {
            (Some(source), Some(target)) => match source.label.cmp(target.label) {
                std::cmp::Ordering::Less => remaining_old.extend(old_edges.next()),
                std::cmp::Ordering::Greater => remaining_new.extend(new_edges.next()),
                std::cmp::Ordering::Equal => {
                    old_edges.next();
                    new_edges.next();
                }
            },
            (Some(_), None) => remaining_old.extend(old_edges.next()),
            (None, Some(_)) => remaining_new.extend(new_edges.next()),
            (None, None) => break,
        }
    }

    (remaining_old, remaining_new)
}

/// Vertex operations first, ordered by kind, name and path. Then edge operations, ordered by
/// their endpoints and label.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum OrderKey<'a> {
    Vertex {
        kind: VertexKind,
        name: &'a str,
        path: &'a str,
        rank: u8,
        id: usize,
    },
    Edge {
        one_kind: VertexKind,
        one_path: &'a str,
        two_kind: VertexKind,
        two_path: &'a str,
        label: &'a str,
        rank: u8,
        id: usize,
    },
}

fn order_key<'a>(old: &'a SchemaGraph, new: &'a SchemaGraph, operation: &EditOperation) -> OrderKey<'a> {
    let (graph, rank) = match operation {
        EditOperation::DeleteVertex { .. } | EditOperation::DeleteEdge { .. } => (old, 0),
        EditOperation::ChangeVertex { .. } | EditOperation::ChangeEdge { .. } => (new, 1),
        EditOperation::InsertVertex { .. } | EditOperation::InsertEdge { .. } => (new, 2),
    };

    match *operation {
        EditOperation::DeleteVertex { source: id }
        | EditOperation::ChangeVertex { target: id, .. }
        | EditOperation::InsertVertex { target: id } => {
            let vertex = &graph[id];

            OrderKey::Vertex {
                kind: vertex.kind(),
                name: vertex.name(),
                path: vertex.path(),
                rank,
                id: id.index(),
            }
        }
        EditOperation::DeleteEdge { source: id }
        | EditOperation::ChangeEdge { target: id, .. }
        | EditOperation::InsertEdge { target: id } => match graph.edge(id) {
            Some(edge) => {
                let (one, two) = (&graph[edge.one], &graph[edge.two]);

                OrderKey::Edge {
                    one_kind: one.kind(),
                    one_path: one.path(),
                    two_kind: two.kind(),
                    two_path: two.path(),
                    label: edge.label,
                    rank,
                    id: id.index(),
                }
            }
            // Operations are built from the edges of these graphs.
            None => OrderKey::Edge {
                one_kind: VertexKind::AppliedDirective,
                one_path: "",
                two_kind: VertexKind::AppliedDirective,
                two_path: "",
                label: "",
                rank,
                id: id.index(),
            },
        },
    }
}
