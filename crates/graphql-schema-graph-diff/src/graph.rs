//! The typed graph representation of one schema snapshot.

mod builder;
mod dot;
pub(crate) mod label;
mod vertex;

pub use vertex::{Vertex, VertexKind, IS_BUILT_IN_SCALAR};

use crate::GraphConsistencyError;
use petgraph::{
    graph::{DiGraph, EdgeIndex, NodeIndex},
    visit::EdgeRef,
    Direction,
};
use std::{
    collections::{BTreeMap, HashMap},
    fmt,
};

/// Opaque identity of a vertex inside of one [SchemaGraph].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VertexId(NodeIndex);

impl VertexId {
    pub fn index(self) -> usize {
        self.0.index()
    }
}

impl fmt::Debug for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0.index())
    }
}

/// Opaque identity of an edge inside of one [SchemaGraph].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(EdgeIndex);

impl EdgeId {
    pub fn index(self) -> usize {
        self.0.index()
    }
}

impl fmt::Debug for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0.index())
    }
}

/// A directed, labelled relationship between two vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge<'a> {
    pub id: EdgeId,
    pub one: VertexId,
    pub two: VertexId,
    pub label: &'a str,
}

/// The vertices and edges of one schema, with lookup indices. Immutable once built, see
/// [SchemaGraph::build()] and [SchemaGraphBuilder].
#[derive(Debug, Clone)]
pub struct SchemaGraph {
    graph: DiGraph<Vertex, String>,
    by_kind: BTreeMap<VertexKind, Vec<VertexId>>,
    by_path: HashMap<(VertexKind, String), VertexId>,
    parents: HashMap<VertexId, VertexId>,
}

impl SchemaGraph {
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.graph.node_weight(id.0)
    }

    pub fn edge(&self, id: EdgeId) -> Option<Edge<'_>> {
        let (one, two) = self.graph.edge_endpoints(id.0)?;
        let label = self.graph.edge_weight(id.0)?;

        Some(Edge {
            id,
            one: VertexId(one),
            two: VertexId(two),
            label,
        })
    }

    /// All vertices, in insertion order.
    pub fn vertices(&self) -> impl ExactSizeIterator<Item = (VertexId, &Vertex)> {
        self.graph
            .node_indices()
            .map(|index| (VertexId(index), &self.graph[index]))
    }

    /// All edges, in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = Edge<'_>> {
        self.graph.edge_references().map(|edge| Edge {
            id: EdgeId(edge.id()),
            one: VertexId(edge.source()),
            two: VertexId(edge.target()),
            label: edge.weight(),
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn vertices_of_kind(&self, kind: VertexKind) -> &[VertexId] {
        self.by_kind.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }

    /// The vertex of `kind` at `path`, e.g. `(VertexKind::Field, "Query.user")`.
    pub fn vertex_by_path(&self, kind: VertexKind, path: &str) -> Option<VertexId> {
        self.by_path.get(&(kind, path.to_owned())).copied()
    }

    /// The element owning a field, argument, enum value or applied directive.
    pub fn parent(&self, id: VertexId) -> Option<VertexId> {
        self.parents.get(&id).copied()
    }

    /// The OBJECT, INTERFACE or INPUT_OBJECT vertex owning a FIELD or INPUT_FIELD vertex.
    pub fn container_of_field(&self, field: VertexId) -> Option<VertexId> {
        let vertex = self.vertex(field)?;

        if !matches!(vertex.kind(), VertexKind::Field | VertexKind::InputField) {
            return None;
        }

        self.parent(field)
            .filter(|container| self[*container].kind().is_fields_container())
    }

    /// The parent chain of a vertex, closest first.
    pub fn ancestors(&self, id: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        std::iter::successors(self.parent(id), |current| self.parent(*current))
    }

    pub fn outgoing_edges(&self, id: VertexId) -> impl Iterator<Item = Edge<'_>> {
        self.edges_directed(id, Direction::Outgoing)
    }

    pub fn incoming_edges(&self, id: VertexId) -> impl Iterator<Item = Edge<'_>> {
        self.edges_directed(id, Direction::Incoming)
    }

    pub(crate) fn edges_directed(&self, id: VertexId, direction: Direction) -> impl Iterator<Item = Edge<'_>> {
        self.graph.edges_directed(id.0, direction).map(|edge| Edge {
            id: EdgeId(edge.id()),
            one: VertexId(edge.source()),
            two: VertexId(edge.target()),
            label: edge.weight(),
        })
    }
}

impl std::ops::Index<VertexId> for SchemaGraph {
    type Output = Vertex;

    fn index(&self, id: VertexId) -> &Self::Output {
        &self.graph[id.0]
    }
}

/// Assembles a [SchemaGraph] vertex by vertex. The parent index is derived from the ownership
/// edges (`field`, `input-field`, `argument`, `enum-value` and `applied-directive`).
#[derive(Debug, Default)]
pub struct SchemaGraphBuilder {
    graph: DiGraph<Vertex, String>,
}

impl SchemaGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_vertex(&mut self, vertex: Vertex) -> VertexId {
        VertexId(self.graph.add_node(vertex))
    }

    pub fn push_edge(
        &mut self,
        one: VertexId,
        two: VertexId,
        label: impl Into<String>,
    ) -> Result<EdgeId, GraphConsistencyError> {
        for id in [one, two] {
            if self.graph.node_weight(id.0).is_none() {
                return Err(GraphConsistencyError::UnknownVertex { id: id.index() });
            }
        }

        Ok(EdgeId(self.graph.add_edge(one.0, two.0, label.into())))
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.graph.node_weight(id.0)
    }

    pub fn finish(self) -> Result<SchemaGraph, GraphConsistencyError> {
        let SchemaGraphBuilder { graph } = self;

        let mut by_kind: BTreeMap<VertexKind, Vec<VertexId>> = BTreeMap::new();
        let mut by_path = HashMap::with_capacity(graph.node_count());

        for index in graph.node_indices() {
            let vertex = &graph[index];
            by_kind.entry(vertex.kind()).or_default().push(VertexId(index));

            if by_path
                .insert((vertex.kind(), vertex.path().to_owned()), VertexId(index))
                .is_some()
            {
                return Err(GraphConsistencyError::DuplicateElement {
                    kind: vertex.kind(),
                    path: vertex.path().to_owned(),
                });
            }
        }

        let mut parents = HashMap::new();

        for edge in graph.edge_references() {
            if !label::OWNERSHIP.contains(&edge.weight().as_str()) {
                continue;
            }

            let child = VertexId(edge.target());

            if parents.insert(child, VertexId(edge.source())).is_some() {
                return Err(GraphConsistencyError::MultipleParents {
                    path: graph[edge.target()].path().to_owned(),
                });
            }
        }

        Ok(SchemaGraph {
            graph,
            by_kind,
            by_path,
            parents,
        })
    }
}
