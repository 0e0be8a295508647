//! Graph edit distance between two [SchemaGraph]s.
//!
//! Vertices are first anchored by kind and path. The remaining vertices are matched by a bounded
//! branch-and-bound search, then the operations are emitted in a fixed total order.

mod emit;
mod mapping;
mod search;

use self::{mapping::VertexMapping, search::ResidualSearch};
use crate::{
    graph::{EdgeId, SchemaGraph, VertexId},
    DiffConfig,
};

/// One step transforming the old graph into the new one. `source` ids refer to the old graph,
/// `target` ids to the new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditOperation {
    InsertVertex { target: VertexId },
    DeleteVertex { source: VertexId },
    ChangeVertex { source: VertexId, target: VertexId },
    InsertEdge { target: EdgeId },
    DeleteEdge { source: EdgeId },
    ChangeEdge { source: EdgeId, target: EdgeId },
}

impl EditOperation {
    pub fn kind(&self) -> EditOperationKind {
        match self {
            EditOperation::InsertVertex { .. } => EditOperationKind::InsertVertex,
            EditOperation::DeleteVertex { .. } => EditOperationKind::DeleteVertex,
            EditOperation::ChangeVertex { .. } => EditOperationKind::ChangeVertex,
            EditOperation::InsertEdge { .. } => EditOperationKind::InsertEdge,
            EditOperation::DeleteEdge { .. } => EditOperationKind::DeleteEdge,
            EditOperation::ChangeEdge { .. } => EditOperationKind::ChangeEdge,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum EditOperationKind {
    InsertVertex,
    DeleteVertex,
    ChangeVertex,
    InsertEdge,
    DeleteEdge,
    ChangeEdge,
}

impl EditOperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EditOperationKind::InsertVertex => "INSERT_VERTEX",
            EditOperationKind::DeleteVertex => "DELETE_VERTEX",
            EditOperationKind::ChangeVertex => "CHANGE_VERTEX",
            EditOperationKind::InsertEdge => "INSERT_EDGE",
            EditOperationKind::DeleteEdge => "DELETE_EDGE",
            EditOperationKind::ChangeEdge => "CHANGE_EDGE",
        }
    }
}

impl std::fmt::Display for EditOperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The ordered operations transforming the old graph into the new one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditScript {
    operations: Vec<EditOperation>,
    approximate: bool,
}

impl EditScript {
    pub fn operations(&self) -> &[EditOperation] {
        &self.operations
    }

    /// Every operation costs 1.
    pub fn cost(&self) -> usize {
        self.operations.len()
    }

    /// The search budget ran out and residual vertices were not matched: the script is valid but
    /// may be longer than necessary.
    pub fn is_approximate(&self) -> bool {
        self.approximate
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Compute a near-minimal edit script from `old` to `new`. The result only depends on the two
/// graphs: the number of worker threads does not influence it, as long as the search completes
/// within its budget.
pub fn compute_edit_script(old: &SchemaGraph, new: &SchemaGraph, config: &DiffConfig) -> EditScript {
    let mut mapping = VertexMapping::anchored(old, new);
    let search = ResidualSearch::new(old, new, &mapping);

    tracing::debug!(
        anchored = mapping.len(),
        searched_old = search.old_len(),
        searched_new = search.new_len(),
        "Anchored vertices"
    );

    let approximate = match search.solve(config) {
        Some(pairs) => {
            for (source, target) in pairs {
                mapping.insert(source, target);
            }
            false
        }
        None => {
            tracing::warn!(
                max_expansions = config.search_budget().max_expansions,
                "Search budget exhausted, falling back to the anchored mapping"
            );
            true
        }
    };

    let operations = emit::operations(old, new, &mapping);

    tracing::debug!(operations = operations.len(), approximate, "Computed edit script");

    EditScript {
        operations,
        approximate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{SchemaGraphBuilder, Vertex, VertexKind};

    fn graph(types: &[(VertexKind, &str)]) -> SchemaGraph {
        let mut builder = SchemaGraphBuilder::new();

        for (kind, name) in types {
            builder.push_vertex(Vertex::new(*kind, *name, *name));
        }

        builder.finish().unwrap()
    }

    #[test]
    fn identical_graphs_have_an_empty_script() {
        let old = graph(&[(VertexKind::Object, "Query"), (VertexKind::Scalar, "Date")]);
        let new = old.clone();

        let script = compute_edit_script(&old, &new, &DiffConfig::default());

        assert!(script.is_empty());
        assert_eq!(script.cost(), 0);
        assert!(!script.is_approximate());
    }

    #[test]
    fn renamed_vertex_is_a_single_change() {
        let old = graph(&[(VertexKind::Scalar, "Date")]);
        let new = graph(&[(VertexKind::Scalar, "DateTime")]);

        let script = compute_edit_script(&old, &new, &DiffConfig::default());

        assert_eq!(script.operations().len(), 1);
        assert_eq!(script.operations()[0].kind(), EditOperationKind::ChangeVertex);
    }

    #[test]
    fn vertices_of_different_kinds_are_never_matched() {
        let old = graph(&[(VertexKind::Scalar, "Date")]);
        let new = graph(&[(VertexKind::Enum, "Date")]);

        let script = compute_edit_script(&old, &new, &DiffConfig::default());
        let kinds: Vec<_> = script.operations().iter().map(EditOperation::kind).collect();

        assert_eq!(kinds, [EditOperationKind::InsertVertex, EditOperationKind::DeleteVertex]);
    }
}
