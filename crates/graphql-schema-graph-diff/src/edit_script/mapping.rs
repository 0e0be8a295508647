use crate::graph::{SchemaGraph, VertexId};

/// A partial bijection between the vertices of the old and the new graph.
#[derive(Debug, Clone)]
pub(super) struct VertexMapping {
    forward: Vec<Option<VertexId>>,
    backward: Vec<Option<VertexId>>,
    len: usize,
}

impl VertexMapping {
    /// Pairs every vertex with the vertex of the same kind and path on the other side, if any.
    pub(super) fn anchored(old: &SchemaGraph, new: &SchemaGraph) -> Self {
        let mut mapping = VertexMapping {
            forward: vec![None; old.vertex_count()],
            backward: vec![None; new.vertex_count()],
            len: 0,
        };

        for (source, vertex) in old.vertices() {
            if let Some(target) = new.vertex_by_path(vertex.kind(), vertex.path()) {
                mapping.insert(source, target);
            }
        }

        mapping
    }

    pub(super) fn insert(&mut self, source: VertexId, target: VertexId) {
        self.forward[source.index()] = Some(target);
        self.backward[target.index()] = Some(source);
        self.len += 1;
    }

    pub(super) fn image(&self, source: VertexId) -> Option<VertexId> {
        self.forward.get(source.index()).copied().flatten()
    }

    pub(super) fn preimage(&self, target: VertexId) -> Option<VertexId> {
        self.backward.get(target.index()).copied().flatten()
    }

    /// Number of mapped pairs.
    pub(super) fn len(&self) -> usize {
        self.len
    }
}
