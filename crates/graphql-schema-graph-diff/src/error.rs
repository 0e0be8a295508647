use crate::{graph::VertexKind, AnalyzeError};

/// The type system handed to the graph builder breaks an invariant of a valid schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphConsistencyError {
    #[error("{location} references the undefined type {name}")]
    DanglingTypeReference { location: String, name: String },
    #[error("{implementer} implements {name}, which is not an interface")]
    NotAnInterface { implementer: String, name: String },
    #[error("The union {union} has {member} as a member, which is not an object type")]
    InvalidUnionMember { union: String, member: String },
    #[error("The {kind} {path} is defined more than once")]
    DuplicateElement { kind: VertexKind, path: String },
    #[error("{path} is owned by more than one element")]
    MultipleParents { path: String },
    #[error("Edge endpoint v{id} is not a vertex of the graph")]
    UnknownVertex { id: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[cfg(feature = "from_sdl")]
    #[error(transparent)]
    Parse(#[from] crate::FromSdlError),
    #[error(transparent)]
    GraphConsistency(#[from] GraphConsistencyError),
    #[error(transparent)]
    Analyze(#[from] AnalyzeError),
}
