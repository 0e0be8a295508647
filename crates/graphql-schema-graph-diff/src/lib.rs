//! Semantic diffing of GraphQL schemas.
//!
//! Both schemas are turned into typed graphs ([SchemaGraph]), a near-minimal edit script between
//! the graphs is computed ([compute_edit_script()]), and the edit operations are classified into
//! [SchemaChange]s ([EditOperationAnalyzer]).

#![cfg_attr(test, allow(unused_crate_dependencies))]

mod analyzer;
mod change;
mod diff_config;
mod edit_script;
mod error;
mod graph;
mod schema;

pub use self::{
    analyzer::{Analysis, AnalyzeError, EditOperationAnalyzer, GraphSide},
    change::*,
    diff_config::{DiffConfig, SearchBudget},
    edit_script::{compute_edit_script, EditOperation, EditOperationKind, EditScript},
    error::{Error, GraphConsistencyError},
    graph::{Edge, EdgeId, SchemaGraph, SchemaGraphBuilder, Vertex, VertexId, VertexKind, IS_BUILT_IN_SCALAR},
    schema::*,
};

/// Everything computed while diffing two schemas, for auditing and visualization.
#[derive(Debug, Clone)]
pub struct DiffReport {
    pub old_graph: SchemaGraph,
    pub new_graph: SchemaGraph,
    pub edit_script: EditScript,
    pub diff: SchemaDiff,
}

/// Diff two GraphQL SDL documents with the default [DiffConfig].
#[cfg(feature = "from_sdl")]
pub fn diff(source: &str, target: &str) -> Result<SchemaDiff, Error> {
    diff_with_config(source, target, DiffConfig::default())
}

/// Diff two GraphQL SDL documents.
#[cfg(feature = "from_sdl")]
pub fn diff_with_config(source: &str, target: &str, config: DiffConfig) -> Result<SchemaDiff, Error> {
    let old = TypeSystem::from_sdl(source)?;
    let new = TypeSystem::from_sdl(target)?;

    diff_schemas(&old, &new, &config)
}

/// Diff two resolved type systems.
pub fn diff_schemas(old: &TypeSystem, new: &TypeSystem, config: &DiffConfig) -> Result<SchemaDiff, Error> {
    diff_schemas_detailed(old, new, config).map(|report| report.diff)
}

/// Same as [diff_schemas()], also returning the graphs and the edit script.
pub fn diff_schemas_detailed(old: &TypeSystem, new: &TypeSystem, config: &DiffConfig) -> Result<DiffReport, Error> {
    let old_graph = SchemaGraph::build(old)?;
    let new_graph = SchemaGraph::build(new)?;

    let edit_script = compute_edit_script(&old_graph, &new_graph, config);

    let Analysis { changes, unclassified } =
        EditOperationAnalyzer::new(old, new, &old_graph, &new_graph, config).analyze(edit_script.operations())?;

    let diff = SchemaDiff {
        changes,
        unclassified,
        approximate: edit_script.is_approximate(),
    };

    Ok(DiffReport {
        old_graph,
        new_graph,
        edit_script,
        diff,
    })
}
