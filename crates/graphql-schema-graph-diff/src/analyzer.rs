//! Classification of edit operations into [SchemaChange]s.

use crate::{
    edit_script::{EditOperation, EditOperationKind},
    graph::{label, Edge, EdgeId, SchemaGraph, Vertex, VertexId, VertexKind},
    AddedInterfaceToObjectDetail, DiffConfig, ElementRef, ObjectChangeDetail, PropertyChange, SchemaChange,
    TypeChangeDetail, TypeSystem, UnclassifiedEdge,
};
use indexmap::IndexMap;
use std::{collections::HashSet, fmt};

/// Which of the two diffed schemas an id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphSide {
    Old,
    New,
}

impl fmt::Display for GraphSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GraphSide::Old => "old",
            GraphSide::New => "new",
        })
    }
}

/// An edit operation does not fit the graphs or type systems it is analyzed against.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalyzeError {
    #[error("{operation} references the vertex v{id}, which is not in the {side} graph")]
    MissingVertex {
        operation: EditOperationKind,
        id: usize,
        side: GraphSide,
    },
    #[error("{operation} references the edge e{id}, which is not in the {side} graph")]
    MissingEdge {
        operation: EditOperationKind,
        id: usize,
        side: GraphSide,
    },
    #[error("The {kind} {path} has no parent in the {side} graph")]
    MissingContainer {
        kind: VertexKind,
        path: String,
        side: GraphSide,
    },
    #[error("The {kind} {name} is not defined in the {side} type system")]
    UndefinedType {
        kind: VertexKind,
        name: String,
        side: GraphSide,
    },
}

/// The output of [EditOperationAnalyzer::analyze()].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Analysis {
    pub changes: Vec<SchemaChange>,
    pub unclassified: Vec<UnclassifiedEdge>,
}

/// Turns the edit operations between two schemas into [SchemaChange]s. One analyzer handles a
/// single list of operations.
pub struct EditOperationAnalyzer<'a> {
    old_schema: &'a TypeSystem,
    new_schema: &'a TypeSystem,
    old_graph: &'a SchemaGraph,
    new_graph: &'a SchemaGraph,
    config: &'a DiffConfig,
    inserted: HashSet<VertexId>,
    deleted: HashSet<VertexId>,
    changes: Vec<SchemaChange>,
    object_changes: IndexMap<String, Vec<ObjectChangeDetail>>,
    interface_changes: IndexMap<String, Vec<TypeChangeDetail>>,
    unclassified: Vec<UnclassifiedEdge>,
}

impl<'a> EditOperationAnalyzer<'a> {
    pub fn new(
        old_schema: &'a TypeSystem,
        new_schema: &'a TypeSystem,
        old_graph: &'a SchemaGraph,
        new_graph: &'a SchemaGraph,
        config: &'a DiffConfig,
    ) -> Self {
        EditOperationAnalyzer {
            old_schema,
            new_schema,
            old_graph,
            new_graph,
            config,
            inserted: HashSet::new(),
            deleted: HashSet::new(),
            changes: Vec::new(),
            object_changes: IndexMap::new(),
            interface_changes: IndexMap::new(),
            unclassified: Vec::new(),
        }
    }

    /// Classify `operations` in the order they are given. Simple changes come first, then the
    /// object and interface changes, each in the order they were first seen.
    pub fn analyze(mut self, operations: &[EditOperation]) -> Result<Analysis, AnalyzeError> {
        for operation in operations {
            match *operation {
                EditOperation::InsertVertex { target } => {
                    self.inserted.insert(target);
                }
                EditOperation::DeleteVertex { source } => {
                    self.deleted.insert(source);
                }
                _ => (),
            }
        }

        for operation in operations {
            tracing::trace!(?operation, "Analyzing");

            match *operation {
                EditOperation::InsertVertex { target } => self.handle_vertex(GraphSide::New, target)?,
                EditOperation::DeleteVertex { source } => self.handle_vertex(GraphSide::Old, source)?,
                EditOperation::ChangeVertex { source, target } => self.changed_vertex(source, target)?,
                EditOperation::InsertEdge { target } => self.inserted_edge(target)?,
                EditOperation::DeleteEdge { source } => self.deleted_edge(source)?,
                EditOperation::ChangeEdge { source, target } => self.changed_edge(source, target)?,
            }
        }

        let EditOperationAnalyzer {
            mut changes,
            object_changes,
            interface_changes,
            unclassified,
            ..
        } = self;

        changes.extend(
            object_changes
                .into_iter()
                .map(|(name, details)| SchemaChange::ObjectChanged { name, details }),
        );

        changes.extend(
            interface_changes
                .into_iter()
                .map(|(name, details)| SchemaChange::InterfaceChanged { name, details }),
        );

        tracing::debug!(
            operations = operations.len(),
            changes = changes.len(),
            unclassified = unclassified.len(),
            "Analyzed edit operations"
        );

        Ok(Analysis { changes, unclassified })
    }

    fn graph(&self, side: GraphSide) -> &'a SchemaGraph {
        match side {
            GraphSide::Old => self.old_graph,
            GraphSide::New => self.new_graph,
        }
    }

    fn vertex(&self, side: GraphSide, id: VertexId, operation: EditOperationKind) -> Result<&'a Vertex, AnalyzeError> {
        self.graph(side).vertex(id).ok_or(AnalyzeError::MissingVertex {
            operation,
            id: id.index(),
            side,
        })
    }

    fn edge(&self, side: GraphSide, id: EdgeId, operation: EditOperationKind) -> Result<Edge<'a>, AnalyzeError> {
        self.graph(side).edge(id).ok_or(AnalyzeError::MissingEdge {
            operation,
            id: id.index(),
            side,
        })
    }

    /// Inserted vertices are reported from the new graph, deleted ones from the old graph.
    fn handle_vertex(&mut self, side: GraphSide, id: VertexId) -> Result<(), AnalyzeError> {
        let operation = match side {
            GraphSide::New => EditOperationKind::InsertVertex,
            GraphSide::Old => EditOperationKind::DeleteVertex,
        };

        let vertex = self.vertex(side, id, operation)?;

        if vertex.is_built_in_scalar() {
            return Ok(());
        }

        let (verbose, touched) = match side {
            GraphSide::New => (self.config.additions_inside_type_definitions, &self.inserted),
            GraphSide::Old => (self.config.removals_inside_type_definitions, &self.deleted),
        };

        if !verbose && self.graph(side).ancestors(id).any(|ancestor| touched.contains(&ancestor)) {
            tracing::trace!(path = vertex.path(), "Nested in a definition reported on its own");
            return Ok(());
        }

        self.ensure_defined(side, vertex)?;

        let name = vertex.name().to_owned();
        let added = side == GraphSide::New;

        let change = match vertex.kind() {
            VertexKind::Object if added => SchemaChange::ObjectAdded { name },
            VertexKind::Object => SchemaChange::ObjectRemoved { name },
            VertexKind::Interface if added => SchemaChange::InterfaceAdded { name },
            VertexKind::Interface => SchemaChange::InterfaceRemoved { name },
            VertexKind::Union if added => SchemaChange::UnionAdded { name },
            VertexKind::Union => SchemaChange::UnionRemoved { name },
            VertexKind::InputObject if added => SchemaChange::InputObjectAdded { name },
            VertexKind::InputObject => SchemaChange::InputObjectRemoved { name },
            VertexKind::Enum if added => SchemaChange::EnumAdded { name },
            VertexKind::Enum => SchemaChange::EnumRemoved { name },
            VertexKind::Scalar if added => SchemaChange::ScalarAdded { name },
            VertexKind::Scalar => SchemaChange::ScalarRemoved { name },
            VertexKind::Directive if added => SchemaChange::DirectiveAdded { name },
            VertexKind::Directive => SchemaChange::DirectiveRemoved { name },
            VertexKind::Field => {
                let container = self.container_name(side, id, vertex)?;

                if added {
                    SchemaChange::FieldAdded { name, container }
                } else {
                    SchemaChange::FieldRemoved { name, container }
                }
            }
            VertexKind::InputField => {
                let container = self.container_name(side, id, vertex)?;

                if added {
                    SchemaChange::InputFieldAdded { name, container }
                } else {
                    SchemaChange::InputFieldRemoved { name, container }
                }
            }
            VertexKind::Argument => {
                let parent = self.parent(side, id, vertex)?.path().to_owned();

                if added {
                    SchemaChange::ArgumentAdded { name, parent }
                } else {
                    SchemaChange::ArgumentRemoved { name, parent }
                }
            }
            VertexKind::EnumValue => {
                let enum_name = self.parent(side, id, vertex)?.name().to_owned();

                if added {
                    SchemaChange::EnumValueAdded { name, enum_name }
                } else {
                    SchemaChange::EnumValueRemoved { name, enum_name }
                }
            }
            VertexKind::AppliedDirective => {
                let target = self.parent(side, id, vertex)?.path().to_owned();

                if added {
                    SchemaChange::AppliedDirectiveAdded { name, target }
                } else {
                    SchemaChange::AppliedDirectiveRemoved { name, target }
                }
            }
        };

        self.changes.push(change);

        Ok(())
    }

    fn changed_vertex(&mut self, source: VertexId, target: VertexId) -> Result<(), AnalyzeError> {
        let operation = EditOperationKind::ChangeVertex;
        let old = self.vertex(GraphSide::Old, source, operation)?;
        let new = self.vertex(GraphSide::New, target, operation)?;

        if old.is_built_in_scalar() || new.is_built_in_scalar() {
            return Ok(());
        }

        self.ensure_defined(GraphSide::New, new)?;

        let details = change_details(old, new);

        if details.is_empty() {
            return Ok(());
        }

        let name = new.name().to_owned();

        let change = match new.kind() {
            VertexKind::Object => {
                self.object_changes
                    .entry(name)
                    .or_default()
                    .extend(details.into_iter().map(ObjectChangeDetail::from));

                return Ok(());
            }
            VertexKind::Interface => {
                self.interface_changes.entry(name).or_default().extend(details);

                return Ok(());
            }
            VertexKind::Union => SchemaChange::UnionChanged { name, details },
            VertexKind::InputObject => SchemaChange::InputObjectChanged { name, details },
            VertexKind::Enum => SchemaChange::EnumChanged { name, details },
            VertexKind::Scalar => SchemaChange::ScalarChanged { name, details },
            VertexKind::Directive => SchemaChange::DirectiveChanged { name, details },
            VertexKind::Field => SchemaChange::FieldChanged {
                name,
                container: self.container_name(GraphSide::New, target, new)?,
                details,
            },
            VertexKind::InputField => SchemaChange::InputFieldChanged {
                name,
                container: self.container_name(GraphSide::New, target, new)?,
                details,
            },
            VertexKind::Argument => SchemaChange::ArgumentChanged {
                name,
                parent: self.parent(GraphSide::New, target, new)?.path().to_owned(),
                details,
            },
            VertexKind::EnumValue => SchemaChange::EnumValueChanged {
                name,
                enum_name: self.parent(GraphSide::New, target, new)?.name().to_owned(),
                details,
            },
            VertexKind::AppliedDirective => SchemaChange::AppliedDirectiveChanged {
                name,
                target: self.parent(GraphSide::New, target, new)?.path().to_owned(),
                details,
            },
        };

        self.changes.push(change);

        Ok(())
    }

    fn inserted_edge(&mut self, id: EdgeId) -> Result<(), AnalyzeError> {
        let operation = EditOperationKind::InsertEdge;
        let edge = self.edge(GraphSide::New, id, operation)?;

        if label::is_implements(edge.label) {
            return self.inserted_implements_edge(edge, operation);
        }

        if self.inserted.contains(&edge.one) || self.inserted.contains(&edge.two) {
            return Ok(());
        }

        self.push_unclassified(operation, GraphSide::New, edge, None)
    }

    /// `implements` edges point from the implementer to the interface, but either orientation
    /// is accepted.
    fn inserted_implements_edge(&mut self, edge: Edge<'a>, operation: EditOperationKind) -> Result<(), AnalyzeError> {
        let one = self.vertex(GraphSide::New, edge.one, operation)?;
        let two = self.vertex(GraphSide::New, edge.two, operation)?;

        let (object_id, object, interface) = match (one.kind(), two.kind()) {
            (VertexKind::Object, VertexKind::Interface) => (edge.one, one, two),
            (VertexKind::Interface, VertexKind::Object) => (edge.two, two, one),
            _ if self.inserted.contains(&edge.one) || self.inserted.contains(&edge.two) => return Ok(()),
            _ => return self.push_unclassified(operation, GraphSide::New, edge, None),
        };

        if !self.config.additions_inside_type_definitions && self.inserted.contains(&object_id) {
            return Ok(());
        }

        self.object_changes
            .entry(object.name().to_owned())
            .or_default()
            .push(ObjectChangeDetail::AddedInterfaceToObject(AddedInterfaceToObjectDetail {
                interface_name: interface.name().to_owned(),
            }));

        Ok(())
    }

    fn deleted_edge(&mut self, id: EdgeId) -> Result<(), AnalyzeError> {
        let operation = EditOperationKind::DeleteEdge;
        let edge = self.edge(GraphSide::Old, id, operation)?;

        if self.deleted.contains(&edge.one) || self.deleted.contains(&edge.two) {
            return Ok(());
        }

        self.push_unclassified(operation, GraphSide::Old, edge, None)
    }

    fn changed_edge(&mut self, source: EdgeId, target: EdgeId) -> Result<(), AnalyzeError> {
        let operation = EditOperationKind::ChangeEdge;
        let old = self.edge(GraphSide::Old, source, operation)?;
        let new = self.edge(GraphSide::New, target, operation)?;

        self.push_unclassified(operation, GraphSide::New, new, Some(old.label))
    }

    fn push_unclassified(
        &mut self,
        operation: EditOperationKind,
        side: GraphSide,
        edge: Edge<'a>,
        old_label: Option<&str>,
    ) -> Result<(), AnalyzeError> {
        let one = self.vertex(side, edge.one, operation)?;
        let two = self.vertex(side, edge.two, operation)?;

        tracing::trace!(%operation, label = edge.label, one = one.path(), two = two.path(), "Unclassified edge operation");

        self.unclassified.push(UnclassifiedEdge {
            operation,
            label: edge.label.to_owned(),
            old_label: old_label.map(str::to_owned),
            one: element_ref(one),
            two: element_ref(two),
        });

        Ok(())
    }

    fn parent(&self, side: GraphSide, id: VertexId, vertex: &Vertex) -> Result<&'a Vertex, AnalyzeError> {
        let graph = self.graph(side);

        graph
            .parent(id)
            .and_then(|parent| graph.vertex(parent))
            .ok_or_else(|| AnalyzeError::MissingContainer {
                kind: vertex.kind(),
                path: vertex.path().to_owned(),
                side,
            })
    }

    fn container_name(&self, side: GraphSide, id: VertexId, vertex: &Vertex) -> Result<String, AnalyzeError> {
        let graph = self.graph(side);

        graph
            .container_of_field(id)
            .and_then(|container| graph.vertex(container))
            .map(|container| container.name().to_owned())
            .ok_or_else(|| AnalyzeError::MissingContainer {
                kind: vertex.kind(),
                path: vertex.path().to_owned(),
                side,
            })
    }

    /// Type and directive vertices must come from the type system of their side.
    fn ensure_defined(&self, side: GraphSide, vertex: &Vertex) -> Result<(), AnalyzeError> {
        let schema = match side {
            GraphSide::Old => self.old_schema,
            GraphSide::New => self.new_schema,
        };

        let defined = match vertex.kind() {
            VertexKind::Object
            | VertexKind::Interface
            | VertexKind::Union
            | VertexKind::InputObject
            | VertexKind::Enum
            | VertexKind::Scalar => schema.type_definition(vertex.name()).is_some(),
            VertexKind::Directive => schema.directive(vertex.name()).is_some(),
            VertexKind::Field
            | VertexKind::InputField
            | VertexKind::Argument
            | VertexKind::EnumValue
            | VertexKind::AppliedDirective => true,
        };

        if defined {
            Ok(())
        } else {
            Err(AnalyzeError::UndefinedType {
                kind: vertex.kind(),
                name: vertex.name().to_owned(),
                side,
            })
        }
    }
}

fn change_details(old: &Vertex, new: &Vertex) -> Vec<TypeChangeDetail> {
    let mut details = Vec::new();

    if old.name() != new.name() {
        details.push(TypeChangeDetail::Renamed {
            old_name: old.name().to_owned(),
        });
    }

    let keys = old
        .properties()
        .keys()
        .chain(new.properties().keys())
        .collect::<std::collections::BTreeSet<_>>();

    for key in keys {
        let (old_value, new_value) = (old.property(key), new.property(key));

        if old_value != new_value {
            details.push(TypeChangeDetail::PropertyChanged(PropertyChange {
                key: key.clone(),
                old: old_value.map(str::to_owned),
                new: new_value.map(str::to_owned),
            }));
        }
    }

    details
}

fn element_ref(vertex: &Vertex) -> ElementRef {
    ElementRef {
        kind: vertex.kind(),
        path: vertex.path().to_owned(),
    }
}

impl From<TypeChangeDetail> for ObjectChangeDetail {
    fn from(detail: TypeChangeDetail) -> Self {
        match detail {
            TypeChangeDetail::Renamed { old_name } => ObjectChangeDetail::Renamed { old_name },
            TypeChangeDetail::PropertyChanged(change) => ObjectChangeDetail::PropertyChanged(change),
        }
    }
}
