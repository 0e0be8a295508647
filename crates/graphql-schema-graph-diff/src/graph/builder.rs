use super::{label, SchemaGraph, SchemaGraphBuilder, Vertex, VertexId, VertexKind, IS_BUILT_IN_SCALAR};
use crate::{
    schema::{
        is_built_in_scalar, AppliedDirective, DirectiveDefinition, FieldDefinition, InputValueDefinition, TypeDefinition,
        TypeDefinitionKind, TypeReference, TypeSystem,
    },
    GraphConsistencyError,
};
use std::collections::HashMap;

const DESCRIPTION: &str = "description";
const DEFAULT_VALUE: &str = "defaultValue";
const ARGUMENTS: &str = "arguments";
const REPEATABLE: &str = "repeatable";
const LOCATIONS: &str = "locations";

impl SchemaGraph {
    /// Build the graph of a resolved type system. Vertex ids are allocated in definition order,
    /// type and directive definitions first, so the same type system always yields the same
    /// graph.
    pub fn build(type_system: &TypeSystem) -> Result<SchemaGraph, GraphConsistencyError> {
        let mut builder = Builder {
            type_system,
            graph: SchemaGraphBuilder::new(),
            types: HashMap::with_capacity(type_system.types().len()),
            directives: HashMap::with_capacity(type_system.directives().len()),
        };

        let (type_ids, directive_ids) = builder.ingest_definitions();

        for (definition, type_id) in type_system.types().zip(type_ids) {
            builder.ingest_type_contents(type_id, definition)?;
        }

        for (definition, directive_id) in type_system.directives().zip(directive_ids) {
            builder.ingest_directive_contents(directive_id, definition)?;
        }

        let graph = builder.graph.finish()?;

        tracing::debug!(
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            "Built schema graph"
        );

        Ok(graph)
    }
}

struct Builder<'a> {
    type_system: &'a TypeSystem,
    graph: SchemaGraphBuilder,
    types: HashMap<&'a str, VertexId>,
    directives: HashMap<&'a str, VertexId>,
}

impl<'a> Builder<'a> {
    fn ingest_definitions(&mut self) -> (Vec<VertexId>, Vec<VertexId>) {
        let type_system = self.type_system;
        let mut type_ids = Vec::with_capacity(type_system.types().len());
        let mut directive_ids = Vec::with_capacity(type_system.directives().len());

        for definition in type_system.types() {
            let kind = match &definition.kind {
                TypeDefinitionKind::Object { .. } => VertexKind::Object,
                TypeDefinitionKind::Interface { .. } => VertexKind::Interface,
                TypeDefinitionKind::Union { .. } => VertexKind::Union,
                TypeDefinitionKind::InputObject { .. } => VertexKind::InputObject,
                TypeDefinitionKind::Enum { .. } => VertexKind::Enum,
                TypeDefinitionKind::Scalar => VertexKind::Scalar,
            };

            let mut vertex = with_description(
                Vertex::new(kind, &definition.name, &definition.name),
                definition.description.as_deref(),
            );

            if kind == VertexKind::Scalar && is_built_in_scalar(&definition.name) {
                vertex = vertex.with_property(IS_BUILT_IN_SCALAR, "true");
            }

            let id = self.graph.push_vertex(vertex);
            self.types.insert(&definition.name, id);
            type_ids.push(id);
        }

        for definition in type_system.directives() {
            let mut vertex = with_description(
                Vertex::new(VertexKind::Directive, &definition.name, format!("@{}", definition.name)),
                definition.description.as_deref(),
            );

            if definition.repeatable {
                vertex = vertex.with_property(REPEATABLE, "true");
            }

            if !definition.locations.is_empty() {
                vertex = vertex.with_property(LOCATIONS, definition.locations.join(" | "));
            }

            let id = self.graph.push_vertex(vertex);
            self.directives.insert(&definition.name, id);
            directive_ids.push(id);
        }

        (type_ids, directive_ids)
    }

    fn ingest_type_contents(
        &mut self,
        type_id: VertexId,
        definition: &'a TypeDefinition,
    ) -> Result<(), GraphConsistencyError> {
        let path = definition.name.as_str();

        self.ingest_applied_directives(type_id, path, &definition.directives)?;

        match &definition.kind {
            TypeDefinitionKind::Object { implements, fields } | TypeDefinitionKind::Interface { implements, fields } => {
                for interface_name in implements {
                    let interface_id = self.resolve_type(path, interface_name)?;

                    if !self.graph.vertex(interface_id).is_some_and(|vertex| vertex.is_of_kind(VertexKind::Interface)) {
                        return Err(GraphConsistencyError::NotAnInterface {
                            implementer: path.to_owned(),
                            name: interface_name.clone(),
                        });
                    }

                    self.graph.push_edge(type_id, interface_id, label::implements(interface_name))?;
                }

                for field in fields {
                    self.ingest_field(type_id, path, field)?;
                }
            }
            TypeDefinitionKind::Union { members } => {
                for member in members {
                    let member_id = self.resolve_type(path, member)?;

                    if !self.graph.vertex(member_id).is_some_and(|vertex| vertex.is_of_kind(VertexKind::Object)) {
                        return Err(GraphConsistencyError::InvalidUnionMember {
                            union: path.to_owned(),
                            member: member.clone(),
                        });
                    }

                    self.graph.push_edge(type_id, member_id, label::UNION_MEMBER)?;
                }
            }
            TypeDefinitionKind::InputObject { fields } => {
                for field in fields {
                    self.ingest_input_value(type_id, path, VertexKind::InputField, label::INPUT_FIELD, field)?;
                }
            }
            TypeDefinitionKind::Enum { values } => {
                for value in values {
                    let value_path = format!("{path}.{}", value.value);
                    let vertex = with_description(
                        Vertex::new(VertexKind::EnumValue, &value.value, &value_path),
                        value.description.as_deref(),
                    );
                    let value_id = self.graph.push_vertex(vertex);

                    self.graph.push_edge(type_id, value_id, label::ENUM_VALUE)?;
                    self.ingest_applied_directives(value_id, &value_path, &value.directives)?;
                }
            }
            TypeDefinitionKind::Scalar => (),
        }

        Ok(())
    }

    fn ingest_directive_contents(
        &mut self,
        directive_id: VertexId,
        definition: &'a DirectiveDefinition,
    ) -> Result<(), GraphConsistencyError> {
        let path = format!("@{}", definition.name);

        for argument in &definition.arguments {
            self.ingest_input_value(directive_id, &path, VertexKind::Argument, label::ARGUMENT, argument)?;
        }

        Ok(())
    }

    fn ingest_field(
        &mut self,
        container_id: VertexId,
        container_path: &str,
        field: &'a FieldDefinition,
    ) -> Result<(), GraphConsistencyError> {
        let path = format!("{container_path}.{}", field.name);
        let vertex = with_description(
            Vertex::new(VertexKind::Field, &field.name, &path),
            field.description.as_deref(),
        );
        let field_id = self.graph.push_vertex(vertex);

        self.graph.push_edge(container_id, field_id, label::FIELD)?;
        self.ingest_type_reference(field_id, &path, &field.ty)?;

        for argument in &field.arguments {
            self.ingest_input_value(field_id, &path, VertexKind::Argument, label::ARGUMENT, argument)?;
        }

        self.ingest_applied_directives(field_id, &path, &field.directives)
    }

    fn ingest_input_value(
        &mut self,
        parent_id: VertexId,
        parent_path: &str,
        kind: VertexKind,
        edge_label: &str,
        value: &'a InputValueDefinition,
    ) -> Result<(), GraphConsistencyError> {
        let path = format!("{parent_path}.{}", value.name);
        let mut vertex = with_description(Vertex::new(kind, &value.name, &path), value.description.as_deref());

        if let Some(default_value) = &value.default_value {
            vertex = vertex.with_property(DEFAULT_VALUE, default_value);
        }

        let value_id = self.graph.push_vertex(vertex);

        self.graph.push_edge(parent_id, value_id, edge_label)?;
        self.ingest_type_reference(value_id, &path, &value.ty)?;
        self.ingest_applied_directives(value_id, &path, &value.directives)
    }

    fn ingest_type_reference(
        &mut self,
        element_id: VertexId,
        element_path: &str,
        ty: &'a TypeReference,
    ) -> Result<(), GraphConsistencyError> {
        let type_id = self.resolve_type(element_path, ty.name())?;
        self.graph
            .push_edge(element_id, type_id, label::type_reference(ty.rendered()))?;

        Ok(())
    }

    fn ingest_applied_directives(
        &mut self,
        owner_id: VertexId,
        owner_path: &str,
        directives: &'a [AppliedDirective],
    ) -> Result<(), GraphConsistencyError> {
        let mut applications: HashMap<&str, usize> = HashMap::new();

        for directive in directives {
            let count = applications.entry(directive.name.as_str()).or_default();

            let path = match *count {
                0 => format!("{owner_path}@{}", directive.name),
                n => format!("{owner_path}@{}#{n}", directive.name),
            };

            *count += 1;

            let mut vertex = Vertex::new(VertexKind::AppliedDirective, &directive.name, path);

            if !directive.arguments.is_empty() {
                vertex = vertex.with_property(ARGUMENTS, directive.render_arguments());
            }

            let applied_id = self.graph.push_vertex(vertex);
            self.graph.push_edge(owner_id, applied_id, label::APPLIED_DIRECTIVE)?;

            // Built-in directives such as @deprecated are usually not declared.
            if let Some(definition_id) = self.directives.get(directive.name.as_str()) {
                self.graph.push_edge(applied_id, *definition_id, label::DIRECTIVE)?;
            }
        }

        Ok(())
    }

    /// The type vertex for `name`. Built-in scalars are created on first reference when the
    /// type system does not define them.
    fn resolve_type(&mut self, location: &str, name: &'a str) -> Result<VertexId, GraphConsistencyError> {
        if let Some(id) = self.types.get(name) {
            return Ok(*id);
        }

        if !is_built_in_scalar(name) {
            return Err(GraphConsistencyError::DanglingTypeReference {
                location: location.to_owned(),
                name: name.to_owned(),
            });
        }

        let vertex = Vertex::new(VertexKind::Scalar, name, name).with_property(IS_BUILT_IN_SCALAR, "true");
        let id = self.graph.push_vertex(vertex);
        self.types.insert(name, id);

        tracing::trace!(name, "Created built-in scalar on first reference");

        Ok(id)
    }
}

fn with_description(vertex: Vertex, description: Option<&str>) -> Vertex {
    match description {
        Some(description) => vertex.with_property(DESCRIPTION, description),
        None => vertex,
    }
}
