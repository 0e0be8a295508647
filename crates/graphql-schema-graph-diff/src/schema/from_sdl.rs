use super::*;
use cynic_parser::type_system as ast;

/// The SDL could not be turned into a [TypeSystem].
#[derive(Debug, thiserror::Error)]
#[error("Failed to parse the schema: {0}")]
pub struct FromSdlError(String);

impl TypeSystem {
    /// Ingest a GraphQL SDL document. Type extensions are merged into the definition they extend.
    pub fn from_sdl(sdl: &str) -> Result<TypeSystem, FromSdlError> {
        let document = cynic_parser::parse_type_system_document(sdl).map_err(|err| FromSdlError(err.to_string()))?;
        let mut type_system = TypeSystem::default();

        for definition in document.definitions() {
            match definition {
                // Root operation types are not part of the graph.
                ast::Definition::Schema(_) | ast::Definition::SchemaExtension(_) => (),
                ast::Definition::Directive(directive) => {
                    type_system.push_directive(ingest_directive_definition(sdl, directive));
                }
                ast::Definition::Type(ty) | ast::Definition::TypeExtension(ty) => {
                    let definition = ingest_type_definition(sdl, ty);
                    merge_type_definition(&mut type_system, definition);
                }
            }
        }

        tracing::debug!(
            types = type_system.types.len(),
            directives = type_system.directives.len(),
            "Ingested SDL"
        );

        Ok(type_system)
    }
}

fn ingest_type_definition(sdl: &str, ty: ast::TypeDefinition<'_>) -> TypeDefinition {
    let name = ty.name().to_owned();
    let description = ty.description().map(|description| description.to_cow().into_owned());
    let directives = ingest_directives(sdl, ty.directives());

    let kind = match ty {
        ast::TypeDefinition::Scalar(_) => TypeDefinitionKind::Scalar,
        ast::TypeDefinition::Object(obj) => TypeDefinitionKind::Object {
            implements: obj.implements_interfaces().map(str::to_owned).collect(),
            fields: obj.fields().map(|field| ingest_field(sdl, field)).collect(),
        },
        ast::TypeDefinition::Interface(iface) => TypeDefinitionKind::Interface {
            implements: iface.implements_interfaces().map(str::to_owned).collect(),
            fields: iface.fields().map(|field| ingest_field(sdl, field)).collect(),
        },
        ast::TypeDefinition::Union(union) => TypeDefinitionKind::Union {
            members: union.members().map(|member| member.name().to_owned()).collect(),
        },
        ast::TypeDefinition::Enum(enm) => TypeDefinitionKind::Enum {
            values: enm
                .values()
                .map(|value| EnumValueDefinition {
                    value: value.value().to_owned(),
                    description: value.description().map(|description| description.to_cow().into_owned()),
                    directives: ingest_directives(sdl, value.directives()),
                })
                .collect(),
        },
        ast::TypeDefinition::InputObject(input) => TypeDefinitionKind::InputObject {
            fields: input.fields().map(|field| ingest_input_value(sdl, field)).collect(),
        },
    };

    TypeDefinition {
        name,
        description,
        directives,
        kind,
    }
}

fn ingest_field(sdl: &str, field: ast::FieldDefinition<'_>) -> FieldDefinition {
    FieldDefinition {
        name: field.name().to_owned(),
        ty: TypeReference::parse(&field.ty().to_string()),
        arguments: field
            .arguments()
            .map(|argument| ingest_input_value(sdl, argument))
            .collect(),
        description: field.description().map(|description| description.to_cow().into_owned()),
        directives: ingest_directives(sdl, field.directives()),
    }
}

fn ingest_input_value(sdl: &str, value: ast::InputValueDefinition<'_>) -> InputValueDefinition {
    InputValueDefinition {
        name: value.name().to_owned(),
        ty: TypeReference::parse(&value.ty().to_string()),
        default_value: value
            .default_value()
            .map(|default| source_text(sdl, default.span()).to_owned()),
        description: value.description().map(|description| description.to_cow().into_owned()),
        directives: ingest_directives(sdl, value.directives()),
    }
}

fn ingest_directive_definition(sdl: &str, directive: ast::DirectiveDefinition<'_>) -> DirectiveDefinition {
    DirectiveDefinition {
        name: directive.name().to_owned(),
        arguments: directive
            .arguments()
            .map(|argument| ingest_input_value(sdl, argument))
            .collect(),
        locations: directive
            .locations()
            .map(|location| location.as_str().to_owned())
            .collect(),
        repeatable: directive.is_repeatable(),
        description: directive
            .description()
            .map(|description| description.to_cow().into_owned()),
    }
}

fn ingest_directives<'a>(
    sdl: &str,
    directives: impl Iterator<Item = ast::Directive<'a>>,
) -> Vec<AppliedDirective> {
    directives
        .map(|directive| AppliedDirective {
            name: directive.name().to_owned(),
            arguments: directive
                .arguments()
                .map(|argument| {
                    (
                        argument.name().to_owned(),
                        source_text(sdl, argument.value().span()).to_owned(),
                    )
                })
                .collect(),
        })
        .collect()
}

fn source_text(sdl: &str, cynic_parser::Span { start, end }: cynic_parser::Span) -> &str {
    sdl.get(start..end).unwrap_or_default()
}

fn merge_type_definition(type_system: &mut TypeSystem, definition: TypeDefinition) {
    let Some(existing) = type_system.type_definition_mut(&definition.name) else {
        type_system.push_type(definition);
        return;
    };

    let TypeDefinition {
        description,
        directives,
        kind,
        ..
    } = definition;

    if existing.description.is_none() {
        existing.description = description;
    }

    existing.directives.extend(directives);

    let replacement = match (&mut existing.kind, kind) {
        (
            TypeDefinitionKind::Object { implements, fields },
            TypeDefinitionKind::Object {
                implements: extra_implements,
                fields: extra_fields,
            },
        )
        | (
            TypeDefinitionKind::Interface { implements, fields },
            TypeDefinitionKind::Interface {
                implements: extra_implements,
                fields: extra_fields,
            },
        ) => {
            implements.extend(extra_implements);
            fields.extend(extra_fields);
            None
        }
        (TypeDefinitionKind::Union { members }, TypeDefinitionKind::Union { members: extra }) => {
            members.extend(extra);
            None
        }
        (TypeDefinitionKind::Enum { values }, TypeDefinitionKind::Enum { values: extra }) => {
            values.extend(extra);
            None
        }
        (TypeDefinitionKind::InputObject { fields }, TypeDefinitionKind::InputObject { fields: extra }) => {
            fields.extend(extra);
            None
        }
        (TypeDefinitionKind::Scalar, TypeDefinitionKind::Scalar) => None,
        (_, kind) => Some(kind),
    };

    if let Some(kind) = replacement {
        tracing::warn!(name = %existing.name, "Extension of a different kind replaces the previous definition");
        existing.kind = kind;
    }
}
