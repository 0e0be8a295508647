//! The resolved type system the graph builder consumes.
//!
//! A [TypeSystem] is produced by an external parser/validator. With the `from_sdl` feature, it
//! can be built from SDL with [TypeSystem::from_sdl()].

#[cfg(feature = "from_sdl")]
mod from_sdl;

use indexmap::IndexMap;

#[cfg(feature = "from_sdl")]
pub use from_sdl::FromSdlError;

/// The scalars defined by the GraphQL specification. They exist in every schema, whether they
/// are declared or not.
pub const BUILT_IN_SCALARS: [&str; 5] = ["String", "Int", "Float", "Boolean", "ID"];

/// Whether `name` is one of the [BUILT_IN_SCALARS].
pub fn is_built_in_scalar(name: &str) -> bool {
    BUILT_IN_SCALARS.contains(&name)
}

/// A fully resolved GraphQL type system: the named types and directive definitions of one schema
/// snapshot, in definition order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeSystem {
    types: IndexMap<String, TypeDefinition>,
    directives: IndexMap<String, DirectiveDefinition>,
}

impl TypeSystem {
    /// Add a type definition. A definition with the same name replaces the previous one.
    pub fn push_type(&mut self, definition: TypeDefinition) -> &mut Self {
        self.types.insert(definition.name.clone(), definition);
        self
    }

    /// Add a directive definition. A definition with the same name replaces the previous one.
    pub fn push_directive(&mut self, definition: DirectiveDefinition) -> &mut Self {
        self.directives.insert(definition.name.clone(), definition);
        self
    }

    pub fn types(&self) -> impl ExactSizeIterator<Item = &TypeDefinition> {
        self.types.values()
    }

    pub fn type_definition(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.get(name)
    }

    pub fn directives(&self) -> impl ExactSizeIterator<Item = &DirectiveDefinition> {
        self.directives.values()
    }

    pub fn directive(&self, name: &str) -> Option<&DirectiveDefinition> {
        self.directives.get(name)
    }

    pub(crate) fn type_definition_mut(&mut self, name: &str) -> Option<&mut TypeDefinition> {
        self.types.get_mut(name)
    }
}

/// A named type definition.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDefinition {
    pub name: String,
    pub description: Option<String>,
    pub directives: Vec<AppliedDirective>,
    pub kind: TypeDefinitionKind,
}

impl TypeDefinition {
    pub fn new(name: impl Into<String>, kind: TypeDefinitionKind) -> Self {
        TypeDefinition {
            name: name.into(),
            description: None,
            directives: Vec::new(),
            kind,
        }
    }

    pub fn object(name: impl Into<String>, implements: &[&str], fields: Vec<FieldDefinition>) -> Self {
        Self::new(
            name,
            TypeDefinitionKind::Object {
                implements: implements.iter().map(|name| (*name).to_owned()).collect(),
                fields,
            },
        )
    }

    pub fn interface(name: impl Into<String>, implements: &[&str], fields: Vec<FieldDefinition>) -> Self {
        Self::new(
            name,
            TypeDefinitionKind::Interface {
                implements: implements.iter().map(|name| (*name).to_owned()).collect(),
                fields,
            },
        )
    }

    pub fn scalar(name: impl Into<String>) -> Self {
        Self::new(name, TypeDefinitionKind::Scalar)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_directive(mut self, directive: AppliedDirective) -> Self {
        self.directives.push(directive);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeDefinitionKind {
    Object {
        implements: Vec<String>,
        fields: Vec<FieldDefinition>,
    },
    Interface {
        implements: Vec<String>,
        fields: Vec<FieldDefinition>,
    },
    Union {
        members: Vec<String>,
    },
    InputObject {
        fields: Vec<InputValueDefinition>,
    },
    Enum {
        values: Vec<EnumValueDefinition>,
    },
    Scalar,
}

/// A field of an object or interface type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    pub name: String,
    pub ty: TypeReference,
    pub arguments: Vec<InputValueDefinition>,
    pub description: Option<String>,
    pub directives: Vec<AppliedDirective>,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, ty: TypeReference) -> Self {
        FieldDefinition {
            name: name.into(),
            ty,
            arguments: Vec::new(),
            description: None,
            directives: Vec::new(),
        }
    }

    pub fn with_argument(mut self, argument: InputValueDefinition) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn with_directive(mut self, directive: AppliedDirective) -> Self {
        self.directives.push(directive);
        self
    }
}

/// A field argument, directive argument or input object field.
#[derive(Debug, Clone, PartialEq)]
pub struct InputValueDefinition {
    pub name: String,
    pub ty: TypeReference,
    /// The default value, as written in the schema.
    pub default_value: Option<String>,
    pub description: Option<String>,
    pub directives: Vec<AppliedDirective>,
}

impl InputValueDefinition {
    pub fn new(name: impl Into<String>, ty: TypeReference) -> Self {
        InputValueDefinition {
            name: name.into(),
            ty,
            default_value: None,
            description: None,
            directives: Vec::new(),
        }
    }

    pub fn with_default_value(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValueDefinition {
    pub value: String,
    pub description: Option<String>,
    pub directives: Vec<AppliedDirective>,
}

impl EnumValueDefinition {
    pub fn new(value: impl Into<String>) -> Self {
        EnumValueDefinition {
            value: value.into(),
            description: None,
            directives: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectiveDefinition {
    pub name: String,
    pub arguments: Vec<InputValueDefinition>,
    pub locations: Vec<String>,
    pub repeatable: bool,
    pub description: Option<String>,
}

/// A directive applied to a schema element, e.g. `@deprecated(reason: "no")`.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedDirective {
    pub name: String,
    /// Argument names and values as written in the schema.
    pub arguments: Vec<(String, String)>,
}

impl AppliedDirective {
    pub fn new(name: impl Into<String>) -> Self {
        AppliedDirective {
            name: name.into(),
            arguments: Vec::new(),
        }
    }

    pub fn with_argument(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.arguments.push((name.into(), value.into()));
        self
    }

    pub(crate) fn render_arguments(&self) -> String {
        self.arguments
            .iter()
            .map(|(name, value)| format!("{name}: {value}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A reference to a named type, with its list and non-null wrappers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeReference {
    name: String,
    rendered: String,
}

impl TypeReference {
    /// A nullable reference to `name`.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        TypeReference {
            rendered: name.clone(),
            name,
        }
    }

    /// Parse a rendered type such as `[String!]!`.
    pub fn parse(ty: &str) -> Self {
        let rendered: String = ty.split_whitespace().collect();
        let mut start = 0;
        let mut end = rendered.len();
        let mut chars = rendered.chars().rev();

        loop {
            match chars.next() {
                Some('!') => (),
                Some(']') => start += 1,
                _ => break,
            }
            end -= 1;
        }

        TypeReference {
            name: rendered.get(start..end).unwrap_or_default().to_owned(),
            rendered,
        }
    }

    /// The named type at the core of the wrappers.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The full type, e.g. `[String!]!`.
    pub fn rendered(&self) -> &str {
        &self.rendered
    }
}

impl std::fmt::Display for TypeReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.rendered)
    }
}
