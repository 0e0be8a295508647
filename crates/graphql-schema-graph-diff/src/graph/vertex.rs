use std::{collections::BTreeMap, fmt};

/// Property set on SCALAR vertices for the scalars defined by the GraphQL specification.
pub const IS_BUILT_IN_SCALAR: &str = "isBuiltInScalar";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
#[repr(u8)]
pub enum VertexKind {
    // /!\ The order of variants matters for the Ord derive: it is the order of edit operations. /!\
    Object,
    Interface,
    Union,
    InputObject,
    Enum,
    Scalar,
    Directive,
    Field,
    InputField,
    Argument,
    EnumValue,
    AppliedDirective,
}

impl VertexKind {
    pub const ALL: [VertexKind; 12] = [
        VertexKind::Object,
        VertexKind::Interface,
        VertexKind::Union,
        VertexKind::InputObject,
        VertexKind::Enum,
        VertexKind::Scalar,
        VertexKind::Directive,
        VertexKind::Field,
        VertexKind::InputField,
        VertexKind::Argument,
        VertexKind::EnumValue,
        VertexKind::AppliedDirective,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VertexKind::Object => "OBJECT",
            VertexKind::Interface => "INTERFACE",
            VertexKind::Union => "UNION",
            VertexKind::InputObject => "INPUT_OBJECT",
            VertexKind::Enum => "ENUM",
            VertexKind::Scalar => "SCALAR",
            VertexKind::Directive => "DIRECTIVE",
            VertexKind::Field => "FIELD",
            VertexKind::InputField => "INPUT_FIELD",
            VertexKind::Argument => "ARGUMENT",
            VertexKind::EnumValue => "ENUM_VALUE",
            VertexKind::AppliedDirective => "APPLIED_DIRECTIVE",
        }
    }

    /// Position in [VertexKind::ALL].
    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// Fields can only live in these.
    pub fn is_fields_container(self) -> bool {
        matches!(self, VertexKind::Object | VertexKind::Interface | VertexKind::InputObject)
    }
}

impl fmt::Display for VertexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One schema element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vertex {
    kind: VertexKind,
    name: String,
    path: String,
    properties: BTreeMap<String, String>,
}

impl Vertex {
    /// `path` locates the element in the schema, e.g. `Query.user.id` for an argument. It is
    /// unique per kind inside of a graph.
    pub fn new(kind: VertexKind, name: impl Into<String>, path: impl Into<String>) -> Self {
        Vertex {
            kind,
            name: name.into(),
            path: path.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn kind(&self) -> VertexKind {
        self.kind
    }

    pub fn is_of_kind(&self, kind: VertexKind) -> bool {
        self.kind == kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn is_built_in_scalar(&self) -> bool {
        self.kind == VertexKind::Scalar && self.property(IS_BUILT_IN_SCALAR) == Some("true")
    }
}
