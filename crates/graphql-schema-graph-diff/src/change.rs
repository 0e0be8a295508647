use crate::{edit_script::EditOperationKind, graph::VertexKind};

/// A semantic difference between the two schemas. Changes have a direction: from source to
/// target. For example, `FieldAdded` means the field does not exist in the source schema but it
/// does exist in the target schema.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind"))]
#[allow(missing_docs)]
pub enum SchemaChange {
    ObjectAdded { name: String },
    ObjectRemoved { name: String },
    ObjectChanged { name: String, details: Vec<ObjectChangeDetail> },

    InterfaceAdded { name: String },
    InterfaceRemoved { name: String },
    InterfaceChanged { name: String, details: Vec<TypeChangeDetail> },

    UnionAdded { name: String },
    UnionRemoved { name: String },
    UnionChanged { name: String, details: Vec<TypeChangeDetail> },

    InputObjectAdded { name: String },
    InputObjectRemoved { name: String },
    InputObjectChanged { name: String, details: Vec<TypeChangeDetail> },

    EnumAdded { name: String },
    EnumRemoved { name: String },
    EnumChanged { name: String, details: Vec<TypeChangeDetail> },

    ScalarAdded { name: String },
    ScalarRemoved { name: String },
    ScalarChanged { name: String, details: Vec<TypeChangeDetail> },

    DirectiveAdded { name: String },
    DirectiveRemoved { name: String },
    DirectiveChanged { name: String, details: Vec<TypeChangeDetail> },

    /// `container` is the object or interface owning the field.
    FieldAdded { name: String, container: String },
    FieldRemoved { name: String, container: String },
    FieldChanged {
        name: String,
        container: String,
        details: Vec<TypeChangeDetail>,
    },

    InputFieldAdded { name: String, container: String },
    InputFieldRemoved { name: String, container: String },
    InputFieldChanged {
        name: String,
        container: String,
        details: Vec<TypeChangeDetail>,
    },

    /// `parent` is the path of the field or directive definition owning the argument, e.g.
    /// `Query.user` or `@cache`.
    ArgumentAdded { name: String, parent: String },
    ArgumentRemoved { name: String, parent: String },
    ArgumentChanged {
        name: String,
        parent: String,
        details: Vec<TypeChangeDetail>,
    },

    EnumValueAdded { name: String, enum_name: String },
    EnumValueRemoved { name: String, enum_name: String },
    EnumValueChanged {
        name: String,
        enum_name: String,
        details: Vec<TypeChangeDetail>,
    },

    /// `target` is the path of the element the directive is applied to.
    AppliedDirectiveAdded { name: String, target: String },
    AppliedDirectiveRemoved { name: String, target: String },
    AppliedDirectiveChanged {
        name: String,
        target: String,
        details: Vec<TypeChangeDetail>,
    },
}

impl SchemaChange {
    /// The name of the changed element.
    pub fn name(&self) -> &str {
        match self {
            SchemaChange::ObjectAdded { name }
            | SchemaChange::ObjectRemoved { name }
            | SchemaChange::ObjectChanged { name, .. }
            | SchemaChange::InterfaceAdded { name }
            | SchemaChange::InterfaceRemoved { name }
            | SchemaChange::InterfaceChanged { name, .. }
            | SchemaChange::UnionAdded { name }
            | SchemaChange::UnionRemoved { name }
            | SchemaChange::UnionChanged { name, .. }
            | SchemaChange::InputObjectAdded { name }
            | SchemaChange::InputObjectRemoved { name }
            | SchemaChange::InputObjectChanged { name, .. }
            | SchemaChange::EnumAdded { name }
            | SchemaChange::EnumRemoved { name }
            | SchemaChange::EnumChanged { name, .. }
            | SchemaChange::ScalarAdded { name }
            | SchemaChange::ScalarRemoved { name }
            | SchemaChange::ScalarChanged { name, .. }
            | SchemaChange::DirectiveAdded { name }
            | SchemaChange::DirectiveRemoved { name }
            | SchemaChange::DirectiveChanged { name, .. }
            | SchemaChange::FieldAdded { name, .. }
            | SchemaChange::FieldRemoved { name, .. }
            | SchemaChange::FieldChanged { name, .. }
            | SchemaChange::InputFieldAdded { name, .. }
            | SchemaChange::InputFieldRemoved { name, .. }
            | SchemaChange::InputFieldChanged { name, .. }
            | SchemaChange::ArgumentAdded { name, .. }
            | SchemaChange::ArgumentRemoved { name, .. }
            | SchemaChange::ArgumentChanged { name, .. }
            | SchemaChange::EnumValueAdded { name, .. }
            | SchemaChange::EnumValueRemoved { name, .. }
            | SchemaChange::EnumValueChanged { name, .. }
            | SchemaChange::AppliedDirectiveAdded { name, .. }
            | SchemaChange::AppliedDirectiveRemoved { name, .. }
            | SchemaChange::AppliedDirectiveChanged { name, .. } => name,
        }
    }
}

/// One aspect of a changed object type.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind"))]
pub enum ObjectChangeDetail {
    AddedInterfaceToObject(AddedInterfaceToObjectDetail),
    Renamed { old_name: String },
    PropertyChanged(PropertyChange),
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AddedInterfaceToObjectDetail {
    pub interface_name: String,
}

/// One aspect of a changed element other than an object type.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind"))]
pub enum TypeChangeDetail {
    Renamed { old_name: String },
    PropertyChanged(PropertyChange),
}

/// An auxiliary property such as `description` or `defaultValue`. `None` means the property is
/// not set on that side.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PropertyChange {
    pub key: String,
    pub old: Option<String>,
    pub new: Option<String>,
}

/// An edge operation the analysis does not turn into a [SchemaChange], such as a removed
/// interface implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnclassifiedEdge {
    pub operation: EditOperationKind,
    /// The label on the side the operation applies to: the new label for inserts and changes.
    pub label: String,
    /// The previous label, for changes.
    pub old_label: Option<String>,
    pub one: ElementRef,
    pub two: ElementRef,
}

/// Identifies a schema element by kind and path, e.g. `FIELD Query.user`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementRef {
    pub kind: VertexKind,
    pub path: String,
}

/// The result of diffing two schemas.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemaDiff {
    pub changes: Vec<SchemaChange>,
    pub unclassified: Vec<UnclassifiedEdge>,
    /// The search budget ran out: the changes are correct, but may not be the smallest set.
    pub approximate: bool,
}

impl SchemaDiff {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.unclassified.is_empty()
    }
}
