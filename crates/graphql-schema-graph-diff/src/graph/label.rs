//! Edge labels.

pub(crate) const FIELD: &str = "field";
pub(crate) const INPUT_FIELD: &str = "input-field";
pub(crate) const ARGUMENT: &str = "argument";
pub(crate) const ENUM_VALUE: &str = "enum-value";
pub(crate) const APPLIED_DIRECTIVE: &str = "applied-directive";
pub(crate) const UNION_MEMBER: &str = "member";
pub(crate) const DIRECTIVE: &str = "directive";

pub(crate) const IMPLEMENTS_PREFIX: &str = "implements ";
const TYPE_PREFIX: &str = "type=";

/// Edges from a parent to the elements it owns.
pub(crate) const OWNERSHIP: [&str; 5] = [FIELD, INPUT_FIELD, ARGUMENT, ENUM_VALUE, APPLIED_DIRECTIVE];

pub(crate) fn implements(interface_name: &str) -> String {
    format!("{IMPLEMENTS_PREFIX}{interface_name}")
}

pub(crate) fn is_implements(label: &str) -> bool {
    label.starts_with(IMPLEMENTS_PREFIX)
}

pub(crate) fn type_reference(rendered: &str) -> String {
    format!("{TYPE_PREFIX}{rendered}")
}
