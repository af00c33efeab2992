//! Validation helpers shared by the registry and the translator. Keep logic
//! minimal and deterministic.

use crate::{AttributeDefinition, CoreError, Operator};

/// Attribute names are lower-case identifiers: `[a-z0-9_]+`, not starting
/// with a digit.
pub fn validate_attribute_name(name: &str) -> Result<(), CoreError> {
    let valid = !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(CoreError::InvalidAttributeName(name.to_string()))
    }
}

/// Check that `op` can be used as a filter on `definition`. Returns the
/// reason it cannot.
pub fn check_filter_operator(definition: &AttributeDefinition, op: Operator) -> Result<(), String> {
    if !definition.visibility.searchable() {
        return Err("attribute is sort-only".into());
    }
    let ty = definition.value_type();
    if op.is_textual() && !ty.is_textual() {
        return Err(format!("{} attributes do not support pattern matching", ty.as_str()));
    }
    if op.is_range() && !ty.is_ordered() {
        return Err(format!("{} attributes are not ordered", ty.as_str()));
    }
    Ok(())
}

pub fn check_sort(definition: &AttributeDefinition) -> Result<(), String> {
    if !definition.visibility.sortable() {
        return Err("attribute is search-only".into());
    }
    Ok(())
}
