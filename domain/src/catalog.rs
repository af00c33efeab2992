//! Entity definitions for the people/notes schema shared by the demo CLI and
//! the SQLite tests.
//!
//! `Person` gets its columns from the schema plus four derived attributes:
//! - `reversed_name`: compares `name` against the reversed value
//! - `doubled_name`: `name || name`, value untouched
//! - `only_search`: search-only, value prefixed with `only_search`
//! - `only_sort`: sort-only, value prefixed with `only_sort`
//!
//! `Article`, `Comment`, `Tag` and `Note` expose their columns only.

use crate::{
    AttributeDefinition, AttributeRegistry, CoreError, EntityDescriptor, Expression,
    SchemaProvider, SortDirection, TableRef, Value,
};

pub const PERSON: &str = "Person";
pub const ARTICLE: &str = "Article";
pub const COMMENT: &str = "Comment";
pub const TAG: &str = "Tag";
pub const NOTE: &str = "Note";

/// Prefix of the polymorphic owner columns on `notes`.
pub const NOTABLE: &str = "notable";

pub fn register_people(
    registry: &mut AttributeRegistry,
    schema: &dyn SchemaProvider,
) -> Result<(), CoreError> {
    registry.add_entity_from_schema(
        schema,
        EntityDescriptor::new(PERSON, "people").with_default_order("id", SortDirection::Desc),
    )?;
    registry.register(
        PERSON,
        "reversed_name",
        AttributeDefinition::derived(name).with_formatter(reverse),
    )?;
    registry.register(PERSON, "doubled_name", AttributeDefinition::derived(doubled_name))?;
    registry.register(
        PERSON,
        "only_search",
        AttributeDefinition::derived(marked_search)
            .with_formatter(prefix_only_search)
            .search_only(),
    )?;
    registry.register(
        PERSON,
        "only_sort",
        AttributeDefinition::derived(marked_sort)
            .with_formatter(prefix_only_sort)
            .sort_only(),
    )?;
    for (entity, table) in [
        (ARTICLE, "articles"),
        (COMMENT, "comments"),
        (TAG, "tags"),
        (NOTE, "notes"),
    ] {
        registry.add_entity_from_schema(schema, EntityDescriptor::new(entity, table))?;
    }
    registry.validate_against(schema)
}

fn name(t: &TableRef) -> Expression {
    Expression::column(t, "name")
}

fn doubled_name(t: &TableRef) -> Expression {
    Expression::concat(name(t), name(t))
}

fn marked_search(t: &TableRef) -> Expression {
    Expression::infix("|| 'only_search' ||", name(t), name(t))
}

fn marked_sort(t: &TableRef) -> Expression {
    Expression::infix("|| 'only_sort' ||", name(t), name(t))
}

pub fn reverse(v: Value) -> Value {
    match v {
        Value::Text(s) => Value::Text(s.chars().rev().collect()),
        other => other,
    }
}

fn prefix_only_search(v: Value) -> Value {
    Value::Text(format!("only_search{v}"))
}

fn prefix_only_sort(v: Value) -> Value {
    Value::Text(format!("only_sort{v}"))
}
