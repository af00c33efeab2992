//! Domain library for searchable attributes.
//!
//! This crate holds the attribute registry, the expression builder, the
//! predicate translator, the ports (traits) storage adapters implement, and
//! the error definitions. Keep SQL execution and other IO concerns out of this
//! crate; adapters render and run the queries built here.

use std::collections::BTreeMap;

pub mod adapters;
pub mod attribute;
pub mod catalog;
pub mod expression;
pub mod owner;
pub mod predicate;
pub mod registry;
pub mod schema;
pub mod service;
pub mod translate;
pub mod validate;
pub mod value;

pub use attribute::{AttributeDefinition, AttributeKind, ExpressionFn, FormatterFn, Visibility};
pub use expression::{build, Expression};
pub use owner::OwnerRef;
pub use predicate::{Condition, Operator, Predicate, SearchQuery, SortDirection, SortOrder};
pub use registry::{AttributeRegistry, EntityDescriptor};
pub use schema::{ColumnInfo, ColumnType, SchemaProvider, TableRef};
pub use translate::{PredicateTranslator, SearchParams};
pub use value::Value;

/// A result row keyed by column name.
pub type Row = BTreeMap<String, Value>;

/// Query engine port. Adapters execute a translated [`SearchQuery`] against a
/// relational store and hand back the matching rows.
pub trait QueryEngine: Send + Sync {
    fn fetch(&self, query: &SearchQuery) -> Result<Vec<Row>, CoreError>;
}

/// Core domain errors.
///
/// Registration conflicts (`DuplicateEntity`, `DuplicateAttribute`,
/// `InvalidAttributeName`, `UnknownColumn`) are configuration errors and
/// should abort startup. The rest are per-query and surface to the caller.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CoreError {
    #[error("entity {0} is already registered")]
    DuplicateEntity(String),
    #[error("unknown entity {0}")]
    UnknownEntity(String),
    #[error("attribute {entity}.{name} is already registered")]
    DuplicateAttribute { entity: String, name: String },
    #[error("invalid attribute name {0:?}")]
    InvalidAttributeName(String),
    #[error("unknown attribute {entity}.{name}")]
    UnknownAttribute { entity: String, name: String },
    #[error("column {table}.{column} does not exist")]
    UnknownColumn { table: String, column: String },
    #[error("operator {operator} not supported for {entity}.{name}: {reason}")]
    UnsupportedOperator {
        entity: String,
        name: String,
        operator: String,
        reason: String,
    },
    #[error("invalid value for {entity}.{name}: {reason}")]
    InvalidValue {
        entity: String,
        name: String,
        reason: String,
    },
    #[error("query engine error: {0}")]
    Engine(String),
}

/// Return a short about/version line for the binary to print.
pub fn about() -> String {
    let pkg = env!("CARGO_PKG_NAME");
    let ver = env!("CARGO_PKG_VERSION");
    format!("{} v{} - searchable attribute library loaded", pkg, ver)
}
