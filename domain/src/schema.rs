//! Table and column metadata, and the schema provider port.

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Storage type of a column, or the value type a derived attribute compares as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    Real,
    Text,
    Boolean,
    Timestamp,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Integer => "integer",
            ColumnType::Real => "real",
            ColumnType::Text => "text",
            ColumnType::Boolean => "boolean",
            ColumnType::Timestamp => "timestamp",
        }
    }

    /// Map a declared SQL column type to a column type using SQLite's
    /// affinity rules, with booleans and date/time types split out.
    pub fn from_declared(decl: &str) -> Self {
        let d = decl.to_ascii_uppercase();
        if d.contains("BOOL") {
            ColumnType::Boolean
        } else if d.contains("DATE") || d.contains("TIME") {
            ColumnType::Timestamp
        } else if d.contains("INT") {
            ColumnType::Integer
        } else if d.contains("CHAR") || d.contains("CLOB") || d.contains("TEXT") {
            ColumnType::Text
        } else if d.contains("REAL") || d.contains("FLOA") || d.contains("DOUB") || d.contains("DEC") {
            ColumnType::Real
        } else {
            ColumnType::Text
        }
    }

    pub fn is_textual(&self) -> bool {
        matches!(self, ColumnType::Text)
    }

    pub fn is_ordered(&self) -> bool {
        !matches!(self, ColumnType::Boolean)
    }
}

/// A column as reported by a [`SchemaProvider`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub column_type: ColumnType,
}

impl ColumnInfo {
    pub fn new<S: Into<String>>(name: S, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// A table as seen from one query, optionally aliased.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub table: String,
    pub alias: Option<String>,
}

impl TableRef {
    pub fn new<S: Into<String>>(table: S) -> Self {
        Self {
            table: table.into(),
            alias: None,
        }
    }

    pub fn aliased<S: Into<String>, A: Into<String>>(table: S, alias: A) -> Self {
        Self {
            table: table.into(),
            alias: Some(alias.into()),
        }
    }

    /// Name column references are qualified with.
    pub fn qualifier(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.table)
    }
}

/// Schema provider port: table and column metadata used to register and
/// validate native attributes.
pub trait SchemaProvider: Send + Sync {
    fn columns(&self, table: &str) -> Result<Vec<ColumnInfo>, CoreError>;

    fn has_column(&self, table: &str, column: &str) -> Result<bool, CoreError> {
        Ok(self.columns(table)?.iter().any(|c| c.name == column))
    }
}
