use std::collections::BTreeMap;

use crate::{ColumnInfo, ColumnType, CoreError, SchemaProvider};

/// Schema provider backed by a fixed table map.
#[derive(Clone, Debug, Default)]
pub struct StaticSchema {
    tables: BTreeMap<String, Vec<ColumnInfo>>,
}

impl StaticSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(mut self, name: &str, columns: &[(&str, ColumnType)]) -> Self {
        let cols = columns
            .iter()
            .map(|(n, t)| ColumnInfo::new(*n, *t))
            .collect();
        self.tables.insert(name.to_string(), cols);
        self
    }
}

impl SchemaProvider for StaticSchema {
    fn columns(&self, table: &str) -> Result<Vec<ColumnInfo>, CoreError> {
        self.tables
            .get(table)
            .cloned()
            .ok_or_else(|| CoreError::Engine(format!("no such table: {table}")))
    }
}
