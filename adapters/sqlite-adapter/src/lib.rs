//! sqlite-adapter: SQLite implementation of the query engine and schema
//! provider ports.
//!
//! Purpose
//! - Execute the `SearchQuery` values built by the domain translator against a
//!   real relational store, so derived attribute expressions run as SQL.
//! - Report table metadata through `PRAGMA table_info` so native attributes
//!   can be registered from, and validated against, the live schema.
//!
//! Notes
//! - Uses `rusqlite` with the `bundled` feature for portability.
//! - The connection sits behind a `Mutex`; that lock is the only blocking
//!   point in a search.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::types::ValueRef;
use rusqlite::Connection;
use search_domain::{ColumnInfo, ColumnType, CoreError, QueryEngine, Row, SchemaProvider, SearchQuery, Value};
use tracing::{debug, trace};

pub mod sql;

use sql::{quote_ident, render_query};

/// SQLite-backed query engine.
pub struct SqliteEngine {
    conn: Mutex<Connection>,
}

impl SqliteEngine {
    /// Open (or create) a SQLite database at the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, CoreError> {
        let conn = Connection::open(path).map_err(map_sqerr)?;
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory().map_err(map_sqerr)?;
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn: Mutex::new(conn) }
    }

    /// Run raw SQL statements (table setup in tests and demos).
    pub fn execute_batch(&self, sql: &str) -> Result<(), CoreError> {
        let conn = self.conn.lock().map_err(|_| CoreError::Engine("mutex poisoned".into()))?;
        conn.execute_batch(sql).map_err(map_sqerr)
    }
}

fn map_sqerr<E: std::fmt::Display>(e: E) -> CoreError {
    CoreError::Engine(format!("sqlite error: {e}"))
}

fn value_from_ref(v: ValueRef<'_>) -> Value {
    match v {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(r) => Value::Real(r),
        ValueRef::Text(t) | ValueRef::Blob(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
    }
}

impl QueryEngine for SqliteEngine {
    fn fetch(&self, query: &SearchQuery) -> Result<Vec<Row>, CoreError> {
        let (sql, params) = render_query(query);
        trace!(%sql, params = params.len(), "sqlite fetch");

        let conn = self.conn.lock().map_err(|_| CoreError::Engine("mutex poisoned".into()))?;
        let mut stmt = conn.prepare(&sql).map_err(map_sqerr)?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let mut rows = stmt
            .query(rusqlite::params_from_iter(params.iter()))
            .map_err(map_sqerr)?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(map_sqerr)? {
            let mut r = Row::new();
            for (i, name) in names.iter().enumerate() {
                let v = row.get_ref(i).map_err(map_sqerr)?;
                r.insert(name.clone(), value_from_ref(v));
            }
            out.push(r);
        }
        debug!(table = %query.table.table, rows = out.len(), "sqlite fetch ok");
        Ok(out)
    }
}

impl SchemaProvider for SqliteEngine {
    fn columns(&self, table: &str) -> Result<Vec<ColumnInfo>, CoreError> {
        let conn = self.conn.lock().map_err(|_| CoreError::Engine("mutex poisoned".into()))?;
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({})", quote_ident(table)))
            .map_err(map_sqerr)?;
        let mut rows = stmt.query([]).map_err(map_sqerr)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(map_sqerr)? {
            let name: String = row.get(1).map_err(map_sqerr)?;
            let decl: String = row.get(2).map_err(map_sqerr)?;
            out.push(ColumnInfo::new(name, ColumnType::from_declared(&decl)));
        }
        if out.is_empty() {
            return Err(CoreError::Engine(format!("no such table: {table}")));
        }
        Ok(out)
    }
}
