use std::sync::Mutex;

use crate::{CoreError, QueryEngine, Row, SearchQuery};

/// Query engine that records every query it is handed and answers with a
/// fixed set of rows. Not thread-safe for high concurrency beyond the
/// internal mutex.
pub struct RecordingEngine {
    rows: Vec<Row>,
    seen: Mutex<Vec<SearchQuery>>,
}

impl RecordingEngine {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Queries received so far, oldest first.
    pub fn queries(&self) -> Result<Vec<SearchQuery>, CoreError> {
        let seen = self
            .seen
            .lock()
            .map_err(|_| CoreError::Engine("mutex poisoned".into()))?;
        Ok(seen.clone())
    }
}

impl Default for RecordingEngine {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl QueryEngine for RecordingEngine {
    fn fetch(&self, query: &SearchQuery) -> Result<Vec<Row>, CoreError> {
        let mut seen = self
            .seen
            .lock()
            .map_err(|_| CoreError::Engine("mutex poisoned".into()))?;
        seen.push(query.clone());
        let limit = query.limit.unwrap_or(usize::MAX);
        Ok(self
            .rows
            .iter()
            .skip(query.offset)
            .take(limit)
            .cloned()
            .collect())
    }
}
