//! Test-only adapters that live inside the domain crate for convenience.
//!
//! These are intended for unit testing and local demos. The SQLite engine
//! lives in its own crate.

pub mod recording_engine;
pub mod static_schema;
