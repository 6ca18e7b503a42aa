//! Storage module for the persistent crawl state
//!
//! This module is the durable side of deduplication: a key-value mapping from
//! resource address to processing state, backed by SQLite. A crawl resumed
//! against the same database will never re-queue an address it has already
//! touched.

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{Store, StorageError, StorageResult};

use crate::Result;
use std::path::Path;

/// Initializes or opens a state store database
pub fn open_store(path: &Path) -> Result<SqliteStore> {
    SqliteStore::new(path)
}
