//! Storage trait and error types

use crate::state::{ResourceKind, ResourceState};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for the persistent state store
///
/// The store is the single source of truth for "have we touched this
/// address". Each address's state is independent; no multi-key transactions
/// are needed.
pub trait Store {
    /// Returns the state of an address, `Unknown` if never written
    fn get(&self, url: &str) -> StorageResult<ResourceState>;

    /// Attempts the `Unknown -> Queued` admission transition
    ///
    /// This is a single atomic conditional write: it returns true exactly
    /// once per address, for the caller that first admitted it. Any later
    /// call for the same address returns false, regardless of current state.
    fn try_admit(&mut self, url: &str, kind: ResourceKind) -> StorageResult<bool>;

    /// Commits terminal state `Done` for an address (idempotent)
    fn mark_done(&mut self, url: &str) -> StorageResult<()>;

    /// Commits terminal state `Failed` for an address (idempotent)
    fn mark_failed(&mut self, url: &str) -> StorageResult<()>;

    /// Counts addresses of a kind currently in a given state
    fn count_by_state(&self, kind: ResourceKind, state: ResourceState) -> StorageResult<u64>;

    /// Counts all admitted addresses, grouped by kind and state
    fn counts(&self) -> StorageResult<Vec<(ResourceKind, ResourceState, u64)>>;

    /// Counts all addresses ever admitted
    fn count_total(&self) -> StorageResult<u64>;
}
