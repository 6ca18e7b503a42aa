//! SQLite implementation of the state store

use crate::state::{ResourceKind, ResourceState};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Store, StorageResult};
use crate::Result;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite-backed state store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens or creates the state database at the given path
    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl Store for SqliteStore {
    fn get(&self, url: &str) -> StorageResult<ResourceState> {
        let state: Option<String> = self
            .conn
            .query_row(
                "SELECT state FROM resources WHERE url = ?1",
                params![url],
                |row| row.get(0),
            )
            .optional()?;

        Ok(state
            .and_then(|s| ResourceState::from_db_string(&s))
            .unwrap_or(ResourceState::Unknown))
    }

    fn try_admit(&mut self, url: &str, kind: ResourceKind) -> StorageResult<bool> {
        // Single conditional write: the PRIMARY KEY on url makes this the
        // atomic Unknown -> Queued transition. A conflicting row, whatever
        // its state, leaves the insert a no-op.
        let now = Utc::now().to_rfc3339();
        let changed = self.conn.execute(
            "INSERT INTO resources (url, kind, state, discovered_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(url) DO NOTHING",
            params![url, kind.to_db_string(), ResourceState::Queued.to_db_string(), now],
        )?;

        Ok(changed == 1)
    }

    fn mark_done(&mut self, url: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "UPDATE resources SET state = ?1, completed_at = ?2 WHERE url = ?3",
            params![ResourceState::Done.to_db_string(), now, url],
        )?;
        Ok(())
    }

    fn mark_failed(&mut self, url: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "UPDATE resources SET state = ?1, completed_at = ?2 WHERE url = ?3",
            params![ResourceState::Failed.to_db_string(), now, url],
        )?;
        Ok(())
    }

    fn count_by_state(&self, kind: ResourceKind, state: ResourceState) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM resources WHERE kind = ?1 AND state = ?2",
            params![kind.to_db_string(), state.to_db_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn counts(&self) -> StorageResult<Vec<(ResourceKind, ResourceState, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT kind, state, COUNT(*) FROM resources
             GROUP BY kind, state
             ORDER BY kind, state",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?;

        let mut counts = Vec::new();
        for row in rows {
            let (kind, state, count) = row?;
            match (
                ResourceKind::from_db_string(&kind),
                ResourceState::from_db_string(&state),
            ) {
                (Some(kind), Some(state)) => counts.push((kind, state, count as u64)),
                _ => {
                    tracing::warn!("Ignoring rows with unrecognized kind={} state={}", kind, state)
                }
            }
        }
        Ok(counts)
    }

    fn count_total(&self) -> StorageResult<u64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM resources", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_for_never_written() {
        let store = SqliteStore::new_in_memory().unwrap();
        let state = store.get("https://x.test/never").unwrap();
        assert_eq!(state, ResourceState::Unknown);
    }

    #[test]
    fn test_admit_transitions_to_queued() {
        let mut store = SqliteStore::new_in_memory().unwrap();

        let admitted = store.try_admit("https://x.test/p", ResourceKind::Page).unwrap();
        assert!(admitted);
        assert_eq!(store.get("https://x.test/p").unwrap(), ResourceState::Queued);
    }

    #[test]
    fn test_admit_is_at_most_once() {
        let mut store = SqliteStore::new_in_memory().unwrap();

        assert!(store.try_admit("https://x.test/p", ResourceKind::Page).unwrap());
        assert!(!store.try_admit("https://x.test/p", ResourceKind::Page).unwrap());
        assert!(!store.try_admit("https://x.test/p", ResourceKind::Image).unwrap());
    }

    #[test]
    fn test_admit_refused_after_done() {
        let mut store = SqliteStore::new_in_memory().unwrap();

        store.try_admit("https://x.test/p", ResourceKind::Page).unwrap();
        store.mark_done("https://x.test/p").unwrap();

        assert!(!store.try_admit("https://x.test/p", ResourceKind::Page).unwrap());
        assert_eq!(store.get("https://x.test/p").unwrap(), ResourceState::Done);
    }

    #[test]
    fn test_mark_done_idempotent() {
        let mut store = SqliteStore::new_in_memory().unwrap();

        store.try_admit("https://x.test/p", ResourceKind::Page).unwrap();
        store.mark_done("https://x.test/p").unwrap();
        store.mark_done("https://x.test/p").unwrap();

        assert_eq!(store.get("https://x.test/p").unwrap(), ResourceState::Done);
    }

    #[test]
    fn test_mark_failed() {
        let mut store = SqliteStore::new_in_memory().unwrap();

        store.try_admit("https://x.test/p", ResourceKind::Image).unwrap();
        store.mark_failed("https://x.test/p").unwrap();

        assert_eq!(store.get("https://x.test/p").unwrap(), ResourceState::Failed);
    }

    #[test]
    fn test_counts() {
        let mut store = SqliteStore::new_in_memory().unwrap();

        store.try_admit("https://x.test/a", ResourceKind::Page).unwrap();
        store.try_admit("https://x.test/b", ResourceKind::Page).unwrap();
        store.try_admit("https://x.test/i.png", ResourceKind::Image).unwrap();
        store.mark_done("https://x.test/a").unwrap();

        assert_eq!(store.count_total().unwrap(), 3);
        assert_eq!(
            store.count_by_state(ResourceKind::Page, ResourceState::Done).unwrap(),
            1
        );
        assert_eq!(
            store.count_by_state(ResourceKind::Page, ResourceState::Queued).unwrap(),
            1
        );
        assert_eq!(
            store.count_by_state(ResourceKind::Image, ResourceState::Queued).unwrap(),
            1
        );
    }

    #[test]
    fn test_repeated_discovery_admits_exactly_once() {
        let mut store = SqliteStore::new_in_memory().unwrap();

        let mut admissions = 0;
        for _ in 0..50 {
            if store.try_admit("https://x.test/p", ResourceKind::Page).unwrap() {
                admissions += 1;
            }
        }

        assert_eq!(admissions, 1);
        assert_eq!(store.get("https://x.test/p").unwrap(), ResourceState::Queued);
        assert_eq!(store.count_total().unwrap(), 1);
    }

    #[test]
    fn test_counts_grouped_by_kind_and_state() {
        let mut store = SqliteStore::new_in_memory().unwrap();

        store.try_admit("https://x.test/a", ResourceKind::Page).unwrap();
        store.try_admit("https://x.test/b", ResourceKind::Page).unwrap();
        store.try_admit("https://x.test/i.png", ResourceKind::Image).unwrap();
        store.mark_done("https://x.test/a").unwrap();
        store.mark_failed("https://x.test/i.png").unwrap();

        let counts = store.counts().unwrap();
        let count_of = |kind, state| {
            counts
                .iter()
                .find(|(k, s, _)| *k == kind && *s == state)
                .map(|(_, _, c)| *c)
                .unwrap_or(0)
        };

        assert_eq!(count_of(ResourceKind::Page, ResourceState::Done), 1);
        assert_eq!(count_of(ResourceKind::Page, ResourceState::Queued), 1);
        assert_eq!(count_of(ResourceKind::Image, ResourceState::Failed), 1);
        assert_eq!(count_of(ResourceKind::Image, ResourceState::Done), 0);
    }

    #[test]
    fn test_persistence_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("state.db");

        {
            let mut store = SqliteStore::new(&db_path).unwrap();
            store.try_admit("https://x.test/a", ResourceKind::Page).unwrap();
            store.mark_done("https://x.test/a").unwrap();
        }

        let mut store = SqliteStore::new(&db_path).unwrap();
        assert_eq!(store.get("https://x.test/a").unwrap(), ResourceState::Done);

        // Re-discovery after restart is a no-op
        assert!(!store.try_admit("https://x.test/a", ResourceKind::Page).unwrap());
    }
}
