//! Database schema definitions
//!
//! This module contains the SQL schema for the Kagami state database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per resource address ever admitted
CREATE TABLE IF NOT EXISTS resources (
    url TEXT PRIMARY KEY,
    kind TEXT NOT NULL,
    state TEXT NOT NULL,
    discovered_at TEXT NOT NULL,
    completed_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_resources_state ON resources(state);
CREATE INDEX IF NOT EXISTS idx_resources_kind ON resources(kind);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
