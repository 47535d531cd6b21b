//! Database schema definitions
//!
//! This module contains the SQL schema of the append-only records table.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per captured title, appended by every run
CREATE TABLE IF NOT EXISTS subreddits (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    subreddit TEXT NOT NULL,
    date TEXT NOT NULL
);
"#;

/// Initializes the database schema
///
/// Safe to call on every run; existing rows are left untouched.
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
