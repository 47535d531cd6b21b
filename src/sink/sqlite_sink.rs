//! SQLite sink implementation
//!
//! Appends every run's records to the `subreddits` table; rows from earlier
//! runs are never touched.

use crate::listing::{ResultTable, RunMetadata};
use crate::sink::schema::initialize_schema;
use crate::sink::traits::{RecordSink, SinkResult, StoreReport};
use crate::sink::Backend;
use rusqlite::{params, Connection};
use std::path::Path;

/// SQLite storage sink
#[derive(Debug)]
pub struct SqliteSink {
    conn: Connection,
}

impl SqliteSink {
    /// Opens (or creates) the database and ensures the table exists
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    pub fn new(path: &Path) -> SinkResult<Self> {
        let conn = Connection::open(path)?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    pub fn new_in_memory() -> SinkResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Gets total row count
    pub fn count_rows(&self) -> SinkResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM subreddits", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Gets row counts per subreddit, sorted by subreddit name
    pub fn count_by_subreddit(&self) -> SinkResult<Vec<(String, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT subreddit, COUNT(*) FROM subreddits GROUP BY subreddit ORDER BY subreddit",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Gets the titles stored for one subreddit, in insertion order
    pub fn titles_for(&self, subreddit: &str) -> SinkResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT title FROM subreddits WHERE subreddit = ?1 ORDER BY id")?;

        let titles = stmt
            .query_map(params![subreddit], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(titles)
    }
}

impl RecordSink for SqliteSink {
    fn store(&mut self, table: &ResultTable, _metadata: &RunMetadata) -> SinkResult<StoreReport> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO subreddits (title, subreddit, date) VALUES (?1, ?2, ?3)")?;
            for record in table {
                stmt.execute(params![record.title, record.source, record.date_string()])?;
            }
        }
        tx.commit()?;

        tracing::info!("Saved {} rows to SQLite", table.len());

        Ok(StoreReport::new(Backend::Sqlite, table.len()))
    }
}
