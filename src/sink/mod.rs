//! Sink module for persisting crawl results
//!
//! This module handles every way a run's result table can be stored:
//! - CSV files, one per subreddit and day
//! - An append-only SQLite table
//! - Postgres, MongoDB and MySQL, which are recognized but not implemented
//!
//! Backend selection is explicit: a `Backend` picks a `Sink` variant, and
//! unimplemented backends are their own variant that refuses to store.

mod csv_sink;
mod schema;
mod sqlite_sink;
mod traits;

pub use csv_sink::CsvSink;
pub use schema::initialize_schema;
pub use sqlite_sink::SqliteSink;
pub use traits::{RecordSink, SinkError, SinkResult, StoreReport};

use crate::config::OutputConfig;
use crate::listing::{ResultTable, RunMetadata};
use std::fmt;
use std::path::Path;

/// Storage backends a run can be saved to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    Csv,
    Sqlite,
    Postgres,
    Mongo,
    Mysql,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Sqlite => "sqlite",
            Self::Postgres => "postgres",
            Self::Mongo => "mongo",
            Self::Mysql => "mysql",
        }
    }

    /// Parses a backend from its selector name
    ///
    /// Returns None if the string doesn't match any known backend.
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "csv" => Some(Self::Csv),
            "sqlite" => Some(Self::Sqlite),
            "postgres" => Some(Self::Postgres),
            "mongo" => Some(Self::Mongo),
            "mysql" => Some(Self::Mysql),
            _ => None,
        }
    }

    /// Resolves a selector, falling back to CSV for anything unknown
    ///
    /// Matching is exact: `"SQLite"` is unknown and saves to CSV.
    pub fn from_selector(selector: &str) -> Self {
        Self::from_name(selector).unwrap_or_else(|| {
            tracing::warn!("Unknown save location \"{}\", saving to CSV", selector);
            Self::Csv
        })
    }

    /// Returns true if storing to this backend is supported
    pub fn is_implemented(&self) -> bool {
        matches!(self, Self::Csv | Self::Sqlite)
    }

    pub fn all() -> [Self; 5] {
        [
            Self::Csv,
            Self::Sqlite,
            Self::Postgres,
            Self::Mongo,
            Self::Mysql,
        ]
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A storage handler for one backend
#[derive(Debug)]
pub enum Sink {
    Csv(CsvSink),
    Sqlite(SqliteSink),
    /// A declared backend with no storage behind it
    Unimplemented(Backend),
}

impl Sink {
    /// Opens the handler for `backend` using the configured output locations
    pub fn open(backend: Backend, output: &OutputConfig) -> SinkResult<Self> {
        match backend {
            Backend::Csv => Ok(Self::Csv(CsvSink::new(&output.csv_dir))),
            Backend::Sqlite => Ok(Self::Sqlite(SqliteSink::new(Path::new(
                &output.sqlite_path,
            ))?)),
            Backend::Postgres | Backend::Mongo | Backend::Mysql => Ok(Self::Unimplemented(backend)),
        }
    }

    pub fn backend(&self) -> Backend {
        match self {
            Self::Csv(_) => Backend::Csv,
            Self::Sqlite(_) => Backend::Sqlite,
            Self::Unimplemented(backend) => *backend,
        }
    }
}

impl RecordSink for Sink {
    fn store(&mut self, table: &ResultTable, metadata: &RunMetadata) -> SinkResult<StoreReport> {
        match self {
            Self::Csv(sink) => sink.store(table, metadata),
            Self::Sqlite(sink) => sink.store(table, metadata),
            Self::Unimplemented(backend) => Err(SinkError::Unimplemented { backend: *backend }),
        }
    }
}

/// Stores a table with the backend named by `selector`
///
/// Unknown selectors resolve to CSV. Unimplemented backends return
/// `SinkError::Unimplemented`; the table is left untouched either way.
pub fn store(
    table: &ResultTable,
    metadata: &RunMetadata,
    selector: &str,
    output: &OutputConfig,
) -> SinkResult<StoreReport> {
    let backend = Backend::from_selector(selector);
    Sink::open(backend, output)?.store(table, metadata)
}

/// Stores a table, writing CSV files if the selected backend fails
///
/// # Returns
///
/// * `Ok(StoreReport)` - Stored by the selected backend, or by CSV with `fell_back` set
/// * `Err(SinkError)` - The CSV fallback failed too
pub fn store_with_fallback(
    table: &ResultTable,
    metadata: &RunMetadata,
    selector: &str,
    output: &OutputConfig,
) -> SinkResult<StoreReport> {
    match store(table, metadata, selector, output) {
        Ok(report) => Ok(report),
        Err(e) => {
            tracing::error!(
                "Saving to \"{}\" failed: {}; writing CSV to {} instead",
                selector,
                e,
                output.csv_dir
            );
            let mut report = CsvSink::new(&output.csv_dir).store(table, metadata)?;
            report.fell_back = true;
            Ok(report)
        }
    }
}
