//! Sink traits and error types
//!
//! This module defines the trait every storage backend implements and the
//! errors a store can fail with.

use crate::listing::{ResultTable, RunMetadata};
use crate::sink::Backend;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while storing a result table
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Backend '{backend}' is not implemented")]
    Unimplemented { backend: Backend },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Acknowledgement of a successful store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreReport {
    /// Backend that actually persisted the rows
    pub backend: Backend,

    /// Number of rows written
    pub rows: usize,

    /// Files written, for file-based backends
    pub files: Vec<PathBuf>,

    /// True when the requested backend failed and CSV was written instead
    pub fell_back: bool,
}

impl StoreReport {
    pub fn new(backend: Backend, rows: usize) -> Self {
        Self {
            backend,
            rows,
            files: Vec::new(),
            fell_back: false,
        }
    }
}

/// Trait for storage backend implementations
///
/// A sink receives the whole table of a run and never modifies it.
pub trait RecordSink {
    /// Durably stores every record of `table`
    ///
    /// # Arguments
    ///
    /// * `table` - The run's records
    /// * `metadata` - Run-wide facts (capture date, sort order)
    fn store(&mut self, table: &ResultTable, metadata: &RunMetadata) -> SinkResult<StoreReport>;
}
