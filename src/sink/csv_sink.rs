//! CSV sink implementation
//!
//! Writes one file per subreddit named `<subreddit>_<sort>_<date>.csv`.
//! A rerun on the same day replaces the file.

use crate::listing::{ResultTable, RunMetadata};
use crate::sink::traits::{RecordSink, SinkResult, StoreReport};
use crate::sink::Backend;
use std::path::{Path, PathBuf};

/// CSV file sink
#[derive(Debug, Clone)]
pub struct CsvSink {
    dir: PathBuf,
}

impl CsvSink {
    /// Creates a sink writing into `dir`; the directory is created on first store
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding one subreddit's records for a run
    pub fn file_path(&self, source: &str, metadata: &RunMetadata) -> PathBuf {
        self.dir.join(format!(
            "{}_{}_{}.csv",
            source,
            metadata.sort,
            metadata.date_string()
        ))
    }
}

impl RecordSink for CsvSink {
    fn store(&mut self, table: &ResultTable, metadata: &RunMetadata) -> SinkResult<StoreReport> {
        std::fs::create_dir_all(&self.dir)?;

        let mut report = StoreReport::new(Backend::Csv, 0);

        for (source, records) in table.partition_by_source() {
            let path = self.file_path(source, metadata);

            // from_path truncates an existing file
            let mut writer = csv::Writer::from_path(&path)?;
            for record in &records {
                writer.serialize(record)?;
            }
            writer.flush()?;

            tracing::info!("Saved \"{}\" to CSV: {}", source, path.display());
            report.rows += records.len();
            report.files.push(path);
        }

        Ok(report)
    }
}
