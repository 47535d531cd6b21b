/// Records produced by a crawl run
///
/// A `ResultTable` is built once per run by the coordinator and handed whole
/// to a sink. Records are grouped by source in input order; within a source
/// they are in first-seen order and no title repeats.
use crate::crawler::FetchError;
use crate::listing::SortOrder;
use chrono::NaiveDate;
use serde::Serialize;
use std::time::Duration;

/// One deduplicated post title captured from a source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub title: String,

    /// Subreddit name the title was captured from
    #[serde(rename = "subreddit")]
    pub source: String,

    /// Run-wide capture date, serialized as `YYYY-MM-DD`
    #[serde(rename = "date")]
    pub captured_date: NaiveDate,
}

impl Record {
    pub fn new(
        title: impl Into<String>,
        source: impl Into<String>,
        captured_date: NaiveDate,
    ) -> Self {
        Self {
            title: title.into(),
            source: source.into(),
            captured_date,
        }
    }

    /// Date in the `YYYY-MM-DD` form used for file names and database rows
    pub fn date_string(&self) -> String {
        self.captured_date.format("%Y-%m-%d").to_string()
    }
}

/// Ordered sequence of records for a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultTable {
    records: Vec<Record>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from records already in table order
    pub fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Appends one source's records after everything collected so far
    pub fn append_source(&mut self, records: Vec<Record>) {
        self.records.extend(records);
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Source names in order of first appearance
    pub fn sources(&self) -> Vec<&str> {
        let mut sources: Vec<&str> = Vec::new();
        for record in &self.records {
            if !sources.contains(&record.source.as_str()) {
                sources.push(&record.source);
            }
        }
        sources
    }

    /// Splits the table by source, keeping source and record order
    pub fn partition_by_source(&self) -> Vec<(&str, Vec<&Record>)> {
        self.sources()
            .into_iter()
            .map(|source| {
                let rows = self
                    .records
                    .iter()
                    .filter(|r| r.source == source)
                    .collect();
                (source, rows)
            })
            .collect()
    }

    /// Titles captured for one source, in table order
    pub fn titles_for(&self, source: &str) -> Vec<&str> {
        self.records
            .iter()
            .filter(|r| r.source == source)
            .map(|r| r.title.as_str())
            .collect()
    }
}

impl<'a> IntoIterator for &'a ResultTable {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Why a source's pagination loop ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The listing returned no further cursor
    EndOfListing,

    /// The per-source fetch cap was reached
    PageLimit,

    /// A fetch failed; records collected before the failure are kept
    Failed(FetchError),
}

impl StopReason {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Outcome of crawling one source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    pub source: String,
    pub records: usize,
    pub pages_fetched: u32,
    pub stop: StopReason,
}

/// Run-wide facts handed to sinks and logged at the end of a run
#[derive(Debug, Clone)]
pub struct RunMetadata {
    /// Single capture date shared by every record of the run
    pub captured_date: NaiveDate,
    pub sort: SortOrder,
    pub elapsed: Duration,
    pub sources: Vec<SourceReport>,
}

impl RunMetadata {
    pub fn new(captured_date: NaiveDate, sort: SortOrder) -> Self {
        Self {
            captured_date,
            sort,
            elapsed: Duration::ZERO,
            sources: Vec::new(),
        }
    }

    pub fn date_string(&self) -> String {
        self.captured_date.format("%Y-%m-%d").to_string()
    }

    /// Elapsed wall-clock time in minutes, rounded to two decimals
    pub fn elapsed_minutes(&self) -> f64 {
        (self.elapsed.as_secs_f64() / 60.0 * 100.0).round() / 100.0
    }

    /// Number of sources whose crawl ended on a fetch error
    pub fn failed_sources(&self) -> usize {
        self.sources.iter().filter(|s| s.stop.is_failure()).count()
    }
}
