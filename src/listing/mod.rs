//! Listing module: the data model of a crawl
//!
//! This module defines what a crawl target is and what it produces.
//!
//! # Components
//!
//! - `SortOrder`: Ranking of a subreddit listing (new, rising, controversial, top)
//! - `Source`: One crawl target, a subreddit name paired with a sort order
//! - `Record`: One deduplicated (title, subreddit, date) row
//! - `ResultTable`: All records of one run, in discovery order
//! - `RunMetadata`: Run-wide facts (capture date, sort order, elapsed time, per-source reports)

mod record;
mod source;

pub use record::{Record, ResultTable, RunMetadata, SourceReport, StopReason};
pub use source::{validate_source_name, SortOrder, Source};
