//! Crawl run coordinator
//!
//! This module runs the source crawler over every requested source, one
//! source at a time, and assembles the run's result table:
//! - Building the sources before any request is made
//! - Capturing one capture date for the whole run
//! - Skipping repeated source names
//! - Timing the run and collecting per-source reports

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::{HttpPageFetcher, PageFetcher};
use crate::crawler::policy::CrawlPolicy;
use crate::crawler::source_crawler::SourceCrawler;
use crate::listing::{ResultTable, RunMetadata, SortOrder, Source};
use crate::ScraperError;
use chrono::{Local, NaiveDate};
use std::time::Instant;

/// Table and metadata produced by one run
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub table: ResultTable,
    pub metadata: RunMetadata,
}

/// Runs a source crawler over a list of sources
pub struct CrawlRun<F> {
    crawler: SourceCrawler<F>,
}

impl CrawlRun<HttpPageFetcher> {
    /// Creates a run that fetches over HTTP using the crawler configuration
    pub fn from_config(config: &CrawlerConfig) -> Result<Self, ScraperError> {
        let fetcher = HttpPageFetcher::from_config(config)?;
        Ok(Self::new(SourceCrawler::new(
            fetcher,
            CrawlPolicy::from_config(config),
        )))
    }
}

impl<F: PageFetcher> CrawlRun<F> {
    pub fn new(crawler: SourceCrawler<F>) -> Self {
        Self { crawler }
    }

    pub fn crawler(&self) -> &SourceCrawler<F> {
        &self.crawler
    }

    /// Crawls every source, dated with today's local date
    ///
    /// # Returns
    ///
    /// * `Ok(RunOutput)` - The run completed; individual sources may have stopped early
    /// * `Err(ScraperError::InvalidSource)` - A source name is unusable; nothing was fetched
    pub async fn run(&self, names: &[String], sort: SortOrder) -> Result<RunOutput, ScraperError> {
        self.run_dated(names, sort, Local::now().date_naive()).await
    }

    /// Crawls every source, stamping all records with `captured_date`
    pub async fn run_dated(
        &self,
        names: &[String],
        sort: SortOrder,
        captured_date: NaiveDate,
    ) -> Result<RunOutput, ScraperError> {
        let sources = build_sources(names, sort)?;
        let start_time = Instant::now();

        tracing::info!(
            "Starting run: {} subreddits, sorting \"{}\", date {}",
            sources.len(),
            sort,
            captured_date
        );

        let mut table = ResultTable::new();
        let mut metadata = RunMetadata::new(captured_date, sort);

        for source in &sources {
            let crawl = self.crawler.crawl(source, captured_date).await;
            table.append_source(crawl.records);
            metadata.sources.push(crawl.report);
        }

        metadata.elapsed = start_time.elapsed();

        tracing::info!(
            "Run finished: {} records from {} subreddits ({} stopped on errors) in {} minutes",
            table.len(),
            sources.len(),
            metadata.failed_sources(),
            metadata.elapsed_minutes()
        );

        Ok(RunOutput { table, metadata })
    }
}

/// Builds sources in input order, dropping repeated names
fn build_sources(names: &[String], sort: SortOrder) -> Result<Vec<Source>, ScraperError> {
    let mut sources: Vec<Source> = Vec::with_capacity(names.len());

    for name in names {
        if sources.iter().any(|s| s.name() == name) {
            tracing::warn!("Subreddit \"{}\" listed more than once, crawling it once", name);
            continue;
        }
        sources.push(Source::new(name.as_str(), sort)?);
    }

    Ok(sources)
}
