//! Crawler module for listing retrieval
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching of listing pages
//! - Per-source pagination with deduplication and a fetch cap
//! - Pacing and retry policy
//! - Run coordination over many sources

mod coordinator;
mod fetcher;
mod policy;
mod source_crawler;

pub use coordinator::{CrawlRun, RunOutput};
pub use fetcher::{
    build_http_client, parse_listing, FetchError, HttpPageFetcher, Page, PageFetcher,
    BROWSER_USER_AGENT,
};
pub use policy::CrawlPolicy;
pub use source_crawler::{SourceCrawl, SourceCrawler};

use crate::config::CrawlerConfig;
use crate::listing::SortOrder;
use crate::ScraperError;

/// Runs a complete crawl over HTTP
///
/// This is the main entry point for a crawl. It will:
/// 1. Build the HTTP fetcher from the crawler configuration
/// 2. Crawl each subreddit in order
/// 3. Return the run's result table and metadata
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `names` - Subreddit names, in crawl order
/// * `sort` - Listing sort order
pub async fn crawl(
    config: &CrawlerConfig,
    names: &[String],
    sort: SortOrder,
) -> Result<RunOutput, ScraperError> {
    CrawlRun::from_config(config)?.run(names, sort).await
}
