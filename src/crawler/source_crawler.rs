//! Pagination loop for a single source
//!
//! The crawler walks a listing cursor by cursor until the listing ends, the
//! fetch cap is reached, or a fetch fails. A failed fetch is a soft stop:
//! the titles gathered so far are kept and the failure is only reported.

use crate::crawler::fetcher::PageFetcher;
use crate::crawler::policy::CrawlPolicy;
use crate::listing::{Record, Source, SourceReport, StopReason};
use chrono::NaiveDate;
use std::collections::HashSet;

/// Records and report produced by crawling one source
#[derive(Debug, Clone)]
pub struct SourceCrawl {
    pub records: Vec<Record>,
    pub report: SourceReport,
}

/// Drives a `PageFetcher` through one source's listing
pub struct SourceCrawler<F> {
    fetcher: F,
    policy: CrawlPolicy,
}

impl<F: PageFetcher> SourceCrawler<F> {
    pub fn new(fetcher: F, policy: CrawlPolicy) -> Self {
        Self { fetcher, policy }
    }

    pub fn policy(&self) -> &CrawlPolicy {
        &self.policy
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Crawls one source
    ///
    /// Titles are deduplicated within the source and kept in first-seen
    /// order. Every returned record carries `captured_date`.
    ///
    /// # Termination
    ///
    /// | Condition | Stop reason |
    /// |-----------|-------------|
    /// | Page has no next cursor | `EndOfListing` |
    /// | `page_limit` fetch calls made | `PageLimit` |
    /// | Fetch failed, retries exhausted | `Failed` |
    pub async fn crawl(&self, source: &Source, captured_date: NaiveDate) -> SourceCrawl {
        tracing::info!("Scraping subreddit \"{}\" ({})", source.name(), source.sort());

        let mut seen: HashSet<String> = HashSet::new();
        let mut titles: Vec<String> = Vec::new();
        let mut cursor: Option<String> = None;
        let mut fetches: u32 = 0;
        let mut pages: u32 = 0;
        let mut retries: u32 = 0;

        let stop = loop {
            if fetches >= self.policy.page_limit {
                break StopReason::PageLimit;
            }
            fetches += 1;

            match self.fetcher.fetch(source, cursor.as_deref()).await {
                Ok(page) => {
                    pages += 1;
                    retries = 0;

                    for title in page.titles {
                        if !seen.contains(&title) {
                            seen.insert(title.clone());
                            titles.push(title);
                        }
                    }

                    match page.next_cursor {
                        Some(next) => cursor = Some(next),
                        None => break StopReason::EndOfListing,
                    }

                    // No pause after the last allowed fetch
                    if fetches >= self.policy.page_limit {
                        break StopReason::PageLimit;
                    }
                    self.policy.pause().await;
                }
                Err(e)
                    if e.is_transient()
                        && retries < self.policy.max_retries
                        && fetches < self.policy.page_limit =>
                {
                    tracing::warn!(
                        "Transient error for \"{}\" ({}): {}; retry {}/{}",
                        source.name(),
                        source.sort(),
                        e,
                        retries + 1,
                        self.policy.max_retries
                    );
                    self.policy.backoff(retries).await;
                    retries += 1;
                }
                Err(e) => {
                    tracing::error!(
                        "Error fetching \"{}\" ({}) after {} pages: {}",
                        source.name(),
                        source.sort(),
                        pages,
                        e
                    );
                    break StopReason::Failed(e);
                }
            }
        };

        tracing::info!(
            "Success. {} total posts for \"{}\"",
            titles.len(),
            source.name()
        );

        let records: Vec<Record> = titles
            .into_iter()
            .map(|title| Record::new(title, source.name(), captured_date))
            .collect();

        SourceCrawl {
            report: SourceReport {
                source: source.name().to_string(),
                records: records.len(),
                pages_fetched: pages,
                stop,
            },
            records,
        }
    }
}
