//! Pacing and limits for a source crawl
//!
//! This module handles:
//! - The per-source fetch cap
//! - The courtesy pause between two fetches of the same source
//! - Exponential backoff between retries of transient failures

use crate::config::{CrawlerConfig, DEFAULT_PAGE_LIMIT, DEFAULT_REQUEST_DELAY_MS};
use std::time::Duration;

/// Limits and delays applied while paging through one source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlPolicy {
    /// Maximum fetch calls per source, retries included
    pub page_limit: u32,

    /// Pause after each successful fetch that is not the last one
    pub request_delay: Duration,

    /// Retries allowed for one transient failure
    pub max_retries: u32,

    /// Backoff before the first retry; doubled for each further retry
    pub retry_backoff: Duration,
}

impl Default for CrawlPolicy {
    fn default() -> Self {
        Self {
            page_limit: DEFAULT_PAGE_LIMIT,
            request_delay: Duration::from_millis(DEFAULT_REQUEST_DELAY_MS),
            max_retries: 0,
            retry_backoff: Duration::from_secs(1),
        }
    }
}

impl CrawlPolicy {
    /// Builds the policy from the crawler configuration
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            page_limit: config.page_limit.max(1),
            request_delay: config.request_delay(),
            max_retries: config.max_retries,
            retry_backoff: config.retry_backoff(),
        }
    }

    pub fn with_page_limit(mut self, page_limit: u32) -> Self {
        self.page_limit = page_limit.max(1);
        self
    }

    pub fn with_request_delay(mut self, request_delay: Duration) -> Self {
        self.request_delay = request_delay;
        self
    }

    pub fn with_retries(mut self, max_retries: u32, retry_backoff: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_backoff = retry_backoff;
        self
    }

    /// Delay before retry number `attempt` (0-based)
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.min(16));
        self.retry_backoff.saturating_mul(factor)
    }

    /// Sleeps for the courtesy delay between two fetches
    pub async fn pause(&self) {
        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }
    }

    /// Sleeps before retry number `attempt`
    pub async fn backoff(&self, attempt: u32) {
        let delay = self.backoff_delay(attempt);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}
