use crate::listing::SortOrder;
use serde::Deserialize;
use std::time::Duration;

/// Default listing root; a source's endpoint is `<base_url>/<name>/<sort>.json`
pub const DEFAULT_BASE_URL: &str = "https://old.reddit.com/r";

/// Default number of fetch calls allowed per source
pub const DEFAULT_PAGE_LIMIT: u32 = 40;

/// Default pause between two fetches of the same source (milliseconds)
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 500;

/// Main configuration structure for Sub-Scraper
///
/// The top-level keys match the JSON config files the scraper has always
/// accepted; `crawler` and `output` are optional tables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Subreddits to crawl, in order
    pub subreddit_list: Vec<String>,

    /// Listing sort order shared by all subreddits of a run
    #[serde(default)]
    pub sorting: SortOrder,

    /// Backend selector (csv, sqlite, postgres, mongo, mysql)
    #[serde(default = "default_save_location")]
    pub save_location: String,

    #[serde(default)]
    pub crawler: CrawlerConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Builds a configuration from command-line values, with default crawler and output settings
    pub fn new(
        subreddit_list: Vec<String>,
        sorting: SortOrder,
        save_location: impl Into<String>,
    ) -> Self {
        Self {
            subreddit_list,
            sorting,
            save_location: save_location.into(),
            crawler: CrawlerConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

fn default_save_location() -> String {
    "csv".to_string()
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Listing root URL
    pub base_url: String,

    /// Maximum number of fetch calls per source
    pub page_limit: u32,

    /// Pause after each successful fetch (milliseconds)
    pub request_delay_ms: u64,

    /// Request timeout in seconds; unset means wait indefinitely
    pub timeout_secs: Option<u64>,

    /// Retries for transient failures (HTTP 429, HTTP 5xx, timeout)
    pub max_retries: u32,

    /// Base delay of the exponential retry backoff (milliseconds)
    pub retry_backoff_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_limit: DEFAULT_PAGE_LIMIT,
            request_delay_ms: DEFAULT_REQUEST_DELAY_MS,
            timeout_secs: None,
            max_retries: 0,
            retry_backoff_ms: 1000,
        }
    }
}

impl CrawlerConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving one CSV file per subreddit
    pub csv_dir: String,

    /// Path to the SQLite database file
    pub sqlite_path: String,

    /// Path of the rotating log file
    pub log_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_dir: "scraped_subreddits".to_string(),
            sqlite_path: "reddit.sqlite".to_string(),
            log_file: "scraper.log".to_string(),
        }
    }
}
