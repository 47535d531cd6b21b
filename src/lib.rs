//! Sub-Scraper: a polite subreddit listing harvester
//!
//! This crate pages through ranked post listings of one or more subreddits,
//! deduplicates post titles per subreddit, and persists the resulting records
//! through one of several storage backends.

pub mod config;
pub mod crawler;
pub mod listing;
pub mod sink;

use thiserror::Error;

/// Main error type for Sub-Scraper operations
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Sink error: {0}")]
    Sink(#[from] sink::SinkError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid source: {0}")]
    InvalidSource(String),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for Sub-Scraper operations
pub type Result<T> = std::result::Result<T, ScraperError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlRun, FetchError, HttpPageFetcher, PageFetcher, SourceCrawler};
pub use listing::{Record, ResultTable, RunMetadata, SortOrder, Source};
pub use sink::{Backend, Sink, SinkError, StoreReport};
