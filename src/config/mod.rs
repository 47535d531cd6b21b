//! Configuration module for Sub-Scraper
//!
//! This module handles loading, parsing, and validating configuration files.
//! JSON is the native format; TOML files are accepted as well.
//!
//! # Example
//!
//! ```no_run
//! use sub_scraper::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.json")).unwrap();
//! println!("Crawling {} subreddits", config.subreddit_list.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OutputConfig, DEFAULT_BASE_URL, DEFAULT_PAGE_LIMIT,
    DEFAULT_REQUEST_DELAY_MS,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
