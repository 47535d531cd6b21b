use crate::config::types::{Config, CrawlerConfig, OutputConfig};
use crate::listing::validate_source_name;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_subreddit_list(&config.subreddit_list)?;
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the subreddit names
fn validate_subreddit_list(names: &[String]) -> Result<(), ConfigError> {
    if names.is_empty() {
        return Err(ConfigError::Validation(
            "subreddit_list must name at least one subreddit".to_string(),
        ));
    }

    for name in names {
        validate_source_name(name).map_err(|e| ConfigError::Validation(e.to_string()))?;
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::Validation(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::Validation(format!(
            "base_url '{}' must use http or https",
            config.base_url
        )));
    }

    if config.page_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "page_limit must be >= 1, got {}",
            config.page_limit
        )));
    }

    if config.timeout_secs == Some(0) {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1 when set".to_string(),
        ));
    }

    if config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be between 0 and 10, got {}",
            config.max_retries
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.csv_dir.is_empty() {
        return Err(ConfigError::Validation(
            "csv_dir cannot be empty".to_string(),
        ));
    }

    if config.sqlite_path.is_empty() {
        return Err(ConfigError::Validation(
            "sqlite_path cannot be empty".to_string(),
        ));
    }

    if config.log_file.is_empty() {
        return Err(ConfigError::Validation(
            "log_file cannot be empty".to_string(),
        ));
    }

    Ok(())
}
