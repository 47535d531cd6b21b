use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// The format is picked from the file extension: `.json` or `.toml`.
///
/// # Arguments
///
/// * `path` - Path to the configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;

    let format = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("json");

    let config = parse_config(&content, format)?;

    validate(&config)?;

    Ok(config)
}

/// Parses configuration text in the given format without validating it
pub fn parse_config(content: &str, format: &str) -> Result<Config, ConfigError> {
    match format.to_ascii_lowercase().as_str() {
        "json" => Ok(serde_json::from_str(content)?),
        "toml" => Ok(toml::from_str(content)?),
        other => Err(ConfigError::UnsupportedFormat(other.to_string())),
    }
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so a run can be tied back to the exact file it used.
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::SortOrder;
    use std::io::Write;
    use tempfile::Builder;

    fn create_temp_config(content: &str, suffix: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_json_config() {
        let config_content = r#"{
            "subreddit_list": ["rust", "programming"],
            "sorting": "top",
            "save_location": "sqlite"
        }"#;

        let file = create_temp_config(config_content, ".json");
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.subreddit_list, vec!["rust", "programming"]);
        assert_eq!(config.sorting, SortOrder::Top);
        assert_eq!(config.save_location, "sqlite");
        assert_eq!(config.crawler.page_limit, 40);
        assert_eq!(config.crawler.request_delay_ms, 500);
        assert!(config.crawler.timeout().is_none());
        assert_eq!(config.output.csv_dir, "scraped_subreddits");
    }

    #[test]
    fn test_load_toml_config() {
        let config_content = r#"
subreddit_list = ["rust"]
sorting = "rising"
save_location = "csv"

[crawler]
page_limit = 5
timeout_secs = 30
max_retries = 2

[output]
csv_dir = "./out"
"#;

        let file = create_temp_config(config_content, ".toml");
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.sorting, SortOrder::Rising);
        assert_eq!(config.crawler.page_limit, 5);
        assert_eq!(config.crawler.max_retries, 2);
        assert_eq!(config.crawler.timeout().unwrap().as_secs(), 30);
        assert_eq!(config.output.csv_dir, "./out");
        assert_eq!(config.output.sqlite_path, "reddit.sqlite");
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/config.json"));
        assert!(matches!(result.unwrap_err(), ConfigError::Io(_)));
    }

    #[test]
    fn test_load_config_with_invalid_json() {
        let file = create_temp_config("this is not valid JSON {{{", ".json");
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Json(_)));
    }

    #[test]
    fn test_unknown_sorting_is_rejected() {
        let file = create_temp_config(r#"{"subreddit_list": ["a"], "sorting": "hot"}"#, ".json");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_unsupported_extension() {
        let file = create_temp_config("subreddit_list: [a]", ".yaml");
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let config_content = r#"{
            "subreddit_list": ["rust"],
            "crawler": { "page_limit": 0 }
        }"#;

        let file = create_temp_config(config_content, ".json");
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content", ".json");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1", ".json");
        let file2 = create_temp_config("content 2", ".json");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }
}
