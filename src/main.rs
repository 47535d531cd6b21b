//! Sub-Scraper main entry point
//!
//! This is the command-line interface for the subreddit listing scraper.

use clap::Parser;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::time::Instant;
use sub_scraper::config::{load_config_with_hash, validate, Config};
use sub_scraper::crawler::{crawl, HttpPageFetcher};
use sub_scraper::listing::{SortOrder, Source, StopReason};
use sub_scraper::sink::{store_with_fallback, Backend, SqliteSink};
use sub_scraper::ScraperError;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Sub-Scraper: scrapes subreddit post titles
///
/// Choose subreddits to scrape, how to sort them, and how to save them.
/// A configuration file, when given, takes precedence over the flags.
#[derive(Parser, Debug)]
#[command(name = "sub-scraper")]
#[command(version = "1.0.0")]
#[command(about = "Scrapes subreddit post titles", long_about = None)]
struct Cli {
    /// Path to a JSON or TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Subreddits to scrape, no quotes, no brackets
    #[arg(
        short = 's',
        long = "subs",
        alias = "subreddit-list",
        num_args = 1..,
        value_name = "NAME"
    )]
    subs: Vec<String>,

    /// Sort order for subreddits to scrape
    #[arg(long, value_enum, default_value_t = SortOrder::New)]
    sorting: SortOrder,

    /// How/where to save scraped subreddits
    #[arg(
        long,
        default_value = "csv",
        value_parser = ["csv", "sqlite", "postgres", "mongo", "mysql"]
    )]
    save: String,

    /// Directory for CSV output
    #[arg(long, value_name = "DIR")]
    output_dir: Option<String>,

    /// SQLite database path
    #[arg(long, value_name = "FILE")]
    database: Option<String>,

    /// Log file path (rotated daily)
    #[arg(long, value_name = "FILE")]
    log_file: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Show what would be scraped without sending any request
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show row counts from the SQLite database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));

    // Configuration decides where the log file lives, so it is resolved first
    let (config, config_hash) = match resolve_config(&cli) {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let _log_guard = setup_logging(cli.verbose, cli.quiet, Path::new(&config.output.log_file));

    if let Some(hash) = &config_hash {
        tracing::info!("Configuration loaded successfully (hash: {})", hash);
    }

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_scrape(config).await?;
    }

    Ok(())
}

/// Rewrites the single-dash `-subs` spelling to `--subs`
///
/// Without this, clap reads `-subs` as `-s` with the attached value `ubs`.
fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| {
            if arg == "-subs" {
                OsString::from("--subs")
            } else {
                arg
            }
        })
        .collect()
}

/// Builds the run configuration from the config file or the flags
fn resolve_config(cli: &Cli) -> Result<(Config, Option<String>), ScraperError> {
    let (mut config, hash) = match &cli.config {
        Some(path) => {
            let (config, hash) = load_config_with_hash(path)?;
            (config, Some(hash))
        }
        None => {
            let config = Config::new(cli.subs.clone(), cli.sorting, cli.save.clone());
            if !cli.stats {
                validate(&config)?;
            }
            (config, None)
        }
    };

    if let Some(dir) = &cli.output_dir {
        config.output.csv_dir = dir.clone();
    }
    if let Some(database) = &cli.database {
        config.output.sqlite_path = database.clone();
    }
    if let Some(log_file) = &cli.log_file {
        config.output.log_file = log_file.clone();
    }

    Ok((config, hash))
}

/// Sets up the tracing subscriber: stderr plus a daily-rotated log file
///
/// The returned guard flushes the file writer when dropped.
fn setup_logging(verbose: u8, quiet: bool, log_file: &Path) -> WorkerGuard {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sub_scraper=info,warn"),
            1 => EnvFilter::new("sub_scraper=debug,info"),
            2 => EnvFilter::new("sub_scraper=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let directory = log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = log_file
        .file_name()
        .unwrap_or_else(|| OsStr::new("scraper.log"));

    let appender = tracing_appender::rolling::daily(directory, file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .init();

    guard
}

/// Handles the --dry-run mode: shows the resolved plan
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Sub-Scraper Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Base URL: {}", config.crawler.base_url);
    println!("  Page limit: {}", config.crawler.page_limit);
    println!("  Request delay: {}ms", config.crawler.request_delay_ms);
    match config.crawler.timeout_secs {
        Some(secs) => println!("  Timeout: {}s", secs),
        None => println!("  Timeout: none"),
    }
    println!(
        "  Retries: {} (backoff {}ms)",
        config.crawler.max_retries, config.crawler.retry_backoff_ms
    );

    let backend = Backend::from_selector(&config.save_location);
    println!("\nOutput:");
    println!("  Save location: {} -> {}", config.save_location, backend);
    if !backend.is_implemented() {
        println!("  (not implemented, CSV will be written instead)");
    }
    println!("  CSV directory: {}", config.output.csv_dir);
    println!("  Database: {}", config.output.sqlite_path);
    println!("  Log file: {}", config.output.log_file);

    let fetcher = HttpPageFetcher::from_config(&config.crawler)?;
    println!(
        "\nSubreddits ({}, sorted by {}):",
        config.subreddit_list.len(),
        config.sorting
    );
    for name in &config.subreddit_list {
        let source = Source::new(name.as_str(), config.sorting)?;
        println!("  - {}", fetcher.listing_url(&source, None)?);
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: shows row counts from the database
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(&config.output.sqlite_path);
    println!("Database: {}\n", path.display());

    if !path.exists() {
        println!("No database found");
        return Ok(());
    }

    let sink = SqliteSink::new(path)?;
    let counts = sink.count_by_subreddit()?;

    println!("{:<30} {:>10}", "Subreddit", "Rows");
    for (subreddit, count) in &counts {
        println!("{:<30} {:>10}", subreddit, count);
    }
    println!("\nTotal rows: {}", sink.count_rows()?);

    Ok(())
}

/// Handles the main scrape: crawl every subreddit, then save the table
async fn handle_scrape(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Scraping subreddits");
    let start_time = Instant::now();

    let output = crawl(&config.crawler, &config.subreddit_list, config.sorting).await?;

    for report in &output.metadata.sources {
        if let StopReason::Failed(e) = &report.stop {
            tracing::warn!(
                "\"{}\" stopped early after {} pages ({}); kept {} posts",
                report.source,
                report.pages_fetched,
                e,
                report.records
            );
        }
    }

    let report = match store_with_fallback(
        &output.table,
        &output.metadata,
        &config.save_location,
        &config.output,
    ) {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(
                "Failed to save {} records: {}",
                output.table.len(),
                e
            );
            return Err(e.into());
        }
    };

    tracing::info!(
        "Saved {} records to {}{}",
        report.rows,
        report.backend,
        if report.fell_back { " (fallback)" } else { "" }
    );

    let elapsed = start_time.elapsed();
    tracing::info!("Done with program");
    tracing::info!("Elapsed time: {:.2} minutes", elapsed.as_secs_f64() / 60.0);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(normalize_args(args.iter().map(OsString::from)))
    }

    #[test]
    fn test_single_dash_subs() {
        let cli = parse(&["sub-scraper", "-subs", "rust", "programming"]).unwrap();
        assert_eq!(cli.subs, vec!["rust", "programming"]);
    }

    #[test]
    fn test_single_dash_subs_without_names_fails() {
        assert!(parse(&["sub-scraper", "-subs", "--dry-run"]).is_err());
    }

    #[test]
    fn test_short_and_long_subs() {
        assert_eq!(parse(&["sub-scraper", "-s", "a", "b"]).unwrap().subs, vec!["a", "b"]);
        assert_eq!(parse(&["sub-scraper", "--subs", "a"]).unwrap().subs, vec!["a"]);
    }

    #[test]
    fn test_subs_value_is_not_rewritten() {
        let cli = parse(&["sub-scraper", "--subs", "rust", "--sorting", "top"]).unwrap();
        assert_eq!(cli.subs, vec!["rust"]);
        assert_eq!(cli.sorting, SortOrder::Top);
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["sub-scraper", "--subs", "rust"]).unwrap();
        assert_eq!(cli.sorting, SortOrder::New);
        assert_eq!(cli.save, "csv");
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_unknown_save_location_rejected() {
        assert!(parse(&["sub-scraper", "--subs", "rust", "--save", "parquet"]).is_err());
    }
}
