//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the listing API and run the
//! full fetch → crawl → store cycle end-to-end.

use std::time::Duration;
use sub_scraper::config::{CrawlerConfig, OutputConfig};
use sub_scraper::crawler::{
    crawl, CrawlPolicy, CrawlRun, FetchError, HttpPageFetcher, SourceCrawler,
};
use sub_scraper::listing::{SortOrder, StopReason};
use sub_scraper::sink::{store, store_with_fallback, Backend, SqliteSink};
use tempfile::TempDir;
use wiremock::matchers::{header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a listing body with the given titles and cursor
fn listing(titles: &[&str], after: Option<&str>) -> serde_json::Value {
    let children: Vec<serde_json::Value> = titles
        .iter()
        .map(|t| serde_json::json!({ "kind": "t3", "data": { "title": t, "score": 1 } }))
        .collect();
    serde_json::json!({ "kind": "Listing", "data": { "children": children, "after": after } })
}

/// Creates a crawler configuration pointing at the mock server
fn create_test_config(server: &MockServer) -> CrawlerConfig {
    CrawlerConfig {
        base_url: format!("{}/r", server.uri()),
        request_delay_ms: 0,
        ..CrawlerConfig::default()
    }
}

fn create_run(server: &MockServer, timeout: Option<Duration>) -> CrawlRun<HttpPageFetcher> {
    let fetcher = HttpPageFetcher::new(&format!("{}/r", server.uri()), timeout)
        .expect("Failed to build fetcher");
    let policy = CrawlPolicy::default().with_request_delay(Duration::ZERO);
    CrawlRun::new(SourceCrawler::new(fetcher, policy))
}

fn names(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

/// Mounts a two-page listing for `sub`: the first page points at `cursor`
async fn mount_two_pages(
    server: &MockServer,
    sub: &str,
    first: &[&str],
    cursor: &str,
    second: &[&str],
) {
    let endpoint = format!("/r/{}/new.json", sub);

    // Cursor request first: among matching mocks the first mounted wins
    Mock::given(method("GET"))
        .and(path(endpoint.as_str()))
        .and(query_param("after", cursor))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(second, None)))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(endpoint.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(first, Some(cursor))))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_overlapping_pages_over_http() {
    let mock_server = MockServer::start().await;
    mount_two_pages(&mock_server, "test", &["X", "Y"], "c1", &["Y", "Z"]).await;

    let run = create_run(&mock_server, None);
    let output = run
        .run(&names(&["test"]), SortOrder::New)
        .await
        .expect("Run failed");

    assert_eq!(output.table.titles_for("test"), vec!["X", "Y", "Z"]);
    assert_eq!(output.metadata.sources[0].stop, StopReason::EndOfListing);
    assert_eq!(output.metadata.sources[0].pages_fetched, 2);
}

#[tokio::test]
async fn test_not_found_is_soft_stop() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/r/test/new.json"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/r/next/new.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(&["A", "B"], None)))
        .mount(&mock_server)
        .await;

    let run = create_run(&mock_server, None);
    let output = run
        .run(&names(&["test", "next"]), SortOrder::New)
        .await
        .expect("Run failed");

    assert!(output.table.titles_for("test").is_empty());
    assert_eq!(output.table.titles_for("next"), vec!["A", "B"]);
    assert_eq!(
        output.metadata.sources[0].stop,
        StopReason::Failed(FetchError::Status { status: 404 })
    );
}

#[tokio::test]
async fn test_malformed_body_is_soft_stop() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/r/test/new.json"))
        .and(query_param("after", "c1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>rate limited</html>"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/r/test/new.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(&["A"], Some("c1"))))
        .mount(&mock_server)
        .await;

    let run = create_run(&mock_server, None);
    let output = run
        .run(&names(&["test"]), SortOrder::New)
        .await
        .expect("Run failed");

    assert_eq!(output.table.titles_for("test"), vec!["A"]);
    assert!(matches!(
        output.metadata.sources[0].stop,
        StopReason::Failed(FetchError::Decode(_))
    ));
}

#[tokio::test]
async fn test_sort_order_and_browser_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/r/rust/top.json"))
        .and(header_exists("user-agent"))
        .and(header_exists("accept"))
        .and(header_exists("accept-encoding"))
        .and(header_exists("accept-language"))
        .and(header("cache-control", "max-age=0"))
        .and(header("upgrade-insecure-requests", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(&["T"], None)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let run = create_run(&mock_server, None);
    let output = run
        .run(&names(&["rust"]), SortOrder::Top)
        .await
        .expect("Run failed");

    assert_eq!(output.table.titles_for("rust"), vec!["T"]);
}

#[tokio::test]
async fn test_page_limit_over_http() {
    let mock_server = MockServer::start().await;

    // Every page points at another page
    Mock::given(method("GET"))
        .and(path("/r/endless/new.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(&["same"], Some("more"))))
        .expect(40)
        .mount(&mock_server)
        .await;

    let run = create_run(&mock_server, None);
    let output = run
        .run(&names(&["endless"]), SortOrder::New)
        .await
        .expect("Run failed");

    assert_eq!(output.table.titles_for("endless"), vec!["same"]);
    assert_eq!(output.metadata.sources[0].stop, StopReason::PageLimit);
    assert_eq!(output.metadata.sources[0].pages_fetched, 40);
}

#[tokio::test]
async fn test_timeout_is_soft_stop() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/r/slow/new.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(listing(&["late"], None))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let run = create_run(&mock_server, Some(Duration::from_millis(300)));
    let output = run
        .run(&names(&["slow"]), SortOrder::New)
        .await
        .expect("Run failed");

    assert!(output.table.is_empty());
    assert_eq!(
        output.metadata.sources[0].stop,
        StopReason::Failed(FetchError::Timeout)
    );
}

#[tokio::test]
async fn test_crawl_and_store_csv_and_sqlite() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/r/a/new.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(&["P", "Q"], None)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/r/b/new.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(&["Q", "R"], None)))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server);
    let output = crawl(&config, &names(&["a", "b"]), SortOrder::New)
        .await
        .expect("Crawl failed");

    let pairs: Vec<(&str, &str)> = output
        .table
        .iter()
        .map(|r| (r.title.as_str(), r.source.as_str()))
        .collect();
    assert_eq!(pairs, vec![("P", "a"), ("Q", "a"), ("Q", "b"), ("R", "b")]);

    let dir = TempDir::new().expect("Failed to create temp dir");
    let out = OutputConfig {
        csv_dir: dir.path().join("csv").display().to_string(),
        sqlite_path: dir.path().join("reddit.sqlite").display().to_string(),
        log_file: dir.path().join("scraper.log").display().to_string(),
    };

    // CSV: rerun on the same day replaces the files
    let date = output.metadata.date_string();
    for _ in 0..2 {
        let report = store(&output.table, &output.metadata, "csv", &out).expect("CSV store failed");
        assert_eq!(report.files.len(), 2);
    }
    let a_csv = dir.path().join(format!("csv/a_new_{}.csv", date));
    let content = std::fs::read_to_string(&a_csv).expect("Missing CSV");
    assert_eq!(
        content,
        format!("title,subreddit,date\nP,a,{d}\nQ,a,{d}\n", d = date)
    );

    // SQLite: each store appends
    for _ in 0..2 {
        let report =
            store(&output.table, &output.metadata, "sqlite", &out).expect("SQLite store failed");
        assert_eq!(report.backend, Backend::Sqlite);
    }
    let sink = SqliteSink::new(&dir.path().join("reddit.sqlite")).expect("Failed to open DB");
    assert_eq!(sink.count_rows().expect("Failed to count rows"), 8);

    // Unimplemented backend still leaves a result on disk
    std::fs::remove_dir_all(dir.path().join("csv")).expect("Failed to clear CSV dir");
    let report = store_with_fallback(&output.table, &output.metadata, "postgres", &out)
        .expect("Fallback failed");
    assert!(report.fell_back);
    assert!(a_csv.exists());
}
