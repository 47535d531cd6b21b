//! Listing page fetcher
//!
//! This module handles every HTTP request the crawler makes:
//! - Building the HTTP client with browser-like headers
//! - Building listing URLs with the pagination cursor
//! - Decoding listing JSON down to post titles and the next cursor
//! - Classifying failures so the caller can apply its stop/retry policy
//!
//! The fetcher never retries; that decision belongs to the source crawler.

use crate::config::CrawlerConfig;
use crate::listing::Source;
use crate::ScraperError;
use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// User agent of a desktop Chrome; listing endpoints reject obvious bots
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/74.0.3729.131 Safari/537.36";

/// Errors produced by a single page fetch
///
/// All of them end the current source's pagination without failing the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("upstream returned HTTP {status}")]
    Status { status: u16 },

    #[error("failed to decode listing body: {0}")]
    Decode(String),

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid listing URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Returns true for failures worth retrying (HTTP 429, HTTP 5xx, timeout)
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Status { status } => *status == 429 || (500..600).contains(status),
            Self::Timeout => true,
            _ => false,
        }
    }

    fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(error.to_string())
        }
    }
}

/// One decoded listing page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    /// Post titles in listing order
    pub titles: Vec<String>,

    /// Cursor of the next page; `None` at the end of the listing
    pub next_cursor: Option<String>,
}

/// Fetches one listing page for a source
///
/// Implementations must not retry or sleep; the caller owns pacing.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches the page following `cursor` (the first page when `cursor` is `None`)
    async fn fetch(&self, source: &Source, cursor: Option<&str>) -> Result<Page, FetchError>;
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<Child>,
    #[serde(default)]
    after: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Post,
}

// Only the title survives decoding
#[derive(Debug, Deserialize)]
struct Post {
    title: String,
}

/// Decodes a listing body into titles and the next cursor
pub fn parse_listing(body: &[u8]) -> Result<Page, FetchError> {
    let listing: Listing =
        serde_json::from_slice(body).map_err(|e| FetchError::Decode(e.to_string()))?;

    Ok(Page {
        titles: listing
            .data
            .children
            .into_iter()
            .map(|child| child.data.title)
            .collect(),
        next_cursor: listing.data.after,
    })
}

/// Builds an HTTP client that looks like a regular browser
///
/// # Arguments
///
/// * `timeout` - Total request timeout; `None` waits indefinitely
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(timeout: Option<Duration>) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-GB,en;q=0.8,en-US;q=0.6,ml;q=0.4"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    headers.insert(
        header::UPGRADE_INSECURE_REQUESTS,
        HeaderValue::from_static("1"),
    );

    // Accept-Encoding comes from the enabled decoders
    let mut builder = Client::builder()
        .user_agent(BROWSER_USER_AGENT)
        .default_headers(headers)
        .gzip(true)
        .brotli(true)
        .deflate(true);

    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    builder.build()
}

/// Fetches listing pages over HTTP
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: Client,
    base_url: Url,
}

impl HttpPageFetcher {
    /// Creates a fetcher for listings under `base_url`
    ///
    /// # Arguments
    ///
    /// * `base_url` - Listing root, e.g. `https://old.reddit.com/r`
    /// * `timeout` - Request timeout; `None` waits indefinitely
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ScraperError> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase.into());
        }

        Ok(Self {
            client: build_http_client(timeout)?,
            base_url,
        })
    }

    /// Creates a fetcher from the crawler configuration
    pub fn from_config(config: &CrawlerConfig) -> Result<Self, ScraperError> {
        Self::new(&config.base_url, config.timeout())
    }

    /// Builds `<base_url>/<name>/<sort>.json`, adding `after=<cursor>` when a cursor is given
    ///
    /// The name is pushed as a single percent-encoded path segment.
    pub fn listing_url(
        &self,
        source: &Source,
        cursor: Option<&str>,
    ) -> Result<Url, url::ParseError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .push(source.name())
            .push(&format!("{}.json", source.sort()));

        if let Some(cursor) = cursor {
            url.query_pairs_mut().append_pair("after", cursor);
        }

        Ok(url)
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, source: &Source, cursor: Option<&str>) -> Result<Page, FetchError> {
        let url = self
            .listing_url(source, cursor)
            .map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(FetchError::from_reqwest)?;

        parse_listing(&body)
    }
}
