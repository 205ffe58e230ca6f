//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - The [`Fetcher`] capability the orchestrator is built on
//! - Building HTTP clients with proper user agent strings
//! - Per-fetch timeout enforcement and status checking
//! - Error classification

use crate::config::UserAgentConfig;
use crate::crawler::retry::RetryPolicy;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Raw result of a successful HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: String,
}

impl FetchResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for 2xx status codes
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Why a single fetch did not produce a usable page
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Empty response body")]
    EmptyBody,
}

impl FetchError {
    /// Returns true if repeating the request may succeed
    ///
    /// | Condition | Retryable |
    /// |-----------|-----------|
    /// | Timeout | yes |
    /// | Connection / network failure | yes |
    /// | HTTP 429, HTTP 5xx | yes |
    /// | Other HTTP status | no |
    /// | Empty body | no |
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Connect(_) | Self::Network(_) => true,
            Self::Status(code) => *code == 429 || *code >= 500,
            Self::EmptyBody => false,
        }
    }
}

/// Capability to fetch a URL
///
/// The crawler never talks to the network directly; it goes through this
/// trait so the transport can be swapped (tests use in-memory fetchers).
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url`, giving up after `timeout`
    ///
    /// Non-2xx responses are returned as `Ok`; interpreting the status is the
    /// caller's job.
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchResponse, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use course_harvest::config::UserAgentConfig;
/// use course_harvest::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "CourseHarvest".to_string(),
///     crawler_version: "0.1".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL; ContactEmail)
    let user_agent = format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`Fetcher`] backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(config)?))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchResponse, FetchError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_error(e, timeout))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| classify_error(e, timeout))?;

        Ok(FetchResponse { status, body })
    }
}

/// Maps a reqwest error onto the fetch error taxonomy
fn classify_error(error: reqwest::Error, timeout: Duration) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout(timeout)
    } else if error.is_connect() {
        FetchError::Connect(error.to_string())
    } else {
        FetchError::Network(error.to_string())
    }
}

/// Fetches a page body, enforcing the timeout and the retry policy
///
/// # Request Flow
///
/// 1. Call the fetcher, bounded by `timeout` whatever the fetcher does
/// 2. Reject non-2xx responses
/// 3. On a retryable failure, back off and try again while attempts remain
///
/// # Returns
///
/// * `Ok(String)` - The response body of a 2xx response
/// * `Err(FetchError)` - The last failure once attempts are exhausted
pub async fn fetch_page(
    fetcher: &dyn Fetcher,
    url: &str,
    timeout: Duration,
    retry: &RetryPolicy,
) -> Result<String, FetchError> {
    retry.run(url, move || fetch_once(fetcher, url, timeout)).await
}

async fn fetch_once(
    fetcher: &dyn Fetcher,
    url: &str,
    timeout: Duration,
) -> Result<String, FetchError> {
    let response = match tokio::time::timeout(timeout, fetcher.fetch(url, timeout)).await {
        Ok(result) => result?,
        Err(_) => return Err(FetchError::Timeout(timeout)),
    };

    if !response.is_success() {
        return Err(FetchError::Status(response.status));
    }

    tracing::trace!("Fetched {} ({} bytes)", url, response.body.len());
    Ok(response.body)
}
