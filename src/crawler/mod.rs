//! Crawler module for category crawls
//!
//! This module contains the crawling pipeline, including:
//! - HTTP fetching behind the injectable [`Fetcher`] trait
//! - Retry with backoff around individual fetches
//! - Link discovery on listing pages
//! - Concurrent fetch-and-extract orchestration

mod coordinator;
mod discover;
mod fetcher;
mod retry;

pub use coordinator::{
    CrawlFailure, CrawlRequest, CrawlResult, CrawlSettings, FailureKind, Orchestrator,
};
pub use discover::{discover_links, extract_links};
pub use fetcher::{build_http_client, fetch_page, FetchError, FetchResponse, Fetcher, HttpFetcher};
pub use retry::RetryPolicy;

use crate::catalog::Category;
use crate::config::Config;
use crate::HarvestError;

/// Crawls one category with an HTTP fetcher built from the configuration
///
/// This is the convenience entry point used by the CLI. It will:
/// 1. Build the HTTP client
/// 2. Discover the course links on the category's listing page
/// 3. Fetch and extract every course page concurrently
///
/// # Arguments
///
/// * `config` - The loaded configuration
/// * `category` - The category to crawl
///
/// # Returns
///
/// * `Ok(CrawlResult)` - Records and isolated per-page failures
/// * `Err(HarvestError)` - The listing page could not be used
pub async fn crawl_category(
    config: &Config,
    category: &Category,
) -> Result<CrawlResult, HarvestError> {
    let orchestrator = Orchestrator::from_config(config)?;
    orchestrator.crawl(&category.crawl_request(config)).await
}
