//! Crawl orchestrator - concurrent fetch-and-extract over discovered links
//!
//! This module contains the fan-out that turns one listing page into records:
//! - Discovering detail-page links (fatal on failure)
//! - Fetching and extracting detail pages with bounded concurrency
//! - Isolating per-page failures so siblings keep going
//! - Enforcing the optional overall crawl deadline
//! - Reassembling results in discovery order

use crate::config::Config;
use crate::crawler::discover::discover_links;
use crate::crawler::fetcher::{fetch_page, FetchError, Fetcher, HttpFetcher};
use crate::crawler::retry::RetryPolicy;
use crate::extract::{extract_page, ExtractionRule, Record};
use crate::HarvestError;
use futures::stream::{self, StreamExt};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Everything needed to crawl one category
#[derive(Debug, Clone)]
pub struct CrawlRequest {
    /// Absolute URL of the listing page
    pub listing_url: String,
    /// Selector matching detail-page links on the listing page
    pub link_selector: String,
    /// Rules applied to every detail page
    pub rules: Vec<ExtractionRule>,
}

/// Why a detail page produced no record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Network error, timeout or non-2xx status
    FetchFailed,
    /// The crawl deadline expired before the page finished
    Cancelled,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FetchFailed => "FetchFailed",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detail page that did not produce a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlFailure {
    pub url: String,
    pub kind: FailureKind,
    pub message: String,
}

/// Outcome of one crawl
///
/// `records` follows the discovery order of the links that succeeded;
/// `failures` follows the discovery order of the links that did not.
#[derive(Debug, Clone, Default)]
pub struct CrawlResult {
    pub records: Vec<Record>,
    pub failures: Vec<CrawlFailure>,
}

impl CrawlResult {
    pub fn failures_of(&self, kind: FailureKind) -> impl Iterator<Item = &CrawlFailure> {
        self.failures.iter().filter(move |f| f.kind == kind)
    }
}

/// Process-wide crawl tuning, read-only once built
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    /// Maximum number of detail pages in flight
    pub max_concurrent_fetches: usize,
    /// Timeout for each individual fetch
    pub fetch_timeout: Duration,
    /// Overall deadline for the detail-page phase, measured from the start of the crawl
    pub crawl_deadline: Option<Duration>,
    /// Retry applied to every fetch, listing page included
    pub retry: RetryPolicy,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 6,
            fetch_timeout: Duration::from_secs(30),
            crawl_deadline: None,
            retry: RetryPolicy::none(),
        }
    }
}

impl CrawlSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_concurrent_fetches: config.crawler.max_concurrent_fetches as usize,
            fetch_timeout: config.crawler.fetch_timeout(),
            crawl_deadline: config.crawler.crawl_deadline(),
            retry: RetryPolicy::from_config(&config.crawler),
        }
    }
}

/// Drives crawls: discovery, bounded fan-out, ordered reassembly
///
/// An orchestrator holds no per-crawl state; one instance can serve any number
/// of concurrent crawls.
#[derive(Clone)]
pub struct Orchestrator {
    fetcher: Arc<dyn Fetcher>,
    settings: CrawlSettings,
}

impl Orchestrator {
    pub fn new(fetcher: Arc<dyn Fetcher>, settings: CrawlSettings) -> Self {
        Self { fetcher, settings }
    }

    /// Creates an orchestrator backed by an HTTP fetcher
    pub fn from_config(config: &Config) -> Result<Self, HarvestError> {
        let fetcher = HttpFetcher::new(&config.user_agent)?;
        Ok(Self::new(Arc::new(fetcher), CrawlSettings::from_config(config)))
    }

    /// Runs one crawl
    ///
    /// # Flow
    ///
    /// 1. Fetch the listing page and discover links; failure aborts the crawl
    ///    before any detail page is requested
    /// 2. Fetch and extract every link, at most `max_concurrent_fetches` at once
    /// 3. Record each failed link without disturbing the others
    /// 4. On deadline expiry, drop in-flight work and mark it `Cancelled`; a
    ///    deadline that expires during discovery fails the crawl
    /// 5. Compact per-link slots in discovery order
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlResult)` - Records and failures, possibly both empty
    /// * `Err(HarvestError::DiscoveryFailed)` - The listing page was unusable
    pub async fn crawl(&self, request: &CrawlRequest) -> Result<CrawlResult, HarvestError> {
        let start_time = Instant::now();
        let deadline = self.settings.crawl_deadline.map(|d| start_time + d);

        let discovery = discover_links(
            self.fetcher.as_ref(),
            &request.listing_url,
            &request.link_selector,
            self.settings.fetch_timeout,
            &self.settings.retry,
        );

        let links = match deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, discovery)
                .await
                .map_err(|_| HarvestError::DiscoveryFailed {
                    url: request.listing_url.clone(),
                    reason: "Crawl deadline exceeded".to_string(),
                })??,
            None => discovery.await?,
        };

        let slots = self.fetch_all(&links, &request.rules, deadline).await;

        let mut result = CrawlResult::default();
        for (url, slot) in links.into_iter().zip(slots) {
            match slot {
                Some(Ok(record)) => result.records.push(record),
                Some(Err(e)) => {
                    tracing::warn!("Failed to fetch {}: {}", url, e);
                    result.failures.push(CrawlFailure {
                        url,
                        kind: FailureKind::FetchFailed,
                        message: e.to_string(),
                    });
                }
                None => result.failures.push(CrawlFailure {
                    url,
                    kind: FailureKind::Cancelled,
                    message: "Crawl deadline exceeded".to_string(),
                }),
            }
        }

        tracing::info!(
            "Crawl of {} finished: {} records, {} failures in {:?}",
            request.listing_url,
            result.records.len(),
            result.failures.len(),
            start_time.elapsed()
        );

        Ok(result)
    }

    /// Fetches and extracts every link, returning one slot per link
    ///
    /// Slot `i` holds the outcome for `links[i]`; it stays `None` if the
    /// deadline expired first.
    async fn fetch_all(
        &self,
        links: &[String],
        rules: &[ExtractionRule],
        deadline: Option<Instant>,
    ) -> Vec<Option<Result<Record, FetchError>>> {
        let mut slots: Vec<Option<Result<Record, FetchError>>> =
            (0..links.len()).map(|_| None).collect();

        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            tracing::warn!(
                "Crawl deadline exceeded before fetching {} pages",
                links.len()
            );
            return slots;
        }

        let mut in_flight = stream::iter(links.iter().cloned().enumerate())
            .map(|(index, url): (usize, String)| async move {
                (index, self.process_link(&url, rules).await)
            })
            .buffer_unordered(self.settings.max_concurrent_fetches.max(1));

        let collect = async {
            while let Some((index, outcome)) = in_flight.next().await {
                slots[index] = Some(outcome);
            }
        };

        match deadline {
            Some(deadline) => {
                if tokio::time::timeout_at(deadline, collect).await.is_err() {
                    let pending = slots.iter().filter(|s| s.is_none()).count();
                    tracing::warn!(
                        "Crawl deadline exceeded, cancelling {} unfinished pages",
                        pending
                    );
                }
            }
            None => collect.await,
        }

        // Dropping the stream cancels whatever is still in flight
        drop(in_flight);
        slots
    }

    /// Fetches one detail page and extracts its record
    async fn process_link(&self, url: &str, rules: &[ExtractionRule]) -> Result<Record, FetchError> {
        let body = fetch_page(
            self.fetcher.as_ref(),
            url,
            self.settings.fetch_timeout,
            &self.settings.retry,
        )
        .await?;

        tracing::debug!("Extracting {} fields from {}", rules.len(), url);
        Ok(extract_page(rules, &body, url))
    }
}
