use crate::extract::ExtractionRule;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Course-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub server: ServerConfig,
    pub site: SiteConfig,
    #[serde(default, rename = "category")]
    pub categories: Vec<CategoryEntry>,
    #[serde(default, rename = "field")]
    pub fields: Vec<ExtractionRule>,
}

impl Config {
    /// CSV header labels, in field declaration order
    pub fn header_labels(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.header_label().to_string()).collect()
    }

    /// Field names, in declaration order
    pub fn field_order(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of detail pages fetched at the same time
    #[serde(rename = "max-concurrent-fetches", default = "default_concurrency")]
    pub max_concurrent_fetches: u32,

    /// Per-fetch timeout (milliseconds)
    #[serde(rename = "fetch-timeout", default = "default_fetch_timeout")]
    pub fetch_timeout: u64,

    /// Overall deadline for one crawl (milliseconds); unbounded when absent
    #[serde(rename = "crawl-deadline", default)]
    pub crawl_deadline: Option<u64>,

    /// Total attempts per fetch, including the first one
    #[serde(rename = "retry-attempts", default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Delay before the first retry (milliseconds); doubles on each further retry
    #[serde(rename = "retry-backoff", default = "default_retry_backoff")]
    pub retry_backoff: u64,
}

impl CrawlerConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout)
    }

    pub fn crawl_deadline(&self) -> Option<Duration> {
        self.crawl_deadline.map(Duration::from_millis)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: default_concurrency(),
            fetch_timeout: default_fetch_timeout(),
            crawl_deadline: None,
            retry_attempts: default_retry_attempts(),
            retry_backoff: default_retry_backoff(),
        }
    }
}

fn default_concurrency() -> u32 {
    6
}

fn default_fetch_timeout() -> u64 {
    30_000
}

fn default_retry_attempts() -> u32 {
    1
}

fn default_retry_backoff() -> u64 {
    500
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving a copy of every exported CSV file
    #[serde(rename = "export-dir", default)]
    pub export_dir: Option<String>,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:1880".to_string()
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Origin that category paths are resolved against
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Selector matching detail-page links on a listing page
    #[serde(rename = "link-selector")]
    pub link_selector: String,
}

/// A browsable category listing page
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryEntry {
    /// Listing page path, relative to the site base URL
    pub path: String,

    /// Explicit identifier; defaults to the last path segment
    #[serde(default)]
    pub id: Option<String>,

    /// Explicit display name; defaults to the title-cased identifier
    #[serde(default)]
    pub name: Option<String>,
}
