//! Course-Harvest: a rule-driven course catalog scraper
//!
//! This crate discovers course links on a category listing page, fetches each
//! course page concurrently, extracts a fixed set of fields through declarative
//! rules and serializes the aggregated records as CSV.

pub mod catalog;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod server;

use thiserror::Error;

/// Main error type for Course-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The listing page could not be used; nothing can be crawled
    #[error("Link discovery failed for {url}: {reason}")]
    DiscoveryFailed { url: String, reason: String },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Server error: {0}")]
    Server(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector in config: {0}")]
    InvalidSelector(String),
}

/// Result type alias for Course-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use catalog::{Catalog, Category};
pub use config::Config;
pub use crawler::{CrawlFailure, CrawlRequest, CrawlResult, FailureKind, Orchestrator};
pub use extract::{ExtractionRule, Postprocessor, Record};
pub use output::encode_csv;
