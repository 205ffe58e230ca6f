//! Configuration module for Course-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! The loaded [`Config`] is built once at startup and shared read-only afterwards.
//!
//! # Example
//!
//! ```no_run
//! use course_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Workers: {}", config.crawler.max_concurrent_fetches);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CategoryEntry, Config, CrawlerConfig, OutputConfig, ServerConfig, SiteConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
