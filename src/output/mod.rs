//! Output module for crawl results
//!
//! This module handles:
//! - Encoding records as naive fully-quoted CSV
//! - Naming and persisting export files

mod csv;
mod export;

pub use self::csv::{count_quote_irregularities, encode_csv};
pub use export::{export_file_name, write_export};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
