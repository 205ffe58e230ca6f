//! Rule-driven field extraction
//!
//! This module turns a fetched detail page into a [`Record`]:
//! - [`Postprocessor`] chains clean up raw matched text
//! - [`ExtractionRule`] describes where one field lives on the page
//! - [`extract_all`] applies a whole rule set to one parsed document
//!
//! Extraction is total: every rule always yields a string, so downstream
//! encoding never has to deal with absent values.

mod document;
mod postprocess;
mod rule;

pub use document::Document;
pub use postprocess::{apply_chain, Postprocessor};
pub use rule::{extract, extract_all, extract_page, ExtractionRule, Record};
