//! Category catalog
//!
//! Maps category identifiers to listing pages. The catalog is built once from
//! the loaded configuration at startup and never mutated afterwards, so it can
//! be shared freely between request handlers.

use crate::config::Config;
use crate::crawler::CrawlRequest;
use crate::ConfigError;
use serde::Serialize;
use std::collections::HashMap;
use url::Url;

/// One browsable category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    /// Identifier used in request paths (e.g. `data-science`)
    pub id: String,

    /// Human-readable name (e.g. `Data Science`)
    pub name: String,

    /// Absolute URL of the listing page
    #[serde(skip)]
    pub listing_url: String,
}

/// Read-only registry of categories, in declaration order
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    categories: Vec<Category>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Builds the catalog from the configuration
    ///
    /// Category paths are resolved against `site.base-url`.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let base = Url::parse(&config.site.base_url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid base-url '{}': {}", config.site.base_url, e))
        })?;

        let mut catalog = Catalog::default();

        for entry in &config.categories {
            let listing_url = base.join(&entry.path).map_err(|e| {
                ConfigError::InvalidUrl(format!("Invalid category path '{}': {}", entry.path, e))
            })?;

            let id = entry
                .id
                .clone()
                .unwrap_or_else(|| category_id_from_path(&entry.path));
            let name = entry
                .name
                .clone()
                .unwrap_or_else(|| display_name_from_id(&id));

            catalog.index.insert(id.clone(), catalog.categories.len());
            catalog.categories.push(Category {
                id,
                name,
                listing_url: listing_url.to_string(),
            });
        }

        tracing::debug!("Catalog built with {} categories", catalog.len());
        Ok(catalog)
    }

    pub fn get(&self, id: &str) -> Option<&Category> {
        self.index.get(id).map(|&i| &self.categories[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl Category {
    /// Describes the crawl of this category's listing page
    pub fn crawl_request(&self, config: &Config) -> CrawlRequest {
        CrawlRequest {
            listing_url: self.listing_url.clone(),
            link_selector: config.site.link_selector.clone(),
            rules: config.fields.clone(),
        }
    }
}

/// Derives a category identifier from its listing path
///
/// The identifier is the last non-empty path segment:
/// `/browse/data-science` becomes `data-science`.
pub fn category_id_from_path(path: &str) -> String {
    path.split(['?', '#'])
        .next()
        .unwrap_or_default()
        .split('/')
        .filter(|segment| !segment.is_empty())
        .last()
        .unwrap_or_default()
        .to_string()
}

/// Turns `math-and-logic` into `Math And Logic`
pub fn display_name_from_id(id: &str) -> String {
    id.split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
