//! Link discovery on category listing pages
//!
//! The listing page is the only source of work for a crawl, so any failure to
//! use it is fatal and reported as [`HarvestError::DiscoveryFailed`].

use crate::crawler::fetcher::{fetch_page, FetchError, Fetcher};
use crate::crawler::retry::RetryPolicy;
use crate::extract::Document;
use crate::HarvestError;
use scraper::Html;
use std::time::Duration;
use url::Url;

/// Fetches a listing page and returns the detail-page links it exposes
///
/// # Arguments
///
/// * `fetcher` - Transport used for the listing fetch
/// * `listing_url` - Absolute URL of the listing page
/// * `link_selector` - Selector matching the link elements
/// * `timeout` - Per-fetch timeout
/// * `retry` - Retry policy for the listing fetch
///
/// # Returns
///
/// * `Ok(Vec<String>)` - Absolute URLs in document order, duplicates kept
/// * `Err(HarvestError::DiscoveryFailed)` - Network error, non-2xx status or
///   empty body
pub async fn discover_links(
    fetcher: &dyn Fetcher,
    listing_url: &str,
    link_selector: &str,
    timeout: Duration,
    retry: &RetryPolicy,
) -> Result<Vec<String>, HarvestError> {
    let base = Url::parse(listing_url).map_err(|e| discovery_failed(listing_url, e))?;

    tracing::debug!("Fetching listing page {}", listing_url);
    let body = fetch_page(fetcher, listing_url, timeout, retry)
        .await
        .map_err(|e| discovery_failed(listing_url, e))?;

    if body.trim().is_empty() {
        return Err(discovery_failed(listing_url, FetchError::EmptyBody));
    }

    let links = extract_links(&body, link_selector, &base);
    tracing::info!("Discovered {} links on {}", links.len(), listing_url);

    Ok(links)
}

/// Extracts link targets matching `link_selector` from listing HTML
///
/// Relative targets are resolved against the origin of `listing_url`.
/// Elements without an `href`, empty targets and targets that cannot be
/// resolved are skipped. Order and duplicates are preserved.
///
/// # Example
///
/// ```
/// use course_harvest::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<a class="CardText-link" href="/learn/rust">Rust</a>"#;
/// let base = Url::parse("https://www.example.com/browse/programming").unwrap();
/// let links = extract_links(html, "a.CardText-link", &base);
/// assert_eq!(links, vec!["https://www.example.com/learn/rust"]);
/// ```
pub fn extract_links(html: &str, link_selector: &str, listing_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let origin = origin_of(listing_url);

    document
        .link_targets(link_selector)
        .iter()
        .filter_map(|href| resolve_link(href, &origin))
        .collect()
}

/// The listing URL reduced to scheme, host and port
fn origin_of(url: &Url) -> Url {
    let mut origin = url.clone();
    origin.set_path("/");
    origin.set_query(None);
    origin.set_fragment(None);
    origin
}

fn resolve_link(href: &str, origin: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() {
        tracing::debug!("Skipping empty link target");
        return None;
    }

    match origin.join(href) {
        Ok(url) => Some(url.to_string()),
        Err(e) => {
            tracing::debug!("Skipping unresolvable link {}: {}", href, e);
            None
        }
    }
}

fn discovery_failed(url: &str, reason: impl ToString) -> HarvestError {
    HarvestError::DiscoveryFailed {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}
