use scraper::{Html, Selector};

/// Read-only view of a parsed page
///
/// Selectors are opaque strings; a selector the engine cannot parse behaves
/// exactly like one that matches nothing.
pub trait Document {
    /// Text content of the first element matching `selector`
    fn first_text(&self, selector: &str) -> Option<String>;

    /// `href` targets of every element matching `selector`, in document order
    ///
    /// Elements without an `href` attribute are skipped.
    fn link_targets(&self, selector: &str) -> Vec<String>;
}

impl Document for Html {
    fn first_text(&self, selector: &str) -> Option<String> {
        let selector = Selector::parse(selector).ok()?;

        self.select(&selector)
            .next()
            .map(|element| element.text().collect::<String>())
    }

    fn link_targets(&self, selector: &str) -> Vec<String> {
        let Ok(selector) = Selector::parse(selector) else {
            tracing::debug!("Unparsable link selector: {}", selector);
            return Vec::new();
        };

        self.select(&selector)
            .filter_map(|element| element.value().attr("href"))
            .map(|href| href.to_string())
            .collect()
    }
}
