use crate::extract::document::Document;
use crate::extract::postprocess::{apply_chain, Postprocessor};
use scraper::Html;
use serde::Deserialize;
use std::collections::HashMap;

/// Declarative extraction rule for one field
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExtractionRule {
    /// Unique key of the field within a rule set
    pub name: String,

    /// Column header used when the field is exported; falls back to `name`
    #[serde(default)]
    pub label: Option<String>,

    /// Selector locating the element holding the value
    pub selector: String,

    /// Value used when the selector matches nothing
    #[serde(default)]
    pub default: Option<String>,

    /// Transforms applied, in order, to the matched text
    #[serde(default)]
    pub postprocessors: Vec<Postprocessor>,
}

impl ExtractionRule {
    pub fn new(name: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            selector: selector.into(),
            default: None,
            postprocessors: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_postprocessor(mut self, step: Postprocessor) -> Self {
        self.postprocessors.push(step);
        self
    }

    pub fn header_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    /// Value used when the selector matches nothing
    fn fallback(&self) -> String {
        self.default.clone().unwrap_or_default()
    }
}

/// Field values extracted from one detail page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    url: String,
    fields: HashMap<String, String>,
}

impl Record {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            fields: HashMap::new(),
        }
    }

    /// Builds a record from `(name, value)` pairs
    pub fn from_fields<I, K, V>(url: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            url: url.into(),
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// The page this record was extracted from
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Extracts the raw value of one field
///
/// Takes the trimmed text of the first element matching the rule's selector.
/// When nothing matches, returns the rule's default or an empty string. Never
/// fails.
pub fn extract(rule: &ExtractionRule, document: &impl Document) -> String {
    match_text(rule, document).unwrap_or_else(|| rule.fallback())
}

/// Applies every rule to `document`, producing one record
///
/// Fields are extracted independently. Each rule's postprocessor chain runs on
/// the matched text; a default value is stored as written.
pub fn extract_all(rules: &[ExtractionRule], document: &impl Document, url: &str) -> Record {
    let mut record = Record::new(url);

    for rule in rules {
        let value = match match_text(rule, document) {
            Some(text) => apply_chain(&rule.postprocessors, &text),
            None => rule.fallback(),
        };
        record.fields.insert(rule.name.clone(), value);
    }

    record
}

/// Trimmed text of the first element matching the rule, if any
fn match_text(rule: &ExtractionRule, document: &impl Document) -> Option<String> {
    document
        .first_text(&rule.selector)
        .map(|text| text.trim().to_string())
}

/// Parses `body` as HTML and extracts a record from it
///
/// The parsed document lives only for the duration of this call.
pub fn extract_page(rules: &[ExtractionRule], body: &str, url: &str) -> Record {
    let document = Html::parse_document(body);
    extract_all(rules, &document, url)
}
