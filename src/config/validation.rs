use crate::catalog::category_id_from_path;
use crate::config::types::{CategoryEntry, Config, CrawlerConfig, SiteConfig, UserAgentConfig};
use crate::extract::ExtractionRule;
use crate::ConfigError;
use scraper::Selector;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_site_config(&config.site)?;
    validate_categories(&config.categories)?;
    validate_fields(&config.fields)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_fetches < 1 || config.max_concurrent_fetches > 100 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-fetches must be between 1 and 100, got {}",
            config.max_concurrent_fetches
        )));
    }

    if config.fetch_timeout == 0 {
        return Err(ConfigError::Validation(
            "fetch-timeout must be greater than 0ms".to_string(),
        ));
    }

    if config.crawl_deadline == Some(0) {
        return Err(ConfigError::Validation(
            "crawl-deadline must be greater than 0ms when set".to_string(),
        ));
    }

    if config.retry_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "retry-attempts must be >= 1, got {}",
            config.retry_attempts
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates the target site
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid base-url '{}': {}", config.base_url, e))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use HTTP or HTTPS",
            config.base_url
        )));
    }

    validate_selector("link-selector", &config.link_selector)
}

/// Validates category entries and makes sure identifiers are unique
fn validate_categories(categories: &[CategoryEntry]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for entry in categories {
        if entry.path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "category path cannot be empty".to_string(),
            ));
        }

        let id = match &entry.id {
            Some(id) => id.clone(),
            None => category_id_from_path(&entry.path),
        };

        if id.is_empty() {
            return Err(ConfigError::Validation(format!(
                "Cannot derive a category id from path '{}'",
                entry.path
            )));
        }

        if !seen.insert(id.clone()) {
            return Err(ConfigError::Validation(format!(
                "Duplicate category id '{}'",
                id
            )));
        }
    }

    Ok(())
}

/// Validates extraction rules: unique non-empty names and parsable selectors
fn validate_fields(fields: &[ExtractionRule]) -> Result<(), ConfigError> {
    if fields.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[field]] rule is required".to_string(),
        ));
    }

    let mut names = HashSet::new();

    for rule in fields {
        if rule.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "field name cannot be empty".to_string(),
            ));
        }

        if !names.insert(rule.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "Duplicate field name '{}'",
                rule.name
            )));
        }

        validate_selector(&rule.name, &rule.selector)?;
    }

    Ok(())
}

/// Rejects selectors the HTML engine cannot parse
fn validate_selector(owner: &str, selector: &str) -> Result<(), ConfigError> {
    Selector::parse(selector).map_err(|e| {
        ConfigError::InvalidSelector(format!("{}: '{}' ({:?})", owner, selector, e))
    })?;
    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact-email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
