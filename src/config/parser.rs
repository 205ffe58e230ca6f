use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use course_harvest::config::load_config;
///
/// let config = load_config(Path::new("harvest.toml")).unwrap();
/// println!("Categories: {}", config.categories.len());
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so an export can be traced back to the rule set that
/// produced it.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Postprocessor;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    const VALID_CONFIG: &str = r##"
[crawler]
max-concurrent-fetches = 4
fetch-timeout = 5000
crawl-deadline = 60000

[user-agent]
crawler-name = "TestHarvest"
crawler-version = "1.0"
contact-url = "https://example.com/about"
contact-email = "admin@example.com"

[output]
export-dir = "./exports"

[site]
base-url = "https://www.coursera.org"
link-selector = "a.CardText-link"

[[category]]
path = "/browse/data-science"

[[category]]
path = "/browse/math-and-logic"

[[field]]
name = "course_name"
label = "Course Name"
selector = "h1.banner-title"

[[field]]
name = "first_instructor"
label = "First Instructor Name"
selector = ".instructor-count-display>span"
default = ""

[[field]]
name = "number_of_ratings"
label = "# of Ratings"
selector = "[data-test=ratings-count-without-asterisks]>span"
postprocessors = [
    { kind = "replace", from = ",", to = "" },
    { kind = "replace", from = "ratings" },
    { kind = "strip" },
]
"##;

    #[test]
    fn test_load_valid_config() {
        let file = create_temp_config(VALID_CONFIG);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.max_concurrent_fetches, 4);
        assert_eq!(config.crawler.fetch_timeout, 5000);
        assert_eq!(config.crawler.crawl_deadline, Some(60000));
        assert_eq!(config.crawler.retry_attempts, 1);
        assert_eq!(config.user_agent.crawler_name, "TestHarvest");
        assert_eq!(config.output.export_dir.as_deref(), Some("./exports"));
        assert_eq!(config.server.bind, "0.0.0.0:1880");
        assert_eq!(config.categories.len(), 2);
        assert_eq!(config.fields.len(), 3);
    }

    #[test]
    fn test_postprocessors_parsed_in_order() {
        let config = parse_config(VALID_CONFIG).unwrap();
        let ratings = &config.fields[2];

        assert_eq!(
            ratings.postprocessors,
            vec![
                Postprocessor::Replace {
                    from: ",".to_string(),
                    to: String::new()
                },
                Postprocessor::Replace {
                    from: "ratings".to_string(),
                    to: String::new()
                },
                Postprocessor::Strip,
            ]
        );
    }

    #[test]
    fn test_header_labels_and_field_order() {
        let config = parse_config(VALID_CONFIG).unwrap();
        assert_eq!(
            config.header_labels(),
            vec!["Course Name", "First Instructor Name", "# of Ratings"]
        );
        assert_eq!(
            config.field_order(),
            vec!["course_name", "first_instructor", "number_of_ratings"]
        );
        assert_eq!(config.fields[1].default.as_deref(), Some(""));
        assert_eq!(config.fields[0].default, None);
    }

    #[test]
    fn test_crawler_defaults() {
        let content = VALID_CONFIG.replace(
            "max-concurrent-fetches = 4\nfetch-timeout = 5000\ncrawl-deadline = 60000\n",
            "",
        );
        let config = parse_config(&content).unwrap();
        assert_eq!(config.crawler.max_concurrent_fetches, 6);
        assert_eq!(config.crawler.fetch_timeout, 30_000);
        assert_eq!(config.crawler.crawl_deadline, None);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/harvest.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let content = VALID_CONFIG.replace(
            "max-concurrent-fetches = 4",
            "max-concurrent-fetches = 0",
        );
        let result = parse_config(&content);
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_unknown_postprocessor_kind_rejected() {
        let content = VALID_CONFIG.replace("{ kind = \"strip\" }", "{ kind = \"uppercase\" }");
        assert!(matches!(parse_config(&content), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_bundled_config_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("harvest.toml");
        let config = load_config(&path).unwrap();

        assert_eq!(config.categories.len(), 11);
        assert_eq!(
            config.header_labels(),
            vec![
                "Category Name",
                "Course Name",
                "First Instructor Name",
                "Course Description",
                "# of Students Enrolled",
                "# of Ratings",
            ]
        );
        assert_eq!(config.server.bind, "0.0.0.0:1880");
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }
}
