//! Course-Harvest main entry point
//!
//! This is the command-line interface for the Course-Harvest scraper. By
//! default it serves the HTTP download API; flags select one-shot modes.

use anyhow::{anyhow, Context};
use chrono::Utc;
use clap::Parser;
use course_harvest::catalog::Catalog;
use course_harvest::config::{load_config_with_hash, Config};
use course_harvest::crawler::crawl_category;
use course_harvest::output::{encode_csv, export_file_name, write_export};
use course_harvest::server::{serve, AppState};
use course_harvest::FailureKind;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Course-Harvest: a rule-driven course catalog scraper
///
/// Course-Harvest discovers course pages from category listings, extracts a
/// configured set of fields from each one and exports the result as CSV.
#[derive(Parser, Debug)]
#[command(name = "course-harvest")]
#[command(version)]
#[command(about = "A rule-driven course catalog scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the resolved categories and fields, then exit
    #[arg(long, conflicts_with_all = ["list", "export"])]
    dry_run: bool,

    /// List the configured categories and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export"])]
    list: bool,

    /// Crawl one category and write its CSV, then exit
    #[arg(long, value_name = "CATEGORY_ID", conflicts_with_all = ["dry_run", "list"])]
    export: Option<String>,

    /// Write the exported CSV to this file instead of the export directory
    #[arg(short, long, value_name = "FILE", requires = "export")]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let catalog = Catalog::from_config(&config)?;

    if cli.dry_run {
        handle_dry_run(&config, &catalog);
    } else if cli.list {
        handle_list(&catalog);
    } else if let Some(category_id) = &cli.export {
        handle_export(&config, &catalog, category_id, cli.output.as_deref()).await?;
    } else {
        handle_serve(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("course_harvest=info,warn"),
            1 => EnvFilter::new("course_harvest=debug,info"),
            2 => EnvFilter::new("course_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows what a crawl would use
fn handle_dry_run(config: &Config, catalog: &Catalog) {
    println!("=== Course-Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!(
        "  Max concurrent fetches: {}",
        config.crawler.max_concurrent_fetches
    );
    println!("  Fetch timeout: {}ms", config.crawler.fetch_timeout);
    match config.crawler.crawl_deadline {
        Some(deadline) => println!("  Crawl deadline: {}ms", deadline),
        None => println!("  Crawl deadline: none"),
    }
    println!(
        "  Attempts per fetch: {} (backoff {}ms)",
        config.crawler.retry_attempts, config.crawler.retry_backoff
    );

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nSite:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Link selector: {}", config.site.link_selector);

    println!("\nCategories ({}):", catalog.len());
    for category in catalog.iter() {
        println!("  - {} ({})", category.id, category.listing_url);
    }

    println!("\nFields ({}):", config.fields.len());
    for rule in &config.fields {
        println!(
            "  - {} [{}] <- {} ({} postprocessors)",
            rule.name,
            rule.header_label(),
            rule.selector,
            rule.postprocessors.len()
        );
    }

    println!("\nServer: {}", config.server.bind);
    match &config.output.export_dir {
        Some(dir) => println!("Export directory: {}", dir),
        None => println!("Export directory: disabled"),
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --list mode
fn handle_list(catalog: &Catalog) {
    for category in catalog.iter() {
        println!("{}\t{}", category.id, category.name);
    }
}

/// Handles the --export mode: crawls one category and writes its CSV
async fn handle_export(
    config: &Config,
    catalog: &Catalog,
    category_id: &str,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let category = catalog
        .get(category_id)
        .ok_or_else(|| anyhow!("Unknown category '{}'", category_id))?;

    tracing::info!("Crawling {} ({})", category.name, category.listing_url);
    let result = crawl_category(config, category).await?;

    for failure in result.failures_of(FailureKind::FetchFailed) {
        tracing::warn!("Failed {}: {}", failure.url, failure.message);
    }
    let cancelled = result.failures_of(FailureKind::Cancelled).count();
    if cancelled > 0 {
        tracing::warn!("{} pages cancelled by the crawl deadline", cancelled);
    }

    let csv = encode_csv(
        &config.header_labels(),
        &result.records,
        &config.field_order(),
    );

    match (output, &config.output.export_dir) {
        (Some(path), _) => {
            std::fs::write(path, &csv)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("✓ {} records written to {}", result.records.len(), path.display());
        }
        (None, Some(dir)) => {
            let file_name = export_file_name(&category.id, Utc::now());
            let path = write_export(Path::new(dir), &file_name, &csv)?;
            println!("✓ {} records written to {}", result.records.len(), path.display());
        }
        (None, None) => print!("{}", csv),
    }

    Ok(())
}

/// Handles the default mode: serves the HTTP API
async fn handle_serve(config: Config) -> anyhow::Result<()> {
    let bind = config.server.bind.clone();
    let state = AppState::from_config(config)?;

    tracing::info!("Serving {} categories", state.catalog.len());
    serve(state, &bind).await?;

    Ok(())
}
