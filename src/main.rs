//! TapMap main entry point
//!
//! This is the command-line interface for the TapMap interaction-surface scanner.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tapmap::config::{
    load_settings, ScanConfig, Settings, DEFAULT_MAX_DEPTH, DEFAULT_MAX_PAGES, DEFAULT_RATE_LIMIT,
};
use tapmap::crawler::{generate_scan_id, run_crawl, ScanOutcome};
use tapmap::export::{dedup_rows, write_csv};
use tapmap::storage::ScanStore;
use tapmap::url::{ensure_public_target, DomainKey};
use tapmap::ElementResult;
use tracing_subscriber::EnvFilter;

/// TapMap: a bounded interaction-surface scanner
///
/// TapMap renders a website in a real browser, dismisses consent overlays,
/// and catalogs every interactive element it finds, while honoring
/// robots.txt, rate limits, and page/depth/time caps. Results land in a
/// SQLite database and can optionally be exported to CSV.
#[derive(Parser, Debug)]
#[command(name = "tapmap")]
#[command(version = "1.0.0")]
#[command(about = "A bounded interaction-surface scanner", long_about = None)]
struct Cli {
    /// Seed URL to scan (the crawl never leaves its domain)
    #[arg(value_name = "URL")]
    url: String,

    /// Maximum number of pages to visit (clamped to 1..=1000)
    #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
    max_pages: u32,

    /// Maximum link depth from the seed (clamped to 1..=20)
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: u32,

    /// Requests per second (floored at 0.5)
    #[arg(long, default_value_t = DEFAULT_RATE_LIMIT)]
    rate_limit: f64,

    /// Label recorded with each element's domain-context classification
    #[arg(long, default_value = "Pharma")]
    tag_name: String,

    /// Comma-separated keywords that mark copy as tag-relevant
    #[arg(long, value_delimiter = ',')]
    tag_keywords: Vec<String>,

    /// Path to a TOML settings file (timeouts, viewport, user agent)
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Override the database path from settings
    #[arg(long, value_name = "FILE")]
    db: Option<PathBuf>,

    /// Export extracted elements to a CSV file after the scan
    #[arg(long, value_name = "FILE")]
    csv: Option<PathBuf>,

    /// Drop duplicate rows (same text, selector, and target) from the CSV
    #[arg(long, requires = "csv")]
    dedup: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let settings = match &cli.settings {
        Some(path) => {
            tracing::info!("Loading settings from: {}", path.display());
            match load_settings(path) {
                Ok(settings) => settings,
                Err(e) => {
                    tracing::error!("Failed to load settings: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => Settings::default(),
    };

    handle_scan(&cli, settings).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("tapmap=info,warn"),
            1 => EnvFilter::new("tapmap=debug,info"),
            2 => EnvFilter::new("tapmap=trace,debug"),
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

/// Handles the scan: records it, runs the crawl, and stores the outcome
///
/// The scan row is created as `pending` before the browser launches and
/// finalized from whatever the crawl returns, so an aborted run still leaves
/// an auditable record behind.
async fn handle_scan(cli: &Cli, settings: Settings) -> anyhow::Result<()> {
    // Snapshot the clamped limits so the database echoes what actually ran
    let keywords = if cli.tag_keywords.is_empty() {
        None
    } else {
        Some(cli.tag_keywords.clone())
    };
    let config = ScanConfig::new(&cli.url)
        .with_max_pages(cli.max_pages)
        .with_max_depth(cli.max_depth)
        .with_rate_limit(cli.rate_limit)
        .with_tag(&cli.tag_name, keywords)
        .effective();

    ensure_public_target(&config.url).await?;

    let domain = DomainKey::from_url(&config.url)?;
    let scan_id = generate_scan_id(&domain.to_string());
    tracing::info!("Scan {} targets {}", scan_id, domain);
    tracing::info!(
        "Limits: {} pages, depth {}, {:.1} req/s",
        config.max_pages,
        config.max_depth,
        config.rate_limit
    );

    let db_path = match &cli.db {
        Some(path) => path.clone(),
        None => PathBuf::from(&settings.database_path),
    };
    let mut store = ScanStore::open(&db_path)?;
    store.create_scan(&scan_id, &domain.to_string(), &config)?;
    store.mark_running(&scan_id)?;

    let started = Instant::now();
    match run_crawl(&config, &settings, &scan_id).await {
        Ok(outcome) => {
            let duration = started.elapsed();
            store.record_outcome(&scan_id, &outcome, duration)?;
            print_summary(&scan_id, &outcome, duration, &db_path);

            if let Some(csv_path) = &cli.csv {
                export_csv(csv_path, &outcome, cli.dedup)?;
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Scan failed: {}", e);
            store.record_failure(&scan_id, &e.to_string())?;
            Err(e.into())
        }
    }
}

/// Prints the post-scan summary
fn print_summary(scan_id: &str, outcome: &ScanOutcome, duration: Duration, db_path: &Path) {
    println!("\n=== Scan Summary ===\n");
    println!("Scan ID: {}", scan_id);
    println!("Status: {}", outcome.status);
    println!("Quality: {}", outcome.quality());
    println!(
        "Pages visited: {} ({} errors)",
        outcome.pages.len(),
        outcome.error_page_count()
    );
    println!("Elements extracted: {}", outcome.total_elements());

    match &outcome.consent {
        Some(consent) if consent.detected => {
            println!(
                "Consent banner: {} (action: {})",
                consent.framework, consent.action
            );
        }
        Some(_) => println!("Consent banner: not detected"),
        None => println!("Consent banner: not checked"),
    }

    let robots_note = match (outcome.robots.found, outcome.robots.allowed) {
        (true, true) => "found, scan allowed",
        (true, false) => "found, scan disallowed",
        (false, _) => "not found (permissive)",
    };
    println!("robots.txt: {}", robots_note);

    if outcome.analytics.is_empty() {
        println!("Analytics: none detected");
    } else {
        println!("Analytics: {}", outcome.analytics.join(", "));
    }
    println!("Duration: {:.1}s", duration.as_secs_f64());

    println!("\n✓ Results stored in: {}", db_path.display());
}

/// Writes extracted elements to CSV, deduplicating when requested
fn export_csv(path: &Path, outcome: &ScanOutcome, dedup: bool) -> tapmap::Result<()> {
    let elements: Vec<ElementResult> = outcome
        .pages
        .iter()
        .flat_map(|page| page.elements.iter().cloned())
        .collect();

    let rows = if dedup { dedup_rows(&elements) } else { elements };
    write_csv(path, &rows)?;

    println!("✓ CSV exported to: {} ({} rows)", path.display(), rows.len());
    Ok(())
}
