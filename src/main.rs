//! Site-Archiver main entry point
//!
//! This is the command-line interface for archiving a website on the
//! Wayback Machine.

use anyhow::{Context, Result};
use clap::Parser;
use site_archiver::config::{
    apply_file_config, load_config, parse_ignore_list, validate, CrawlConfig,
};
use site_archiver::crawler::run_crawl;
use site_archiver::report::{print_statistics, Reporter, SilentReporter, TracingReporter};
use site_archiver::url::parse_base_url;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Site-Archiver: archives a website via archive.org
///
/// Crawls every page reachable from the base URL on the same site and asks
/// the Wayback Machine to capture each one that has no snapshot yet.
#[derive(Parser, Debug)]
#[command(name = "site-archiver")]
#[command(version = "1.0.0")]
#[command(about = "Archives a website via archive.org", long_about = None)]
struct Cli {
    /// The base URL to request
    #[arg(value_name = "BASE_URL")]
    base_url: String,

    /// Use the base URL as an index page: every link is archived, none is stepped into
    #[arg(short = 'i', long = "index-page")]
    index_page: bool,

    /// Number of retries before giving up on a URL [default: 3]
    #[arg(short, long)]
    retries: Option<u32>,

    /// A partial end of a path to skip to before archiving starts
    #[arg(short, long, value_name = "PATH_SUFFIX")]
    skip_to: Option<String>,

    /// Comma-separated Wayback error codes to ignore, or "any"
    #[arg(short = 'I', long, value_name = "CODES")]
    ignore: Option<String>,

    /// Ignore the query part of URLs
    #[arg(short = 'Q', long = "ignore-query")]
    ignore_query: bool,

    /// Treat URLs whose query parameters differ only in order as the same URL
    #[arg(long)]
    sort_query: bool,

    /// Suppress most output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Don't actually archive the URLs
    #[arg(short, long)]
    dry_run: bool,

    /// Don't check whether the Wayback Machine already has the page
    #[arg(short = 'R', long)]
    rearchive: bool,

    /// User-Agent sent to the archived site
    #[arg(short = 'u', long)]
    user_agent: Option<String>,

    /// Comma-separated schemes a discovered link may use
    #[arg(long, value_delimiter = ',', value_name = "SCHEMES")]
    schemes: Option<Vec<String>>,

    /// Give up on a snapshot lookup after this many attempts (default: never)
    #[arg(long, value_name = "N")]
    lookup_retries: Option<u32>,

    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;

    let reporter: Arc<dyn Reporter> = if cli.quiet {
        Arc::new(SilentReporter)
    } else {
        Arc::new(TracingReporter)
    };

    let stats = run_crawl(config, reporter)
        .await
        .context("Failed to start crawl")?;

    if !cli.quiet {
        println!();
        print_statistics(&stats);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity
fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("site_archiver=debug,info")
    } else {
        EnvFilter::new("site_archiver=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Assembles the crawl configuration: defaults, then the config file, then flags
fn build_config(cli: &Cli) -> Result<CrawlConfig> {
    let base_url = parse_base_url(&cli.base_url).context("Invalid base URL")?;
    let mut config = CrawlConfig::new(base_url);

    if let Some(path) = &cli.config {
        tracing::info!("Loading configuration from: {}", path.display());
        let file = load_config(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
        apply_file_config(&mut config, file)?;
    }

    if let Some(ignore) = &cli.ignore {
        config.ignore = parse_ignore_list(ignore)?;
    }
    if let Some(retries) = cli.retries {
        config.retries = retries;
    }
    if let Some(user_agent) = &cli.user_agent {
        config.user_agent = user_agent.clone();
    }
    if let Some(schemes) = &cli.schemes {
        config.schemes = schemes.iter().map(|s| s.trim().to_ascii_lowercase()).collect();
    }
    if cli.lookup_retries.is_some() {
        config.lookup_retries = cli.lookup_retries;
    }

    config.as_index = cli.index_page;
    config.skip_to = cli.skip_to.clone();
    config.drop_query |= cli.ignore_query;
    config.sort_query |= cli.sort_query;
    config.dry_run = cli.dry_run;
    config.rearchive = cli.rearchive;
    config.verbose = cli.verbose;

    validate(&config)?;

    Ok(config)
}
