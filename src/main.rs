//! sitemap-crawler main entry point
//!
//! Crawls one site from the command line and prints its sitemap.

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use sitemap_crawler::config::{load_config_with_hash, Config};
use sitemap_crawler::output::{write_sitemap, StatusEvent};
use sitemap_crawler::service::{CrawlService, CrawlUrlInput};
use sitemap_crawler::storage::CrawlStorage;
use std::path::PathBuf;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing_subscriber::EnvFilter;

/// sitemap-crawler: crawl a site and emit its sitemap
///
/// Starting from URL, follows links that stay on the site until the URL
/// budget is reached or nothing new is found, then prints the result as
/// sitemap XML or JSON.
#[derive(Parser, Debug)]
#[command(name = "sitemap-crawler")]
#[command(version)]
#[command(about = "Crawl a site and emit its sitemap", long_about = None)]
struct Cli {
    /// Seed URL to crawl
    #[arg(value_name = "URL")]
    url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum number of URLs to keep (overrides crawler.default-max-urls)
    #[arg(long, value_name = "N")]
    max_urls: Option<usize>,

    /// Pause between crawl rounds in milliseconds (overrides crawler.default-delay)
    #[arg(long, value_name = "MS")]
    delay: Option<u64>,

    /// Keep links outside the crawled site in the sitemap
    #[arg(long)]
    external_links: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Xml)]
    format: Format,

    /// Also write the sitemap XML to this file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Xml,
    Json,
}

/// JSON document printed with `--format json`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CrawlReport {
    url: String,
    is_crawling: bool,
    crawled_data: Vec<String>,
    hrefs: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            Config::default()
        }
    };

    run(cli, config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitemap_crawler=info,warn"),
            1 => EnvFilter::new("sitemap_crawler=debug,info"),
            2 => EnvFilter::new("sitemap_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    let (service, _event_loop) =
        CrawlService::from_config(&config).context("failed to start crawler")?;
    let mut events = service.subscribe();

    let message = service.crawl_url(CrawlUrlInput {
        url: cli.url.clone(),
        delay: cli.delay,
        max_urls: cli.max_urls,
    })?;
    tracing::info!("{}", message);

    wait_until_finished(&mut events, &cli.url).await?;

    let external_links = cli.external_links.then_some(true);
    let sitemap = service.generate_sitemap(&cli.url, external_links).await?;
    tracing::info!("Sitemap for {} lists {} links", cli.url, sitemap.hrefs.len());

    if let Some(path) = &cli.output {
        write_sitemap(&sitemap.hrefs, path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!("Sitemap written to: {}", path.display());
    }

    match cli.format {
        Format::Xml => println!("{}", sitemap.xml),
        Format::Json => {
            let record = service.storage().get(&cli.url).await.unwrap_or_default();
            let report = CrawlReport {
                url: cli.url,
                is_crawling: record.is_crawling,
                crawled_data: record.crawled_data,
                hrefs: sitemap.hrefs,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

async fn wait_until_finished(
    events: &mut broadcast::Receiver<StatusEvent>,
    url: &str,
) -> anyhow::Result<()> {
    loop {
        match events.recv().await {
            Ok(StatusEvent::Finished { url: finished, .. }) if finished == url => return Ok(()),
            Ok(event) => tracing::debug!("Status event: {:?}", event),
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!("Missed {} status events", skipped);
            }
            Err(RecvError::Closed) => bail!("status channel closed before {} finished", url),
        }
    }
}
