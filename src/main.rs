//! tvpl-crawler main entry point
//!
//! This is the command-line interface for the thuvienphapluat.vn harvester.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tvpl_crawler::config::{load_config_with_hash, validate, Config};
use tvpl_crawler::crawler::{Orchestrator, Pipeline, ProxyFetcher};
use tvpl_crawler::discovery::{
    dedup_preserving_order, discover_documents, discover_listing_pages, discover_sitemap_tree,
};
use tvpl_crawler::model::{ArticleDescriptor, WorkItem};
use tvpl_crawler::storage::{read_listing_csv, write_listing_csv, write_url_list, UrlLineStore};

/// tvpl-crawler: legal document and Q&A harvester
///
/// Discovers legal documents from the site's sitemaps and Q&A articles
/// from its category listings, crawls them through a rotating proxy pool
/// and writes the extracted records as JSON.
#[derive(Parser, Debug)]
#[command(name = "tvpl-crawler")]
#[command(version)]
#[command(about = "Legal document and Q&A harvester for thuvienphapluat.vn", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    /// Validate config and show the planned work without network access
    #[arg(long, global = true)]
    dry_run: bool,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Sitemap discovery, then batch crawl of legal documents
    Documents,
    /// Listing discovery, then batch crawl of Q&A articles
    Articles,
}

impl Command {
    fn pipeline(self) -> Pipeline {
        match self {
            Self::Documents => Pipeline::Documents,
            Self::Articles => Pipeline::Articles,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load(&cli)?;
    let pipeline = cli.command.pipeline();

    if cli.dry_run {
        handle_dry_run(&config, pipeline);
        return Ok(());
    }

    let result = match pipeline {
        Pipeline::Documents => handle_documents(config).await,
        Pipeline::Articles => handle_articles(config).await,
    };

    match result {
        Ok(()) => {
            tracing::info!("Crawl completed successfully");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {:#}", e);
            Err(e)
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("tvpl_crawler=info,warn"),
            1 => EnvFilter::new("tvpl_crawler=debug,info"),
            2 => EnvFilter::new("tvpl_crawler=trace,debug"),
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

/// Loads the configuration file, or validates the defaults when none is given
fn load(cli: &Cli) -> anyhow::Result<Config> {
    match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok(config)
        }
        None => {
            let config = Config::default();
            validate(&config).context("built-in configuration is invalid")?;
            tracing::info!("Using built-in configuration");
            Ok(config)
        }
    }
}

/// Handles the --dry-run mode: shows the effective configuration and plan
fn handle_dry_run(config: &Config, pipeline: Pipeline) {
    println!("=== tvpl-crawler Dry Run ({}) ===\n", pipeline);

    println!("Crawler Configuration:");
    println!("  Threads: {}", config.crawler.threads);
    println!("  Batch size: {}", config.crawler.batch_size);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);

    println!("\nProxy:");
    if config.proxy.enabled {
        println!("  List: {}", config.proxy.list_url);
        println!("  Cache: {}", config.proxy.cache_path.display());
    } else {
        println!("  Disabled (direct connections)");
    }

    let records = pipeline.records_path(&config.output);
    let (successful, failed) = pipeline.ledger_paths(&config.output);
    println!("\nOutput:");
    println!("  Records: {}", records.display());
    println!("  Successful URLs: {}", successful.display());
    println!("  Failed URLs: {}", failed.display());

    println!("\n✓ Configuration is valid");
    match pipeline {
        Pipeline::Documents => {
            let cap = match config.crawler.max_sitemaps {
                0 => "all".to_string(),
                n => n.to_string(),
            };
            println!("✓ Would walk {} leaf sitemap(s) from {}", cap, config.site.sitemap_url);
            println!("✓ Would append document URLs to {}", config.output.urls_path.display());
        }
        Pipeline::Articles => {
            if config.output.listing_path.exists() {
                println!("✓ Would reuse listing export {}", config.output.listing_path.display());
            } else {
                let pages = config.crawler.page_end - config.crawler.page_start + 1;
                println!(
                    "✓ Would fetch {} listing pages ({} categories x {} pages, {} at a time)",
                    config.site.categories.len() as u64 * pages as u64,
                    config.site.categories.len(),
                    pages,
                    config.crawler.listing_threads
                );
            }
        }
    }
}

/// Sitemap discovery → dedup → batch crawl
async fn handle_documents(config: Config) -> anyhow::Result<()> {
    let fetcher = Arc::new(ProxyFetcher::from_config(&config)?);

    let mut leaves = discover_sitemap_tree(&fetcher, &config.site.sitemap_url).await?;
    if config.crawler.max_sitemaps > 0 {
        leaves.truncate(config.crawler.max_sitemaps);
    }

    let store = UrlLineStore::new(&config.output.urls_path);
    discover_documents(&fetcher, &leaves, &store, &config.output.sitemap_dir).await?;

    let urls = dedup_preserving_order(store.load()?);
    tracing::info!(
        "Number of document URLs: {} (from {})",
        urls.len(),
        store.path().display()
    );

    let items = urls.into_iter().map(WorkItem::from_url).collect();
    run_batches(&config, Pipeline::Documents, fetcher, items).await
}

/// Listing discovery (or reuse of the CSV export) → batch crawl
async fn handle_articles(config: Config) -> anyhow::Result<()> {
    let fetcher = Arc::new(ProxyFetcher::from_config(&config)?);
    let listing_path = &config.output.listing_path;

    let descriptors: Vec<ArticleDescriptor> = if listing_path.exists() {
        tracing::info!("Reusing listing export {}", listing_path.display());
        read_listing_csv(listing_path)?
    } else {
        let discovery = discover_listing_pages(
            Arc::clone(&fetcher),
            &config.site.categories,
            config.crawler.page_start..=config.crawler.page_end,
            &config.site.base_url,
            config.crawler.listing_threads,
        )
        .await;

        write_url_list(&config.output.failed_listing_path, &discovery.failed_pages)?;
        let complete: Vec<ArticleDescriptor> = discovery
            .articles
            .into_iter()
            .filter(ArticleDescriptor::has_timestamp)
            .collect();
        write_listing_csv(listing_path, &complete)?;
        complete
    };

    let items: Vec<WorkItem> = descriptors
        .into_iter()
        .filter(ArticleDescriptor::has_timestamp)
        .map(WorkItem::from)
        .collect();
    tracing::info!("Number of article URLs: {}", items.len());

    run_batches(&config, Pipeline::Articles, fetcher, items).await
}

/// Crawls `items` in batches, saving the accumulated records after each one
async fn run_batches(
    config: &Config,
    pipeline: Pipeline,
    fetcher: Arc<ProxyFetcher>,
    items: Vec<WorkItem>,
) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::from_config(pipeline, fetcher, config);
    let records_path = pipeline.records_path(&config.output);

    let batch_size = config.crawler.batch_size.max(1);
    let total_batches = items.len().div_ceil(batch_size);
    tracing::info!("Total batches: {}", total_batches);

    for (index, batch) in items.chunks(batch_size).enumerate() {
        tracing::info!(
            "Processing batch {}/{} ({} URLs)",
            index + 1,
            total_batches,
            batch.len()
        );
        let report = orchestrator.crawl_batch(batch.to_vec()).await?;
        tracing::info!(
            "Batch {}/{} done: {} succeeded, {} failed",
            index + 1,
            total_batches,
            report.succeeded,
            report.failed
        );
        orchestrator.save(records_path)?;
    }

    let ledger = orchestrator.ledger();
    tracing::info!(
        "{} crawl finished: {} successful, {} failed",
        pipeline,
        ledger.successful().len(),
        ledger.failed().len()
    );
    Ok(())
}
