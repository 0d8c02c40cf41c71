//! news-harvester main entry point
//!
//! This is the command-line interface for the news-harvester crawler.

use anyhow::Context;
use clap::Parser;
use news_harvester::config::{load_config_with_hash, validate, Config};
use news_harvester::crawler::{CrawlCycle, Scheduler};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Instant;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

/// Timestamp format used in log lines
const LOG_TIME_FORMAT: &str = "%Y.%m.%d %H:%M:%S";

/// news-harvester: mirror a news aggregator to disk
///
/// Polls the aggregator's front page, and for every new item stores the
/// discussion page, the linked article and every page linked from the
/// comments under a per-item directory.
#[derive(Parser, Debug)]
#[command(name = "news-harvester")]
#[command(version)]
#[command(about = "Mirror a news aggregator's items to disk", long_about = None)]
struct Cli {
    /// Path to an optional TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Result output folder
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Seconds between the end of one cycle and the start of the next
    #[arg(short, long, value_name = "SECS")]
    period: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Retry attempts per request (reserved; requests are not retried)
    #[arg(long, value_name = "N")]
    retry: Option<u32>,

    /// Maximum number of items processed at the same time
    #[arg(short, long, value_name = "N")]
    concurrency: Option<u32>,

    /// Run a single crawl cycle and exit
    #[arg(long)]
    once: bool,

    /// Append log output to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    log: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with_all = ["verbose", "debug"])]
    quiet: bool,
}

impl Cli {
    /// Applies command-line overrides on top of the loaded configuration
    fn apply(&self, config: &mut Config) {
        if let Some(output) = &self.output {
            config.output.directory = output.clone();
        }
        if let Some(period) = self.period {
            config.schedule.period = period;
        }
        if let Some(timeout) = self.timeout {
            config.crawler.request_timeout = timeout;
        }
        if let Some(retry) = self.retry {
            config.crawler.retries = retry;
        }
        if let Some(concurrency) = self.concurrency {
            config.crawler.max_concurrent_items = concurrency;
        }
        if self.once {
            config.schedule.once = true;
        }
    }

    fn verbosity(&self) -> u8 {
        if self.debug {
            self.verbose.max(1)
        } else {
            self.verbose
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbosity(), cli.quiet, cli.log.as_ref())?;

    let started = Instant::now();

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };
    cli.apply(&mut config);
    validate(&config).context("Invalid configuration")?;

    if config.crawler.retries > 0 {
        tracing::debug!(
            retries = config.crawler.retries,
            "Retry count accepted but requests are not retried"
        );
    }

    let cycle = CrawlCycle::new(&config).context("Failed to set up crawler")?;
    cycle
        .storage()
        .ensure_root()
        .await
        .context("Output directory is not usable")?;

    tracing::info!(
        site = %config.crawler.site_url,
        output = %config.output.directory.display(),
        concurrency = config.crawler.max_concurrent_items,
        timeout_secs = config.crawler.request_timeout,
        "Starting harvester"
    );

    let mut scheduler = Scheduler::new(cycle, config.schedule.period());

    if config.schedule.once {
        if let Err(e) = scheduler.run_once().await {
            tracing::error!("Crawl cycle failed: {}", e);
        }
    } else {
        let cycles = scheduler.run_forever().await;
        tracing::info!(cycles, items = scheduler.seen().len(), "Stopped polling");
    }

    tracing::info!("Finished in {:?}", started.elapsed());
    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool, log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("news_harvester=info,warn"),
            1 => EnvFilter::new("news_harvester=debug,info"),
            _ => EnvFilter::new("news_harvester=trace,debug"),
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(ChronoLocal::new(LOG_TIME_FORMAT.to_string()))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.init(),
    }

    Ok(())
}
