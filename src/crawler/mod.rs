//! Crawler module for fetching and persisting aggregator items
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with a bounded timeout
//! - Front page and detail page parsing
//! - Per-item processing with concurrent comment fetches
//! - Crawl cycle coordination under a concurrency limit
//! - Repeating cycles on a polling interval

mod coordinator;
mod fetcher;
mod item;
mod parser;
mod scheduler;
mod seen;
mod stats;

pub use coordinator::CrawlCycle;
pub use fetcher::{build_http_client, FetchError, FetchedPage, Fetcher};
pub use item::{placeholder_body, ItemProcessor, DETAIL_FILE_NAME};
pub use parser::{parse_detail_page, parse_front_page, Item, ParseError, ParsedItem};
pub use scheduler::Scheduler;
pub use seen::SeenSet;
pub use stats::CycleStats;

use crate::config::Config;
use crate::HarvestError;

/// Runs a single crawl cycle with a fresh seen-set
///
/// This is the entry point for one-shot use. It will:
/// 1. Create the output directory if needed
/// 2. Build the HTTP client
/// 3. Fetch the front page and process every item on it
///
/// # Returns
///
/// * `Ok(CycleStats)` - The cycle ran
/// * `Err(HarvestError)` - Setup failed or the front page was unavailable
pub async fn crawl_once(config: &Config) -> Result<CycleStats, HarvestError> {
    let cycle = CrawlCycle::new(config)?;
    cycle.storage().ensure_root().await?;
    cycle.run_cycle(&mut SeenSet::new()).await
}
