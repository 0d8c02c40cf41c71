//! Crawl cycle coordinator
//!
//! One cycle:
//! 1. Fetches the front page (the only failure that aborts a cycle)
//! 2. Parses it into a ranked list of items
//! 3. Drops items already in the seen-set and records the new ones
//! 4. Processes every new item, at most `max-concurrent-items` at a time
//! 5. Waits for all of them (or for the optional cycle deadline)

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, Fetcher};
use crate::crawler::item::ItemProcessor;
use crate::crawler::parser::{parse_front_page, Item};
use crate::crawler::seen::SeenSet;
use crate::crawler::stats::CycleStats;
use crate::state::{ItemOutcome, ItemStage};
use crate::storage::FsStorage;
use crate::HarvestError;
use futures::stream::{FuturesUnordered, StreamExt};
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use url::Url;

/// Runs crawl cycles against one aggregator
pub struct CrawlCycle {
    fetcher: Fetcher,
    processor: ItemProcessor,
    storage: FsStorage,
    limiter: Semaphore,
    site_url: Url,
    cycle_timeout: Option<Duration>,
}

impl CrawlCycle {
    /// Creates a coordinator from the configuration
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlCycle)` - Ready to run cycles
    /// * `Err(HarvestError)` - Bad site URL or the HTTP client could not be built
    pub fn new(config: &Config) -> Result<Self, HarvestError> {
        let site_url = Url::parse(&config.crawler.site_url)?;
        let client = build_http_client(&config.user_agent, config.crawler.request_timeout())?;
        let fetcher = Fetcher::new(client);
        let storage = FsStorage::new(&config.output.directory);

        let processor = ItemProcessor::new(fetcher.clone(), storage.clone(), site_url.clone())
            .with_comment_naming(config.crawler.comment_naming)
            .with_comment_concurrency(config.crawler.comment_concurrency);

        Ok(Self {
            fetcher,
            processor,
            storage,
            limiter: Semaphore::new(config.crawler.max_concurrent_items as usize),
            site_url,
            cycle_timeout: config.crawler.cycle_timeout(),
        })
    }

    pub fn storage(&self) -> &FsStorage {
        &self.storage
    }

    /// Runs one crawl cycle
    ///
    /// New item identifiers are added to `seen` before their processing
    /// starts, so an item that fails is not retried on the next cycle.
    ///
    /// # Returns
    ///
    /// * `Ok(CycleStats)` - The cycle ran; individual items may still have failed
    /// * `Err(HarvestError::FrontPage)` - The front page could not be fetched
    pub async fn run_cycle(&self, seen: &mut SeenSet) -> Result<CycleStats, HarvestError> {
        let start = Instant::now();
        let mut stats = CycleStats::new();

        let front = self
            .fetcher
            .fetch(&self.site_url)
            .await
            .map_err(HarvestError::FrontPage)?;

        let items = parse_front_page(&front.text());
        stats.discovered = items.len();
        if items.is_empty() {
            tracing::warn!(url = %self.site_url, "No items found on the front page");
        }

        let fresh: Vec<Item> = items
            .into_iter()
            .filter(|item| {
                if seen.insert(&item.id) {
                    tracing::info!(item = %item.id, title = %item.title, "Added to fetching");
                    true
                } else {
                    tracing::debug!(item = %item.id, title = %item.title, "Already downloaded");
                    stats.already_seen += 1;
                    false
                }
            })
            .collect();

        let mut pending: FuturesUnordered<_> = fresh
            .iter()
            .map(|item| self.process_limited(item))
            .collect();

        let deadline = self
            .cycle_timeout
            .map(|limit| tokio::time::Instant::now() + limit);

        loop {
            let next = match deadline {
                Some(deadline) => match tokio::time::timeout_at(deadline, pending.next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        stats.timed_out = true;
                        break;
                    }
                },
                None => pending.next().await,
            };

            match next {
                Some(outcome) => stats.record(&outcome),
                None => break,
            }
        }

        stats.elapsed = start.elapsed();
        stats.log_summary();
        Ok(stats)
    }

    /// Processes one item while holding a limiter permit
    async fn process_limited(&self, item: &Item) -> ItemOutcome {
        let _permit = match self.limiter.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                return ItemOutcome::Aborted {
                    stage: ItemStage::FetchDetail,
                    reason: "concurrency limiter closed".to_string(),
                }
            }
        };
        tracing::debug!(item = %item.id, "Acquired item permit");
        self.processor.process(item).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(site: &str, output: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.crawler.site_url = site.to_string();
        config.crawler.request_timeout = 2;
        config.output.directory = output.to_path_buf();
        config
    }

    #[test]
    fn test_new_rejects_bad_site_url() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for("not a url", dir.path());
        assert!(matches!(
            CrawlCycle::new(&config),
            Err(HarvestError::UrlParse(_))
        ));
    }

    #[tokio::test]
    async fn test_front_page_failure_aborts_cycle() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        let dir = tempfile::tempdir().unwrap();
        let cycle = CrawlCycle::new(&config_for(&server.uri(), dir.path())).unwrap();
        let mut seen = SeenSet::new();

        let result = cycle.run_cycle(&mut seen).await;

        assert!(matches!(result, Err(HarvestError::FrontPage(_))));
        assert!(seen.is_empty());
    }

    #[tokio::test]
    async fn test_empty_front_page_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;
        let dir = tempfile::tempdir().unwrap();
        let cycle = CrawlCycle::new(&config_for(&server.uri(), dir.path())).unwrap();

        let stats = cycle.run_cycle(&mut SeenSet::new()).await.unwrap();

        assert_eq!(stats.discovered, 0);
        assert_eq!(stats.processed, 0);
    }
}
