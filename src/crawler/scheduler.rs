//! Scheduler for repeating crawl cycles
//!
//! The scheduler owns the seen-set and runs cycles back to back with a fixed
//! pause between the end of one cycle and the start of the next, so cycles
//! never overlap.

use crate::crawler::coordinator::CrawlCycle;
use crate::crawler::seen::SeenSet;
use crate::crawler::stats::CycleStats;
use crate::HarvestError;
use std::future::Future;
use std::time::Duration;

/// Runs a [`CrawlCycle`] once or on a polling interval
pub struct Scheduler {
    cycle: CrawlCycle,
    seen: SeenSet,
    period: Duration,
}

impl Scheduler {
    /// Creates a scheduler with an empty seen-set
    pub fn new(cycle: CrawlCycle, period: Duration) -> Self {
        Self::with_seen(cycle, period, SeenSet::new())
    }

    /// Creates a scheduler that treats `seen` as already downloaded
    pub fn with_seen(cycle: CrawlCycle, period: Duration, seen: SeenSet) -> Self {
        Self {
            cycle,
            seen,
            period,
        }
    }

    pub fn seen(&self) -> &SeenSet {
        &self.seen
    }

    /// Runs a single crawl cycle
    pub async fn run_once(&mut self) -> Result<CycleStats, HarvestError> {
        self.cycle.run_cycle(&mut self.seen).await
    }

    /// Polls until Ctrl-C is received
    ///
    /// Returns the number of cycles that ran to completion.
    pub async fn run_forever(&mut self) -> usize {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Polls until `shutdown` completes
    ///
    /// A failed cycle is logged and the next one runs after the usual pause.
    /// Shutdown is honored both while a cycle runs (the cycle is dropped) and
    /// during the pause.
    ///
    /// Returns the number of cycles that ran to completion.
    pub async fn run_until<F: Future>(&mut self, shutdown: F) -> usize {
        tokio::pin!(shutdown);
        let mut cycles = 0;

        loop {
            tokio::select! {
                result = self.cycle.run_cycle(&mut self.seen) => {
                    cycles += 1;
                    match result {
                        Ok(stats) => tracing::debug!(
                            cycle = cycles,
                            processed = stats.processed,
                            seen = self.seen.len(),
                            "Cycle complete"
                        ),
                        Err(e) => tracing::error!(cycle = cycles, "Crawl cycle failed: {}", e),
                    }
                }
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested during cycle");
                    break;
                }
            }

            tracing::debug!("Next cycle in {:?}", self.period);
            tokio::select! {
                _ = tokio::time::sleep(self.period) => {}
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested");
                    break;
                }
            }
        }

        cycles
    }
}
