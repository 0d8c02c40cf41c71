//! Per-cycle statistics
//!
//! Counters accumulated from item outcomes while a crawl cycle runs, logged
//! once the cycle is over.

use crate::state::{ArticleOutcome, ItemOutcome};
use chrono::{DateTime, Local};
use std::time::Duration;

/// Crawl cycle statistics summary
#[derive(Debug, Clone)]
pub struct CycleStats {
    /// When the cycle started
    pub started_at: DateTime<Local>,

    /// Wall time spent in the cycle
    pub elapsed: Duration,

    /// Items listed on the front page
    pub discovered: usize,

    /// Items skipped because they were seen in an earlier cycle
    pub already_seen: usize,

    /// Items that reached the end of processing
    pub processed: usize,

    /// Items whose detail page could not be fetched or parsed
    pub aborted: usize,

    pub articles_saved: usize,

    /// Articles (or placeholders) that could not be written
    pub articles_failed: usize,

    /// Articles replaced by a placeholder after a failed fetch
    pub placeholders: usize,

    pub comments_saved: usize,

    pub comments_failed: usize,

    /// The cycle deadline fired before every item finished
    pub timed_out: bool,
}

impl CycleStats {
    pub fn new() -> Self {
        Self {
            started_at: Local::now(),
            elapsed: Duration::ZERO,
            discovered: 0,
            already_seen: 0,
            processed: 0,
            aborted: 0,
            articles_saved: 0,
            articles_failed: 0,
            placeholders: 0,
            comments_saved: 0,
            comments_failed: 0,
            timed_out: false,
        }
    }

    /// Number of items launched in this cycle
    pub fn launched(&self) -> usize {
        self.discovered - self.already_seen
    }

    /// Folds one item outcome into the counters
    pub fn record(&mut self, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::Completed(report) => {
                self.processed += 1;
                match report.article {
                    ArticleOutcome::Saved => self.articles_saved += 1,
                    ArticleOutcome::Placeholder => self.placeholders += 1,
                    ArticleOutcome::NotSaved => self.articles_failed += 1,
                    ArticleOutcome::NotLinked => {}
                }
                self.comments_saved += report.comments_saved;
                self.comments_failed += report.comments_failed;
            }
            ItemOutcome::Aborted { .. } => self.aborted += 1,
        }
    }

    /// Logs the summary at info level
    pub fn log_summary(&self) {
        tracing::info!(
            started_at = %self.started_at.format("%Y.%m.%d %H:%M:%S"),
            elapsed = ?self.elapsed,
            discovered = self.discovered,
            already_seen = self.already_seen,
            processed = self.processed,
            aborted = self.aborted,
            articles = self.articles_saved,
            articles_failed = self.articles_failed,
            placeholders = self.placeholders,
            comments = self.comments_saved,
            comments_failed = self.comments_failed,
            "Crawl cycle finished"
        );

        if self.timed_out {
            tracing::warn!(
                unfinished = self.launched().saturating_sub(self.processed + self.aborted),
                "Cycle deadline reached before all items finished"
            );
        }
    }
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}
