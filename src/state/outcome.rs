//! Outcomes reported by the item processor

use crate::state::ItemStage;
use std::path::PathBuf;

/// What happened to an item's article link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleOutcome {
    /// The article was fetched and written
    Saved,
    /// The fetch failed and a placeholder was written in its place
    Placeholder,
    /// Nothing was written: the body was empty or the filesystem refused it
    NotSaved,
    /// The story link is not an absolute http(s) URL; the text lives on the detail page
    NotLinked,
}

/// Summary of a fully processed item
#[derive(Debug, Clone)]
pub struct ItemReport {
    /// Item identifier on the aggregator
    pub id: String,

    /// Slug derived from the story title (may be empty)
    pub slug: String,

    /// Directory the item's artifacts were written to
    pub directory: PathBuf,

    pub article: ArticleOutcome,

    /// Comment links fetched and written
    pub comments_saved: usize,

    /// Comment links that failed to fetch or to be written
    pub comments_failed: usize,
}

/// Final result of processing one item
#[derive(Debug, Clone)]
pub enum ItemOutcome {
    Completed(ItemReport),

    /// Processing stopped early at `stage`
    Aborted { stage: ItemStage, reason: String },
}

impl ItemOutcome {
    pub fn report(&self) -> Option<&ItemReport> {
        match self {
            Self::Completed(report) => Some(report),
            Self::Aborted { .. } => None,
        }
    }
}
