//! Item processor - downloads everything belonging to one story
//!
//! For a single item this module:
//! 1. Fetches and parses the detail page
//! 2. Fetches the article and every comment link concurrently
//! 3. Writes the detail page, the article (or a placeholder) and the comment
//!    pages under the item's directory
//!
//! Failures are contained: a failed detail fetch or parse aborts only this
//! item, a failed article fetch leaves a placeholder, and a failed comment
//! fetch is dropped without affecting its siblings.

use crate::config::CommentNaming;
use crate::crawler::fetcher::{FetchError, FetchedPage, Fetcher};
use crate::crawler::parser::{parse_detail_page, Item};
use crate::state::{ArticleOutcome, ItemOutcome, ItemReport, ItemStage};
use crate::storage::{FsStorage, PersistOutcome, PersistTarget};
use crate::url::{comment_file_name, directory_name, item_url};
use futures::future::join_all;
use futures::stream::{self, StreamExt};
use url::Url;

/// File name of the stored detail page
pub const DETAIL_FILE_NAME: &str = "news_details.html";

/// Body written in place of an article that could not be fetched
pub fn placeholder_body(url: &Url) -> Vec<u8> {
    format!("Sorry =(. Url {} not available.", url).into_bytes()
}

/// Processes discovered items one at a time
///
/// Holds no per-item state; the crawl cycle calls [`ItemProcessor::process`]
/// once per new item while holding a concurrency permit.
#[derive(Debug, Clone)]
pub struct ItemProcessor {
    fetcher: Fetcher,
    storage: FsStorage,
    site_url: Url,
    comment_naming: CommentNaming,
    comment_concurrency: Option<usize>,
}

impl ItemProcessor {
    pub fn new(fetcher: Fetcher, storage: FsStorage, site_url: Url) -> Self {
        Self {
            fetcher,
            storage,
            site_url,
            comment_naming: CommentNaming::default(),
            comment_concurrency: None,
        }
    }

    pub fn with_comment_naming(mut self, naming: CommentNaming) -> Self {
        self.comment_naming = naming;
        self
    }

    /// Caps concurrent comment fetches within one item; None means unbounded
    pub fn with_comment_concurrency(mut self, limit: Option<usize>) -> Self {
        self.comment_concurrency = limit.filter(|n| *n > 0);
        self
    }

    /// Runs one item through fetch, parse, fan-out and persistence
    ///
    /// Never returns an error: every failure is logged and reflected in the
    /// returned [`ItemOutcome`].
    pub async fn process(&self, item: &Item) -> ItemOutcome {
        let detail_url = item_url(&self.site_url, &item.id);
        let mut stage = ItemStage::FetchDetail;

        let detail = match self.fetcher.fetch(&detail_url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::error!(item = %item.id, url = %detail_url, error = %e, "Detail page not downloaded");
                return aborted(stage, e.to_string());
            }
        };

        stage = advance(stage, ItemStage::Parse);
        let parsed = match parse_detail_page(&detail.text(), &detail_url) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::error!(item = %item.id, error = %e, "Detail page unusable");
                return aborted(stage, e.to_string());
            }
        };

        let directory = directory_name(&parsed.slug, &item.id);
        tracing::info!(
            item = %item.id,
            directory = %directory,
            comments = parsed.comment_links.len(),
            "Found comment links"
        );

        stage = advance(stage, ItemStage::FetchLinked);
        let (article, comments) = tokio::join!(
            self.fetch_article(parsed.article_url.as_ref()),
            self.fetch_comments(&parsed.comment_links)
        );

        stage = advance(stage, ItemStage::Persist);
        self.save(PersistTarget::new(directory.as_str(), DETAIL_FILE_NAME, detail.body))
            .await;

        let article = self.save_article(&directory, article).await;

        let mut comments_saved = 0;
        let mut comments_failed = 0;
        for (index, result) in comments.into_iter().enumerate() {
            match result {
                Ok(page) => {
                    let name = comment_file_name(self.comment_naming, index, &page.final_url);
                    if self.save(PersistTarget::new(directory.as_str(), name, page.body)).await {
                        comments_saved += 1;
                    } else {
                        comments_failed += 1;
                    }
                }
                Err(e) => {
                    tracing::warn!(item = %item.id, error = %e, "Comment link not downloaded");
                    comments_failed += 1;
                }
            }
        }

        advance(stage, ItemStage::Done);
        tracing::info!(
            item = %item.id,
            directory = %directory,
            comments_saved,
            comments_failed,
            "Item fully downloaded"
        );

        ItemOutcome::Completed(ItemReport {
            id: item.id.clone(),
            slug: parsed.slug,
            directory: self.storage.item_dir(&directory),
            article,
            comments_saved,
            comments_failed,
        })
    }

    async fn fetch_article(&self, url: Option<&Url>) -> Option<(Url, Result<FetchedPage, FetchError>)> {
        let url = url?;
        Some((url.clone(), self.fetcher.fetch(url).await))
    }

    /// Fetches every comment link; results keep the links' order
    async fn fetch_comments(&self, links: &[Url]) -> Vec<Result<FetchedPage, FetchError>> {
        let fetches = links.iter().map(|url| self.fetcher.fetch(url));
        match self.comment_concurrency {
            Some(limit) => stream::iter(fetches).buffered(limit).collect().await,
            None => join_all(fetches).await,
        }
    }

    async fn save_article(
        &self,
        directory: &str,
        article: Option<(Url, Result<FetchedPage, FetchError>)>,
    ) -> ArticleOutcome {
        let (bytes, written) = match article {
            None => return ArticleOutcome::NotLinked,
            Some((_, Ok(page))) => (page.body, ArticleOutcome::Saved),
            Some((url, Err(e))) => {
                tracing::error!(url = %url, error = %e, "Article not available, writing placeholder");
                (placeholder_body(&url), ArticleOutcome::Placeholder)
            }
        };

        if self.save(PersistTarget::new(directory, directory, bytes)).await {
            written
        } else {
            ArticleOutcome::NotSaved
        }
    }

    /// Writes one artifact; returns true if bytes landed on disk
    async fn save(&self, target: PersistTarget) -> bool {
        match self.storage.persist_target(&target).await {
            Ok(PersistOutcome::Written(_)) => true,
            Ok(PersistOutcome::Skipped) => false,
            Err(e) => {
                tracing::error!(error = %e, "Failed to save artifact");
                false
            }
        }
    }
}

fn advance(from: ItemStage, to: ItemStage) -> ItemStage {
    debug_assert!(from.can_transition_to(to), "{} -> {}", from, to);
    tracing::trace!(from = %from, to = %to, "Item stage");
    to
}

fn aborted(stage: ItemStage, reason: String) -> ItemOutcome {
    advance(stage, ItemStage::Done);
    ItemOutcome::Aborted { stage, reason }
}
