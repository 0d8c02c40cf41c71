//! HTML parser for the aggregator's pages
//!
//! This module extracts:
//! - The ranked list of items from the front page
//! - The story link (title and article URL) from an item's detail page
//! - The external links referenced inside the item's discussion thread

use crate::url::{parse_absolute_http, slugify};
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use url::Url;

/// Front page rows describing a story
const ITEM_ROW: &str = "tr.athing";

/// The story anchor, in current and older markup
const STORY_LINK: &str = "span.titleline > a, a.storylink";

/// Container of the discussion thread on a detail page
const COMMENT_TREE: &str = "table.comment-tree";

/// Errors raised while parsing a detail page
#[derive(Debug, Error)]
pub enum ParseError {
    /// The page has no story link (deleted item or unexpected markup)
    #[error("No story link found on {url}")]
    MissingStoryLink { url: String },
}

/// One story listed on the front page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Identifier assigned by the aggregator
    pub id: String,

    /// Raw title text as listed
    pub title: String,
}

/// What a detail page tells us about an item
#[derive(Debug, Clone)]
pub struct ParsedItem {
    /// Raw story title
    pub title: String,

    /// Slug derived from the title; empty if nothing usable remained
    pub slug: String,

    /// External article, or None when the story text lives on the detail page
    pub article_url: Option<Url>,

    /// Absolute http(s) links inside the discussion thread, in document order
    pub comment_links: Vec<Url>,
}

/// Extracts the items listed on the front page, in ranking order
///
/// Rows without an `id` attribute are skipped. The title comes from the
/// row's story anchor, falling back to the row's text.
///
/// # Example
///
/// ```
/// use news_harvester::crawler::parse_front_page;
///
/// let html = r#"<table><tr class="athing" id="1"><td><span class="titleline"><a href="https://a.com">A</a></span></td></tr></table>"#;
/// let items = parse_front_page(html);
/// assert_eq!(items[0].id, "1");
/// assert_eq!(items[0].title, "A");
/// ```
pub fn parse_front_page(html: &str) -> Vec<Item> {
    let document = Html::parse_document(html);
    let (Some(row_selector), Some(link_selector)) = (selector(ITEM_ROW), selector(STORY_LINK))
    else {
        return Vec::new();
    };

    document
        .select(&row_selector)
        .filter_map(|row| {
            let id = row.value().attr("id")?.trim();
            if id.is_empty() {
                return None;
            }

            let title = row
                .select(&link_selector)
                .next()
                .map(element_text)
                .unwrap_or_else(|| element_text(row));

            Some(Item {
                id: id.to_string(),
                title,
            })
        })
        .collect()
}

/// Extracts the story link and comment links from a detail page
///
/// # Arguments
///
/// * `html` - The detail page content
/// * `page_url` - URL the page was fetched from, used in errors
///
/// # Returns
///
/// * `Ok(ParsedItem)` - The page had a story link
/// * `Err(ParseError::MissingStoryLink)` - The page has no story link
pub fn parse_detail_page(html: &str, page_url: &Url) -> Result<ParsedItem, ParseError> {
    let document = Html::parse_document(html);

    let story = selector(STORY_LINK)
        .and_then(|s| document.select(&s).next())
        .ok_or_else(|| ParseError::MissingStoryLink {
            url: page_url.to_string(),
        })?;

    let title = element_text(story);
    let slug = slugify(&title);
    let article_url = story.value().attr("href").and_then(parse_absolute_http);

    let comment_links = extract_comment_links(&document);

    Ok(ParsedItem {
        title,
        slug,
        article_url,
        comment_links,
    })
}

/// Collects every absolute http(s) anchor inside the comment tree
///
/// Duplicate hrefs are kept; each anchor yields one entry.
fn extract_comment_links(document: &Html) -> Vec<Url> {
    let (Some(tree_selector), Some(anchor_selector)) = (selector(COMMENT_TREE), selector("a[href]"))
    else {
        return Vec::new();
    };

    let Some(tree) = document.select(&tree_selector).next() else {
        return Vec::new();
    };

    tree.select(&anchor_selector)
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter_map(|href| {
            let parsed = parse_absolute_http(href);
            if parsed.is_none() {
                tracing::trace!(href, "Skipping non-absolute comment link");
            }
            parsed
        })
        .collect()
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Element text with runs of whitespace collapsed
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
