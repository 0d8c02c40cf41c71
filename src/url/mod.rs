//! URL and naming helpers for news-harvester
//!
//! This module turns titles and URLs into names that are safe to use as
//! directory and file names inside the output tree, and builds the
//! aggregator URLs the crawler visits.

mod filename;
mod slug;

pub use filename::comment_file_name;
pub use slug::{directory_name, slugify, MAX_NAME_LEN};

use url::Url;

/// Returns true if `href` starts with an absolute `http://` or `https://` scheme
///
/// Relative links (`item?id=1`, `/from?site=x`) and other schemes are rejected.
/// The check is made on the raw attribute text, before any resolution against
/// a base URL.
pub fn is_absolute_http(href: &str) -> bool {
    let href = href.trim_start();
    starts_with_ignore_case(href, "http://") || starts_with_ignore_case(href, "https://")
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len()
        && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// Parses an absolute http(s) href, returning None for anything else
pub fn parse_absolute_http(href: &str) -> Option<Url> {
    if !is_absolute_http(href) {
        return None;
    }
    Url::parse(href.trim()).ok()
}

/// Builds the detail page URL for an item: `{site}/item?id={id}`
///
/// # Example
///
/// ```
/// use news_harvester::url::item_url;
/// use url::Url;
///
/// let site = Url::parse("https://news.ycombinator.com").unwrap();
/// assert_eq!(
///     item_url(&site, "42").as_str(),
///     "https://news.ycombinator.com/item?id=42"
/// );
/// ```
pub fn item_url(site: &Url, id: &str) -> Url {
    let mut url = site.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push("item");
    }
    url.query_pairs_mut().clear().append_pair("id", id);
    url
}
