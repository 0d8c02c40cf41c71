use crate::config::CommentNaming;
use crate::url::slug::slugify;
use url::Url;

/// Chooses the file name for a fetched comment link
///
/// With [`CommentNaming::Numbered`] the name is `comment<index>`, where
/// `index` is the link's position in the thread (launch order). With
/// [`CommentNaming::Derived`] the last path segment of the resolved URL is
/// used; when that segment is empty (a bare domain root, a trailing slash)
/// the whole URL is slugified instead.
pub fn comment_file_name(naming: CommentNaming, index: usize, resolved: &Url) -> String {
    match naming {
        CommentNaming::Numbered => format!("comment{}", index),
        CommentNaming::Derived => {
            derived_name(resolved).unwrap_or_else(|| format!("comment{}", index))
        }
    }
}

fn derived_name(resolved: &Url) -> Option<String> {
    let segment = resolved
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .map(slugify)
        .filter(|s| !s.is_empty());

    segment.or_else(|| Some(slugify(resolved.as_str())).filter(|s| !s.is_empty()))
}
