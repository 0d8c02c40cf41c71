/// Longest name, in bytes, used for a directory or file in the output tree
pub const MAX_NAME_LEN: usize = 200;

/// Derives a filesystem-safe name from free text
///
/// Every character other than a letter, a digit, a space or a period is
/// replaced with a hyphen, so the result never contains a path separator.
/// Surrounding whitespace is trimmed and the result is capped at
/// [`MAX_NAME_LEN`] bytes. A result made only of periods (`.`, `..`) is
/// returned as an empty string since it would name the current or parent
/// directory.
///
/// # Example
///
/// ```
/// use news_harvester::url::slugify;
///
/// assert_eq!(slugify("Show HN: a/b?"), "Show HN- a-b-");
/// ```
pub fn slugify(text: &str) -> String {
    let replaced: String = text
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == ' ' || c == '.' {
                c
            } else {
                '-'
            }
        })
        .collect();

    let mut slug = truncate(replaced.trim(), MAX_NAME_LEN).trim_end().to_string();

    if slug.chars().all(|c| c == '.') {
        slug.clear();
    }

    slug
}

/// Picks the directory name for an item: its slug, or a name built from its
/// identifier when the slug is empty. Never returns an empty name.
pub fn directory_name(slug: &str, id: &str) -> String {
    if !slug.is_empty() {
        return slug.to_string();
    }
    match slugify(id) {
        name if name.is_empty() => slugify(&format!("item-{}", id)),
        name => name,
    }
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
