//! Splitting lyrics into verses and paging through them.

pub const VERSE_SEPARATOR: &str = "\n\n";

/// Split lyrics into verses separated by a blank line.
///
/// Windows line endings are normalised first. Empty text yields a single empty
/// verse.
pub fn split_verses(text: &str) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n");
    normalized
        .split(VERSE_SEPARATOR)
        .map(str::to_string)
        .collect()
}

/// Return the verses on the given 1-based page, or `None` when the page starts
/// past the last verse.
///
/// `page` and `limit` must be at least 1.
pub fn paginate_verses(verses: &[String], page: usize, limit: usize) -> Option<&[String]> {
    let start = page.checked_sub(1)?.checked_mul(limit)?;
    if start >= verses.len() {
        return None;
    }
    let end = start.saturating_add(limit).min(verses.len());
    Some(&verses[start..end])
}
