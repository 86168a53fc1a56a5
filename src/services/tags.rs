//! Hashtag Extractor
//!
//! Extracts #hashtags from post text for interest tracking and content
//! scoring.

use regex::Regex;
use std::sync::LazyLock;

/// Regex pattern for matching #hashtags
/// Matches #tag where tag is a run of word characters
static HASHTAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(\w+)").expect("Invalid hashtag regex"));

/// Extract #hashtags from content text.
///
/// Returns lowercase tags (without the # symbol) in order of appearance.
/// Duplicates are preserved: a tag used twice in the text appears twice in
/// the result, and interaction weighting counts each occurrence.
pub fn extract_hashtags(content: &str) -> Vec<String> {
    HASHTAG_REGEX
        .captures_iter(content)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_lowercase()))
        .collect()
}
