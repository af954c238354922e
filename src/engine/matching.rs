//! Exact-match substitution of a single text node's content.

use crate::types::{is_text_whitespace, trim_text, TranslationMap};

/// Containers whose text is never localized
const SKIPPED_CONTAINERS: [&str; 2] = ["script", "style"];

pub fn is_skipped_container(tag: Option<&str>) -> bool {
    tag.map(|t| SKIPPED_CONTAINERS.iter().any(|s| t.eq_ignore_ascii_case(s)))
        .unwrap_or(false)
}

/// Translate `content` if its whole trimmed text is a dictionary key.
///
/// Leading and trailing whitespace is kept verbatim around the translated value.
pub fn localize(content: &str, dictionary: &TranslationMap) -> Option<String> {
    let trimmed = trim_text(content);
    if trimmed.is_empty() {
        return None;
    }
    let target = dictionary.get(trimmed)?;
    let leading = &content[..content.len() - content.trim_start_matches(is_text_whitespace).len()];
    let trailing = &content[content.trim_end_matches(is_text_whitespace).len()..];
    Some(format!("{}{}{}", leading, target, trailing))
}
