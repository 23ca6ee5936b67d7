//! Small HTML text helpers shared by the content value and the normalizer
//!
//! These operate on the constrained, mostly well-formed markup the editor
//! produces. They are pattern based, not a DOM.

use html_escape::decode_html_entities;
use regex::Regex;
use std::sync::LazyLock;

/// Any tag, comment or doctype
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("TAG_RE: hardcoded regex is valid"));

/// Elements that carry content on their own even with no text inside
static MEDIA_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(?:img|iframe|svg|video|audio|embed|object|hr)\b")
        .expect("MEDIA_TAG_RE: hardcoded regex is valid")
});

static WHITESPACE_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("WHITESPACE_RUN_RE: hardcoded regex is valid"));

/// Decide whether markup is empty for content purposes.
///
/// Markup is empty when it holds no media element and its text, with tags
/// removed and entities decoded, is only whitespace (non-breaking spaces
/// included). A lone `<p><br></p>` is therefore empty.
///
/// # Example
/// ```
/// # use richtext_refs::utils::is_html_empty;
/// assert!(is_html_empty("<p><br></p>"));
/// assert!(is_html_empty("<p>&nbsp;</p>"));
/// assert!(!is_html_empty("<p><img src=\"/a.png\"></p>"));
/// assert!(!is_html_empty("<p>x</p>"));
/// ```
#[must_use]
pub fn is_html_empty(html: &str) -> bool {
    if html.trim().is_empty() {
        return true;
    }
    if MEDIA_TAG_RE.is_match(html) {
        return false;
    }
    let text = strip_tags(html);
    decode_html_entities(&text).chars().all(char::is_whitespace)
}

/// Remove every tag and comment, leaving text (entities untouched)
#[must_use]
pub fn strip_tags(html: &str) -> String {
    TAG_RE.replace_all(html, " ").into_owned()
}

/// Collapse every whitespace run to a single space and trim the ends
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN_RE.replace_all(text, " ").trim().to_string()
}
