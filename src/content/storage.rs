//! Storage encoding for backends without 4-byte UTF-8

use std::borrow::Cow;
use std::fmt::Write as _;

/// Replace every character outside the Basic Multilingual Plane with a
/// hexadecimal numeric entity
///
/// ```
/// # use richtext_refs::content::storage::encode_supplementary_chars;
/// assert_eq!(encode_supplementary_chars("ok 😀"), "ok &#x1F600;");
/// assert_eq!(encode_supplementary_chars("café"), "café");
/// ```
#[must_use]
pub fn encode_supplementary_chars(html: &str) -> Cow<'_, str> {
    if !html.chars().any(is_supplementary) {
        return Cow::Borrowed(html);
    }
    let mut encoded = String::with_capacity(html.len() + 16);
    for c in html.chars() {
        if is_supplementary(c) {
            let _ = write!(encoded, "&#x{:X};", u32::from(c));
        } else {
            encoded.push(c);
        }
    }
    Cow::Owned(encoded)
}

fn is_supplementary(c: char) -> bool {
    u32::from(c) > 0xFFFF
}
