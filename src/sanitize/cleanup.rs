//! Post-sanitize cleanup stages
//!
//! Each stage is a narrow string-to-string pass over the sanitizer's output,
//! which is always double-quoted, lowercase-tag markup.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use html_escape::{decode_html_entities, encode_double_quoted_attribute};
use regex::{Captures, Regex};

use crate::error::ContentResult;
use crate::utils::MAX_EMPTY_TAG_PASSES;

// Compile regex patterns once at first use
// These are hardcoded patterns that will never fail to compile

static FONT_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</?font\b[^>]*>").expect("FONT_TAG_RE: hardcoded regex is valid")
});

/// A style attribute on an element the editor may style
/// Captures: (1) tag up to the attribute, (2) style declarations
static STYLED_ELEMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(<(?:h1|h2|h3|h4|h5|h6|p|div|blockquote|pre|strong|em|b|i|u|a|span|img)\b[^>]*?)\s+style="([^"]*)""#,
    )
    .expect("STYLED_ELEMENT_RE: hardcoded regex is valid")
});

/// An element with nothing between its bare opening tag and its closing tag
static EMPTY_TAG_RE: LazyLock<fancy_regex::Regex> = LazyLock::new(|| {
    fancy_regex::Regex::new(
        r"<(h1|h2|h3|h4|h5|h6|p|div|blockquote|pre|strong|em|a|b|i|u|span)\s*></\1>",
    )
    .expect("EMPTY_TAG_RE: hardcoded regex is valid")
});

static NBSP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("(?:&nbsp;|&#160;|&#xa0;|&#xA0;|\u{00A0})")
        .expect("NBSP_RE: hardcoded regex is valid")
});

static SPACE_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" {2,}").expect("SPACE_RUN_RE: hardcoded regex is valid"));

/// Remove `<font>` opening and closing tags, keeping their content
#[must_use]
pub fn strip_legacy_tags(html: &str) -> String {
    FONT_TAG_RE.replace_all(html, "").into_owned()
}

/// Keep only allow-listed declarations in inline `style` attributes
///
/// Declarations are re-serialized as `name: value` joined by `; `. An
/// attribute with no surviving declaration is dropped.
#[must_use]
pub fn filter_inline_styles(html: &str, allowed: &BTreeSet<&str>) -> String {
    STYLED_ELEMENT_RE
        .replace_all(html, |caps: &Captures| {
            let kept = filter_declarations(&caps[2], allowed);
            if kept.is_empty() {
                caps[1].to_string()
            } else {
                format!(r#"{} style="{}""#, &caps[1], encode_double_quoted_attribute(&kept))
            }
        })
        .into_owned()
}

fn filter_declarations(raw: &str, allowed: &BTreeSet<&str>) -> String {
    decode_html_entities(raw)
        .split(';')
        .filter_map(|declaration| {
            let (name, value) = declaration.split_once(':')?;
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim();
            (allowed.contains(name.as_str()) && !value.is_empty())
                .then(|| format!("{name}: {value}"))
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Remove empty allow-listed elements until none are left
///
/// Removing `<b></b>` from `<p><b></b></p>` exposes an empty `<p>`, so the
/// pass repeats until nothing changes.
///
/// # Errors
///
/// Returns `Pattern` if the backtracking matcher gives up.
pub fn remove_empty_tags(html: &str) -> ContentResult<String> {
    let mut current = html.to_string();
    for _ in 0..MAX_EMPTY_TAG_PASSES {
        let next = EMPTY_TAG_RE.try_replacen(&current, 0, "")?.into_owned();
        if next == current {
            return Ok(current);
        }
        current = next;
    }
    tracing::warn!(passes = MAX_EMPTY_TAG_PASSES, "empty tag removal stopped before fixpoint");
    Ok(current)
}

/// Turn every non-breaking space into a plain space and collapse space runs
#[must_use]
pub fn normalize_nbsp(html: &str) -> String {
    let spaced = NBSP_RE.replace_all(html, " ");
    SPACE_RUN_RE.replace_all(&spaced, " ").into_owned()
}
