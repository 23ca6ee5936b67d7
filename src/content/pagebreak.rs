//! Pagebreak marker substitution
//!
//! Stored text carries `<!--pagebreak-->`; the editor shows a divider
//! element instead. The mapping is fixed and 1:1.

use std::sync::LazyLock;

use regex::Regex;

use crate::utils::{PAGEBREAK_ELEMENT, PAGEBREAK_MARKER};

static PAGEBREAK_ELEMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<div\s+class="page-break"[^>]*>\s*</div>"#)
        .expect("PAGEBREAK_ELEMENT_RE: hardcoded regex is valid")
});

/// Stored markers to editor divider elements
#[must_use]
pub fn expand_markers(stored: &str) -> String {
    stored.replace(PAGEBREAK_MARKER, PAGEBREAK_ELEMENT)
}

/// Editor divider elements back to stored markers
#[must_use]
pub fn collapse_elements(html: &str) -> String {
    PAGEBREAK_ELEMENT_RE
        .replace_all(html, PAGEBREAK_MARKER)
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let stored = "A<!--pagebreak-->B";
        let editable = expand_markers(stored);
        assert_eq!(editable, r#"A<div class="page-break"></div>B"#);
        assert_eq!(collapse_elements(&editable), stored);
    }

    #[test]
    fn test_collapse_tolerates_whitespace_and_case() {
        assert_eq!(
            collapse_elements("<DIV class=\"page-break\" data-x=\"1\">\n</DIV>"),
            PAGEBREAK_MARKER
        );
        assert_eq!(
            collapse_elements(r#"<div class="page-break-after">x</div>"#),
            r#"<div class="page-break-after">x</div>"#
        );
    }
}
