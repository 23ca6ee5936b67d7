//! The content value handed to templates and search indexing

use std::fmt;

use html_escape::decode_html_entities;
use serde::{Deserialize, Serialize};

use crate::reference::LocaleId;
use crate::utils::{collapse_whitespace, is_html_empty, strip_tags};

/// Rendered field content plus the locale it belongs to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldData {
    raw: String,
    locale: Option<LocaleId>,
}

impl FieldData {
    #[must_use]
    pub fn new(raw: impl Into<String>, locale: Option<LocaleId>) -> Self {
        Self {
            raw: raw.into(),
            locale,
        }
    }

    #[must_use]
    pub fn raw_content(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn locale(&self) -> Option<LocaleId> {
        self.locale
    }

    /// Empty by HTML rules, not by length: `<p><br></p>` is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        is_html_empty(&self.raw)
    }

    /// Plain text for search indexing
    #[must_use]
    pub fn search_keywords(&self) -> String {
        let text = strip_tags(&self.raw);
        collapse_whitespace(&decode_html_entities(&text))
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.raw
    }
}

impl fmt::Display for FieldData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl AsRef<str> for FieldData {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}
