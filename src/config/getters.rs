//! Getter methods for `FieldConfig`

use std::collections::BTreeSet;

use super::types::FieldConfig;
use crate::sanitize::{PolicyDescriptor, StyleAllowlistPolicy};

impl FieldConfig {
    #[must_use]
    pub fn purify_html(&self) -> bool {
        self.purify_html
    }

    #[must_use]
    pub fn strip_legacy_tags(&self) -> bool {
        self.strip_legacy_tags
    }

    #[must_use]
    pub fn remove_inline_styles(&self) -> bool {
        self.remove_inline_styles
    }

    #[must_use]
    pub fn remove_empty_tags(&self) -> bool {
        self.remove_empty_tags
    }

    #[must_use]
    pub fn remove_nbsp(&self) -> bool {
        self.remove_nbsp
    }

    #[must_use]
    pub fn supports_mb4(&self) -> bool {
        self.supports_mb4
    }

    #[must_use]
    pub fn capabilities(&self) -> &BTreeSet<String> {
        &self.capabilities
    }

    /// Inline CSS properties the enabled capabilities unlock
    #[must_use]
    pub fn allowed_styles(&self) -> BTreeSet<&'static str> {
        StyleAllowlistPolicy::resolve(&self.capabilities)
    }

    #[must_use]
    pub fn policy(&self) -> &PolicyDescriptor {
        &self.policy
    }

    #[must_use]
    pub fn max_html_size(&self) -> usize {
        self.max_html_size
    }
}
