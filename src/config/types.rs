//! Core configuration types for a rich-text field
//!
//! This module contains the `FieldConfig` struct, which fixes how content of
//! one field is cleaned on save, and the extension hook type used to adjust
//! the sanitizer policy.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::sanitize::PolicyDescriptor;

/// Hook that adjusts the sanitizer policy while a config is built
///
/// Hooks run once, in registration order, inside `FieldConfigBuilder::build`.
pub type PolicyExtension = Arc<dyn Fn(&mut PolicyDescriptor) + Send + Sync>;

/// Immutable, validated configuration of a rich-text field
#[derive(Clone)]
pub struct FieldConfig {
    /// Run reference pre-pass, vector-graphics isolation and the allow-list
    /// sanitizer on save
    pub(crate) purify_html: bool,
    /// Remove `<font>` tags on save
    pub(crate) strip_legacy_tags: bool,
    /// Filter inline style declarations down to the enabled capabilities
    pub(crate) remove_inline_styles: bool,
    pub(crate) remove_empty_tags: bool,
    pub(crate) remove_nbsp: bool,
    /// Whether the storage backend holds characters outside the BMP
    pub(crate) supports_mb4: bool,
    pub(crate) capabilities: BTreeSet<String>,
    /// Final sanitizer policy, extensions already applied
    pub(crate) policy: PolicyDescriptor,
    /// Largest editable input accepted by `to_stored`, in bytes
    pub(crate) max_html_size: usize,
}

impl fmt::Debug for FieldConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldConfig")
            .field("purify_html", &self.purify_html)
            .field("strip_legacy_tags", &self.strip_legacy_tags)
            .field("remove_inline_styles", &self.remove_inline_styles)
            .field("remove_empty_tags", &self.remove_empty_tags)
            .field("remove_nbsp", &self.remove_nbsp)
            .field("supports_mb4", &self.supports_mb4)
            .field("capabilities", &self.capabilities)
            .field("max_html_size", &self.max_html_size)
            .finish_non_exhaustive()
    }
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            purify_html: true,
            strip_legacy_tags: true,
            remove_inline_styles: true,
            remove_empty_tags: true,
            remove_nbsp: false,
            supports_mb4: true,
            capabilities: BTreeSet::new(),
            policy: PolicyDescriptor::base(),
            max_html_size: crate::utils::DEFAULT_MAX_HTML_SIZE,
        }
    }
}
