//! File-friendly field settings
//!
//! `FieldSettings` is what a project stores for a field: the cleanup flags,
//! the enabled editor capabilities and an optional manual policy object.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::manual::ManualPolicyConfig;
use super::types::FieldConfig;
use crate::error::ContentResult;
use crate::sanitize::CapabilityProvider;
use crate::utils::DEFAULT_MAX_HTML_SIZE;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldSettings {
    pub purify_html: bool,
    pub strip_legacy_tags: bool,
    pub remove_inline_styles: bool,
    pub remove_empty_tags: bool,
    pub remove_nbsp: bool,
    pub supports_mb4: bool,
    pub capabilities: BTreeSet<String>,
    pub max_html_size: usize,
    pub purifier_config: Option<ManualPolicyConfig>,
}

impl Default for FieldSettings {
    fn default() -> Self {
        Self {
            purify_html: true,
            strip_legacy_tags: true,
            remove_inline_styles: true,
            remove_empty_tags: true,
            remove_nbsp: false,
            supports_mb4: true,
            capabilities: BTreeSet::new(),
            max_html_size: DEFAULT_MAX_HTML_SIZE,
            purifier_config: None,
        }
    }
}

impl CapabilityProvider for FieldSettings {
    fn enabled_capabilities(&self) -> BTreeSet<String> {
        self.capabilities.clone()
    }
}

impl FieldSettings {
    /// # Errors
    ///
    /// Returns `MalformedManualConfig` when `json` is not a settings object.
    pub fn from_json(json: &str) -> ContentResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// # Errors
    ///
    /// See [`super::FieldConfigBuilder::build`].
    pub fn into_config(self) -> ContentResult<FieldConfig> {
        let mut builder = FieldConfig::builder()
            .purify_html(self.purify_html)
            .strip_legacy_tags(self.strip_legacy_tags)
            .remove_inline_styles(self.remove_inline_styles)
            .remove_empty_tags(self.remove_empty_tags)
            .remove_nbsp(self.remove_nbsp)
            .supports_mb4(self.supports_mb4)
            .capabilities_from(&self)
            .max_html_size(self.max_html_size);
        if let Some(manual) = self.purifier_config {
            builder = builder.manual_policy(manual);
        }
        builder.build()
    }
}

impl FieldConfig {
    /// Build a config straight from a settings JSON document
    ///
    /// # Errors
    ///
    /// Returns `MalformedManualConfig` for invalid JSON, and whatever
    /// `build()` reports for an invalid policy.
    pub fn from_settings_json(json: &str) -> ContentResult<Self> {
        FieldSettings::from_json(json)?.into_config()
    }
}
