//! Manual sanitizer policy supplied as JSON
//!
//! A field may carry a hand-written policy instead of the base one. The
//! payload is validated when the field config is built, never while content
//! is being transformed.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::ContentResult;
use crate::sanitize::{IframePolicy, PolicyDescriptor};
use crate::utils::DEFAULT_SAFE_IFRAME_PATTERN;

/// Serializable policy overrides
///
/// ```
/// # use richtext_refs::config::ManualPolicyConfig;
/// let manual = ManualPolicyConfig::from_json(r#"{"allowedTags": ["section"], "removeTags": ["table"]}"#)?;
/// assert!(manual.allowed_tags.contains("section"));
/// # Ok::<(), richtext_refs::ContentError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ManualPolicyConfig {
    #[serde(default)]
    pub allowed_tags: BTreeSet<String>,
    #[serde(default)]
    pub allowed_attributes: BTreeMap<String, BTreeSet<String>>,
    #[serde(default)]
    pub generic_attributes: BTreeSet<String>,
    #[serde(default)]
    pub allowed_classes: BTreeMap<String, BTreeSet<String>>,
    #[serde(default)]
    pub url_schemes: Option<BTreeSet<String>>,
    #[serde(default)]
    pub remove_tags: BTreeSet<String>,
    /// Regex an iframe `src` must match; no iframes when absent
    #[serde(default)]
    pub safe_iframe_pattern: Option<String>,
    #[serde(default)]
    pub iframe_schemes: Option<BTreeSet<String>>,
}

impl ManualPolicyConfig {
    /// # Errors
    ///
    /// Returns `MalformedManualConfig` when `json` is not a valid policy object.
    pub fn from_json(json: &str) -> ContentResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Merge these overrides onto `base`
    ///
    /// # Errors
    ///
    /// Returns `MalformedManualConfig` when the iframe pattern does not compile.
    pub fn apply_to(&self, base: &mut PolicyDescriptor) -> ContentResult<()> {
        for tag in &self.allowed_tags {
            base.allow_tag(tag);
        }
        for (tag, attributes) in &self.allowed_attributes {
            base.allow_attributes(tag, attributes);
        }
        base.generic_attributes
            .extend(self.generic_attributes.iter().map(|a| a.to_ascii_lowercase()));
        for (tag, classes) in &self.allowed_classes {
            base.allow_classes(tag, classes);
        }
        if let Some(schemes) = &self.url_schemes {
            base.url_schemes = Some(schemes.iter().map(|s| s.to_ascii_lowercase()).collect());
        }
        base.remove_tags
            .extend(self.remove_tags.iter().map(|t| t.to_ascii_lowercase()));

        if self.safe_iframe_pattern.is_some() || self.iframe_schemes.is_some() {
            let pattern = self
                .safe_iframe_pattern
                .as_deref()
                .unwrap_or(DEFAULT_SAFE_IFRAME_PATTERN);
            let schemes = self
                .iframe_schemes
                .clone()
                .unwrap_or_else(|| ["http", "https"].into_iter().map(String::from).collect());
            base.iframe = Some(IframePolicy::new(schemes, pattern)?);
        }
        Ok(())
    }
}
