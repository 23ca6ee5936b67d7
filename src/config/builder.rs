//! Fluent builder for `FieldConfig`
//!
//! Every field has a default, so the builder has no required steps. All
//! validation (manual policy JSON, iframe pattern, sanitizer policy
//! conflicts) happens in `build()`, at configuration time.

use std::collections::BTreeSet;
use std::sync::Arc;

use super::manual::ManualPolicyConfig;
use super::types::{FieldConfig, PolicyExtension};
use crate::error::{ContentError, ContentResult};
use crate::sanitize::{CapabilityProvider, PolicyDescriptor};
use crate::utils::DEFAULT_MAX_HTML_SIZE;

/// Manual policy, parsed or still raw
#[derive(Debug, Clone)]
enum ManualPolicySource {
    Parsed(ManualPolicyConfig),
    Json(String),
}

pub struct FieldConfigBuilder {
    pub(crate) purify_html: bool,
    pub(crate) strip_legacy_tags: bool,
    pub(crate) remove_inline_styles: bool,
    pub(crate) remove_empty_tags: bool,
    pub(crate) remove_nbsp: bool,
    pub(crate) supports_mb4: bool,
    pub(crate) capabilities: BTreeSet<String>,
    pub(crate) max_html_size: usize,
    manual_policy: Option<ManualPolicySource>,
    extensions: Vec<PolicyExtension>,
}

impl Default for FieldConfigBuilder {
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
            manual_policy: None,
            extensions: Vec::new(),
        }
    }
}

impl FieldConfig {
    /// Create a builder for configuring a `FieldConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> FieldConfigBuilder {
        FieldConfigBuilder::default()
    }
}

impl FieldConfigBuilder {
    #[must_use]
    pub fn purify_html(mut self, enabled: bool) -> Self {
        self.purify_html = enabled;
        self
    }

    #[must_use]
    pub fn strip_legacy_tags(mut self, enabled: bool) -> Self {
        self.strip_legacy_tags = enabled;
        self
    }

    #[must_use]
    pub fn remove_inline_styles(mut self, enabled: bool) -> Self {
        self.remove_inline_styles = enabled;
        self
    }

    #[must_use]
    pub fn remove_empty_tags(mut self, enabled: bool) -> Self {
        self.remove_empty_tags = enabled;
        self
    }

    #[must_use]
    pub fn remove_nbsp(mut self, enabled: bool) -> Self {
        self.remove_nbsp = enabled;
        self
    }

    /// Whether storage holds 4-byte UTF-8 natively. When it does not,
    /// characters outside the BMP are stored as numeric entities.
    #[must_use]
    pub fn supports_mb4(mut self, supported: bool) -> Self {
        self.supports_mb4 = supported;
        self
    }

    /// Enable one editor capability (e.g. `alignment`, `fontcolor`)
    #[must_use]
    pub fn capability(mut self, name: impl Into<String>) -> Self {
        self.capabilities.insert(name.into());
        self
    }

    #[must_use]
    pub fn capabilities<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.capabilities.extend(names.into_iter().map(Into::into));
        self
    }

    /// Add every capability a provider reports as enabled
    #[must_use]
    pub fn capabilities_from<P: CapabilityProvider + ?Sized>(mut self, provider: &P) -> Self {
        self.capabilities.extend(provider.enabled_capabilities());
        self
    }

    /// Set the input ceiling for `to_stored`
    ///
    /// # Example
    /// ```rust
    /// # use richtext_refs::config::FieldConfig;
    /// let config = FieldConfig::builder()
    ///     .max_html_size(64 * 1024)
    ///     .build()?;
    /// assert_eq!(config.max_html_size(), 64 * 1024);
    /// # Ok::<(), richtext_refs::ContentError>(())
    /// ```
    #[must_use]
    pub fn max_html_size(mut self, bytes: usize) -> Self {
        self.max_html_size = bytes;
        self
    }

    #[must_use]
    pub fn manual_policy(mut self, manual: ManualPolicyConfig) -> Self {
        self.manual_policy = Some(ManualPolicySource::Parsed(manual));
        self
    }

    /// Raw JSON manual policy, parsed in `build()`
    #[must_use]
    pub fn manual_policy_json(mut self, json: impl Into<String>) -> Self {
        self.manual_policy = Some(ManualPolicySource::Json(json.into()));
        self
    }

    /// Register a hook that adjusts the sanitizer policy
    ///
    /// # Example
    /// ```rust
    /// # use richtext_refs::config::FieldConfig;
    /// let config = FieldConfig::builder()
    ///     .policy_extension(|policy| {
    ///         policy.allow_tag("section");
    ///     })
    ///     .build()?;
    /// assert!(config.policy().tags.contains("section"));
    /// # Ok::<(), richtext_refs::ContentError>(())
    /// ```
    #[must_use]
    pub fn policy_extension<F>(mut self, extension: F) -> Self
    where
        F: Fn(&mut PolicyDescriptor) + Send + Sync + 'static,
    {
        self.extensions.push(Arc::new(extension));
        self
    }

    /// Validate and freeze the configuration
    ///
    /// # Errors
    ///
    /// Returns `MalformedManualConfig` for an unparseable manual policy or
    /// iframe pattern, and `SanitizerPolicy` when the final policy has
    /// conflicting rules.
    pub fn build(self) -> ContentResult<FieldConfig> {
        if self.max_html_size == 0 {
            return Err(ContentError::MalformedManualConfig(
                "max_html_size must be greater than zero".to_string(),
            ));
        }

        let mut policy = PolicyDescriptor::base();
        match self.manual_policy {
            Some(ManualPolicySource::Parsed(manual)) => manual.apply_to(&mut policy)?,
            Some(ManualPolicySource::Json(json)) => {
                ManualPolicyConfig::from_json(&json)?.apply_to(&mut policy)?;
            }
            None => {}
        }
        for extension in &self.extensions {
            extension(&mut policy);
        }
        policy.validate()?;

        tracing::debug!(
            capabilities = self.capabilities.len(),
            extensions = self.extensions.len(),
            "built field config"
        );

        Ok(FieldConfig {
            purify_html: self.purify_html,
            strip_legacy_tags: self.strip_legacy_tags,
            remove_inline_styles: self.remove_inline_styles,
            remove_empty_tags: self.remove_empty_tags,
            remove_nbsp: self.remove_nbsp,
            supports_mb4: self.supports_mb4,
            capabilities: self.capabilities,
            policy,
            max_html_size: self.max_html_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FieldConfig::builder().build().unwrap();
        assert!(config.purify_html());
        assert!(config.strip_legacy_tags());
        assert!(config.remove_inline_styles());
        assert!(config.remove_empty_tags());
        assert!(!config.remove_nbsp());
        assert!(config.supports_mb4());
        assert!(config.allowed_styles().is_empty());
        assert_eq!(config.max_html_size(), DEFAULT_MAX_HTML_SIZE);
    }

    #[test]
    fn test_extensions_run_in_order() {
        let config = FieldConfig::builder()
            .policy_extension(|p| {
                p.allow_tag("section");
            })
            .policy_extension(|p| {
                p.tags.remove("section");
                p.allow_tag("article");
            })
            .build()
            .unwrap();
        assert!(!config.policy().tags.contains("section"));
        assert!(config.policy().tags.contains("article"));
    }

    #[test]
    fn test_manual_json_validated_at_build() {
        let err = FieldConfig::builder()
            .manual_policy_json("{oops")
            .build()
            .unwrap_err();
        assert!(matches!(err, ContentError::MalformedManualConfig(_)));
    }

    #[test]
    fn test_conflicting_extension_rejected_at_build() {
        let err = FieldConfig::builder()
            .policy_extension(|p| {
                p.allow_tag("style");
            })
            .build()
            .unwrap_err();
        assert!(matches!(err, ContentError::SanitizerPolicy(_)));
    }

    #[test]
    fn test_capabilities_from_provider() {
        let provider: &[&str] = &["alignment", "fontsize"];
        let config = FieldConfig::builder().capabilities_from(provider).build().unwrap();
        assert!(config.allowed_styles().contains("text-align"));
        assert!(config.allowed_styles().contains("font-size"));
    }
}
