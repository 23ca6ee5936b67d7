//! The save-time sanitization pipeline
//!
//! Stages run in a fixed order. The reference pre-pass must precede the
//! allow-list sanitizer so it never sees raw token syntax, and the reference
//! post-pass must run last so cleanup works on resolved URLs.

use std::borrow::Cow;

use super::cleanup::{filter_inline_styles, normalize_nbsp, remove_empty_tags, strip_legacy_tags};
use super::policy::HtmlSanitizer;
use super::vector_graphics::VectorGraphicsGuard;
use crate::config::FieldConfig;
use crate::error::ContentResult;
use crate::reference::{ElementContext, ReferenceCodec, ReferenceResolver};

/// Runs the cleanup stages for one field configuration
pub struct SanitizationPipeline<'a> {
    config: &'a FieldConfig,
    codec: ReferenceCodec<'a>,
    sanitizer: &'a dyn HtmlSanitizer,
}

impl<'a> SanitizationPipeline<'a> {
    #[must_use]
    pub fn new(
        config: &'a FieldConfig,
        resolver: &'a dyn ReferenceResolver,
        sanitizer: &'a dyn HtmlSanitizer,
    ) -> Self {
        Self {
            config,
            codec: ReferenceCodec::new(resolver),
            sanitizer,
        }
    }

    /// Run every enabled stage over `html`
    ///
    /// # Errors
    ///
    /// Propagates sanitizer, vector-graphics and pattern failures. There is
    /// no partial fallback.
    pub fn run(&self, html: &str, ctx: &ElementContext) -> ContentResult<String> {
        let config = self.config;
        let mut result = Cow::Borrowed(html);

        if config.purify_html() {
            // 1. Reference pre-pass
            result = Cow::Owned(self.codec.decode(&result, ctx));
            trace_stage("reference pre-pass", &result);

            // 2. Vector-graphics isolation
            let (isolated, fragments) = VectorGraphicsGuard::extract(&result)?;

            // 3. Allow-list sanitize
            let sanitized = self.sanitizer.sanitize(&isolated, config.policy())?;
            trace_stage("allow-list sanitize", &sanitized);

            // 4. Vector-graphics restoration
            result = Cow::Owned(VectorGraphicsGuard::reinsert(&sanitized, &fragments)?);
        }

        // 5. Legacy tag strip
        if config.strip_legacy_tags() {
            result = Cow::Owned(strip_legacy_tags(&result));
        }

        // 6. Inline style filtering
        if config.remove_inline_styles() {
            result = Cow::Owned(filter_inline_styles(&result, &config.allowed_styles()));
            trace_stage("inline style filter", &result);
        }

        // 7. Empty tag removal
        if config.remove_empty_tags() {
            result = Cow::Owned(remove_empty_tags(&result)?);
        }

        // 8. Non-breaking-space normalization
        if config.remove_nbsp() {
            result = Cow::Owned(normalize_nbsp(&result));
        }

        // 9. Reference post-pass
        let encoded = self.codec.encode(&result, ctx);
        trace_stage("reference post-pass", &encoded);
        Ok(encoded)
    }
}

fn trace_stage(stage: &str, html: &str) {
    tracing::debug!(stage, bytes = html.len(), "pipeline stage complete");
}
