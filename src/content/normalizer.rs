//! Public entry points: editable HTML to stored text and back
//!
//! `to_stored` runs on save, `to_editable` when the editor loads a value and
//! `render` at output time. Each call is independent and the normalizer holds
//! no mutable state, so one instance can serve concurrent requests.

use std::sync::Arc;

use super::field_data::FieldData;
use super::pagebreak::{collapse_elements, expand_markers};
use super::storage::encode_supplementary_chars;
use crate::config::FieldConfig;
use crate::error::{ContentError, ContentResult};
use crate::reference::{ElementContext, ReferenceCodec, ReferenceResolver};
use crate::sanitize::{AmmoniaSanitizer, HtmlSanitizer, SanitizationPipeline};
use crate::utils::{EDITOR_EMPTY_ARTIFACT, is_html_empty};

/// Converts field content between its editable and stored forms
#[derive(Clone)]
pub struct ContentNormalizer {
    config: FieldConfig,
    resolver: Arc<dyn ReferenceResolver + Send + Sync>,
    sanitizer: Arc<dyn HtmlSanitizer + Send + Sync>,
}

impl ContentNormalizer {
    /// Normalizer using the `ammonia` sanitizer
    #[must_use]
    pub fn new(config: FieldConfig, resolver: Arc<dyn ReferenceResolver + Send + Sync>) -> Self {
        Self {
            config,
            resolver,
            sanitizer: Arc::new(AmmoniaSanitizer),
        }
    }

    /// Swap in another allow-list sanitizer
    #[must_use]
    pub fn with_sanitizer(mut self, sanitizer: Arc<dyn HtmlSanitizer + Send + Sync>) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    #[must_use]
    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Clean editable HTML for storage
    ///
    /// Returns `None` when nothing is left to store.
    ///
    /// # Errors
    ///
    /// Returns `InputTooLarge` above the configured ceiling, and propagates
    /// sanitizer and vector-graphics failures.
    pub fn to_stored(&self, editable: &str, ctx: &ElementContext) -> ContentResult<Option<String>> {
        let max = self.config.max_html_size();
        if editable.len() > max {
            return Err(ContentError::InputTooLarge {
                size: editable.len(),
                max,
            });
        }
        if editable.trim() == EDITOR_EMPTY_ARTIFACT {
            return Ok(None);
        }

        // Stored markers are comments, which the sanitizer drops
        let expanded = expand_markers(editable);
        let pipeline = SanitizationPipeline::new(&self.config, &*self.resolver, &*self.sanitizer);
        let cleaned = pipeline.run(&expanded, ctx)?;

        let mut stored = collapse_elements(&cleaned);
        if !self.config.supports_mb4() {
            stored = encode_supplementary_chars(&stored).into_owned();
        }

        tracing::debug!(
            input_bytes = editable.len(),
            stored_bytes = stored.len(),
            "normalized content for storage"
        );

        if is_html_empty(&stored) {
            Ok(None)
        } else {
            Ok(Some(stored))
        }
    }

    /// Prepare stored text for the editor: references resolved, pagebreak
    /// markers shown as dividers. The sanitizer does not run.
    #[must_use]
    pub fn to_editable(&self, stored: &str, ctx: &ElementContext) -> String {
        let decoded = ReferenceCodec::new(&*self.resolver).decode(stored, ctx);
        expand_markers(&decoded)
    }

    /// Output-time form: references resolved, everything else as stored
    #[must_use]
    pub fn render(&self, stored: &str, ctx: &ElementContext) -> String {
        ReferenceCodec::new(&*self.resolver).decode(stored, ctx)
    }

    /// Rendered content value for templates and search
    #[must_use]
    pub fn load(&self, stored: Option<&str>, ctx: &ElementContext) -> FieldData {
        let rendered = stored.map(|s| self.render(s, ctx)).unwrap_or_default();
        FieldData::new(rendered, ctx.locale())
    }
}
