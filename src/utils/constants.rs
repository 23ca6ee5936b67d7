//! Shared constants for the rich-text field core
//!
//! Fixed markers and defaults used by more than one stage, kept in one place
//! so the editable and stored forms never drift apart.

/// Stored-form pagebreak marker
pub const PAGEBREAK_MARKER: &str = "<!--pagebreak-->";

/// Editable-form pagebreak element shown by the editor as a divider
pub const PAGEBREAK_ELEMENT: &str = r#"<div class="page-break"></div>"#;

/// Class name identifying the editable pagebreak element
pub const PAGEBREAK_CLASS: &str = "page-break";

/// Markup the editor submits for a field that was typed into and then cleared
pub const EDITOR_EMPTY_ARTIFACT: &str = "<p><br></p>";

/// Prefix of vector-graphics placeholder tokens
pub const GRAPHICS_PLACEHOLDER_PREFIX: &str = "vg:";

/// Random characters after the placeholder prefix
///
/// 24 alphanumerics give ~143 bits, so a collision between two placeholders,
/// or with author text, is not a practical concern.
pub const GRAPHICS_PLACEHOLDER_LEN: usize = 24;

/// Default ceiling for editable input: 10 MB
pub const DEFAULT_MAX_HTML_SIZE: usize = 10 * 1024 * 1024;

/// Upper bound on empty-tag removal passes
///
/// Each pass unwraps one nesting level; real editor output rarely nests
/// formatting more than a handful of levels deep.
pub const MAX_EMPTY_TAG_PASSES: usize = 16;

/// Default iframe `src` pattern: YouTube (incl. nocookie) embeds and Vimeo players
pub const DEFAULT_SAFE_IFRAME_PATTERN: &str =
    r"^(?:https?:)?//(?:www\.youtube(?:-nocookie)?\.com/embed/|player\.vimeo\.com/video/)";
