//! Vector-graphics isolation
//!
//! Inline `<svg>` markup does not survive the generic allow-list sanitizer:
//! its elements are unknown to the HTML policy and its presentation
//! attributes (`viewBox`, `fill`, unprefixed `style`) get stripped. The guard
//! swaps every fragment for a random placeholder before the sanitizer runs,
//! cleans each fragment on its own with a stricter SVG allow-list, and swaps
//! the cleaned fragments back afterwards.

use std::collections::HashSet;
use std::sync::LazyLock;

use html_escape::encode_double_quoted_attribute;
use lol_html::{RewriteStrSettings, element, rewrite_str};
use rand::Rng;
use rand::distr::Alphanumeric;
use regex::Regex;

use crate::error::{ContentError, ContentResult};
use crate::utils::{GRAPHICS_PLACEHOLDER_LEN, GRAPHICS_PLACEHOLDER_PREFIX};

/// Minimal span from an opening `<svg` to the first closing tag
static SVG_FRAGMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<svg\b.*?</svg\s*>").expect("SVG_FRAGMENT_RE: hardcoded regex is valid")
});

/// Style values that can execute or fetch
static UNSAFE_STYLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:javascript:|expression\s*\(|url\s*\(\s*['\x22]?\s*(?:https?:|//|data:))")
        .expect("UNSAFE_STYLE_RE: hardcoded regex is valid")
});

/// SVG elements kept inside an isolated fragment (lowercase)
static SVG_ELEMENTS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "svg", "g", "defs", "symbol", "use", "title", "desc", "path", "rect", "circle",
        "ellipse", "line", "polyline", "polygon", "text", "tspan", "textpath",
        "lineargradient", "radialgradient", "stop", "clippath", "mask", "pattern", "marker",
    ]
    .into_iter()
    .collect()
});

/// SVG attributes kept inside an isolated fragment (lowercase)
static SVG_ATTRIBUTES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "xmlns", "xmlns:xlink", "version", "id", "class", "style", "role", "aria-hidden",
        "aria-label", "focusable", "viewbox", "preserveaspectratio", "width", "height", "x",
        "y", "x1", "y1", "x2", "y2", "cx", "cy", "r", "rx", "ry", "d", "points", "dx", "dy",
        "transform", "fill", "fill-opacity", "fill-rule", "clip-rule", "clip-path", "mask",
        "stroke", "stroke-width", "stroke-linecap", "stroke-linejoin", "stroke-dasharray",
        "stroke-dashoffset", "stroke-miterlimit", "stroke-opacity", "opacity", "color",
        "display", "visibility", "font-family", "font-size", "font-weight", "font-style",
        "text-anchor", "dominant-baseline", "letter-spacing", "offset", "stop-color",
        "stop-opacity", "gradientunits", "gradienttransform", "patternunits",
        "patterntransform", "clippathunits", "maskunits", "markerwidth", "markerheight",
        "refx", "refy", "orient", "href", "xlink:href", "vector-effect",
    ]
    .into_iter()
    .collect()
});

/// One isolated fragment and the placeholder standing in for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphicsFragment {
    placeholder: String,
    markup: String,
}

impl GraphicsFragment {
    #[must_use]
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// The sanitized fragment
    #[must_use]
    pub fn markup(&self) -> &str {
        &self.markup
    }
}

/// Extracts, sanitizes and restores inline vector graphics
pub struct VectorGraphicsGuard;

impl VectorGraphicsGuard {
    /// Replace every `<svg>` fragment with a fresh placeholder, in source order
    ///
    /// # Errors
    ///
    /// Returns `GraphicsSanitization` when a fragment cannot be rewritten.
    pub fn extract(html: &str) -> ContentResult<(String, Vec<GraphicsFragment>)> {
        let mut fragments: Vec<GraphicsFragment> = Vec::new();
        let mut output = String::with_capacity(html.len());
        let mut last = 0;

        for found in SVG_FRAGMENT_RE.find_iter(html) {
            let placeholder = unique_placeholder(html, &fragments);
            let markup = sanitize_fragment(found.as_str())?;

            output.push_str(&html[last..found.start()]);
            output.push_str(&placeholder);
            last = found.end();

            fragments.push(GraphicsFragment { placeholder, markup });
        }
        output.push_str(&html[last..]);

        if !fragments.is_empty() {
            tracing::debug!(count = fragments.len(), "isolated vector graphics");
        }
        Ok((output, fragments))
    }

    /// Swap each placeholder back for its fragment, in the order generated
    ///
    /// A placeholder the sanitizer removed together with its surrounding
    /// markup drops its fragment. A placeholder that occurs more than once is
    /// an error: pairing would be ambiguous. A placeholder that ended up in
    /// an attribute value (the `<svg>` was text inside a quoted attribute)
    /// gets its fragment back as escaped attribute text, never as markup.
    ///
    /// # Errors
    ///
    /// Returns `PlaceholderMismatch` for a duplicated placeholder, and
    /// `GraphicsSanitization` when the sanitized markup cannot be scanned.
    pub fn reinsert(html: &str, fragments: &[GraphicsFragment]) -> ContentResult<String> {
        if fragments.is_empty() {
            return Ok(html.to_string());
        }
        let in_attributes = placeholders_in_attributes(html, fragments)?;

        let mut output = html.to_string();
        for fragment in fragments {
            let occurrences = output.matches(fragment.placeholder.as_str()).count();
            match occurrences {
                1 if in_attributes.contains(fragment.placeholder.as_str()) => {
                    tracing::warn!(
                        placeholder = %fragment.placeholder,
                        "vector graphic inside an attribute value kept as text"
                    );
                    let escaped = encode_double_quoted_attribute(&fragment.markup);
                    output = output.replacen(&fragment.placeholder, &escaped, 1);
                }
                1 => output = output.replacen(&fragment.placeholder, &fragment.markup, 1),
                0 => tracing::warn!(
                    placeholder = %fragment.placeholder,
                    "vector graphic removed with its container"
                ),
                _ => {
                    return Err(ContentError::PlaceholderMismatch {
                        placeholder: fragment.placeholder.clone(),
                        occurrences,
                    });
                }
            }
        }
        Ok(output)
    }
}

/// A placeholder absent from `html` and distinct from every earlier one
fn unique_placeholder(html: &str, taken: &[GraphicsFragment]) -> String {
    loop {
        let suffix: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(GRAPHICS_PLACEHOLDER_LEN)
            .map(char::from)
            .collect();
        let candidate = format!("{GRAPHICS_PLACEHOLDER_PREFIX}{suffix}");
        if !html.contains(&candidate) && taken.iter().all(|f| f.placeholder != candidate) {
            return candidate;
        }
        tracing::warn!("vector graphics placeholder collision, regenerating");
    }
}

/// Placeholders that sit inside an attribute value of `html`
fn placeholders_in_attributes<'f>(
    html: &str,
    fragments: &'f [GraphicsFragment],
) -> ContentResult<HashSet<&'f str>> {
    let mut found: HashSet<&'f str> = HashSet::new();
    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("*", |el| {
                for attr in el.attributes() {
                    let value = attr.value();
                    found.extend(
                        fragments
                            .iter()
                            .map(|f| f.placeholder.as_str())
                            .filter(|placeholder| value.contains(placeholder)),
                    );
                }
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    )
    .map_err(|e| ContentError::GraphicsSanitization(e.to_string()))?;
    Ok(found)
}

/// Clean one fragment against the SVG allow-list
fn sanitize_fragment(fragment: &str) -> ContentResult<String> {
    rewrite_str(
        fragment,
        RewriteStrSettings {
            element_content_handlers: vec![element!("*", |el| {
                let tag = el.tag_name();
                if !SVG_ELEMENTS.contains(tag.as_str()) {
                    el.remove();
                    return Ok(());
                }

                let rejected: Vec<String> = el
                    .attributes()
                    .iter()
                    .filter(|attr| !is_allowed_attribute(&attr.name(), &attr.value()))
                    .map(|attr| attr.name())
                    .collect();
                for name in rejected {
                    el.remove_attribute(&name);
                }
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    )
    .map_err(|e| ContentError::GraphicsSanitization(e.to_string()))
}

fn is_allowed_attribute(name: &str, value: &str) -> bool {
    if name.starts_with("on") || !SVG_ATTRIBUTES.contains(name) {
        return false;
    }
    match name {
        "href" | "xlink:href" => value.trim_start().starts_with('#'),
        "style" => !UNSAFE_STYLE_RE.is_match(value),
        _ => true,
    }
}
