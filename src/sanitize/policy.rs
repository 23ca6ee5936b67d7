//! Allow-list policy and the HTML sanitizer seam
//!
//! A [`PolicyDescriptor`] is plain data: which tags, attributes, classes and
//! URL schemes survive, plus an optional iframe embed rule. The
//! [`HtmlSanitizer`] trait turns it into a cleaning pass; the default
//! implementation drives `ammonia`.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use regex::Regex;

use crate::error::{ContentError, ContentResult};
use crate::utils::{DEFAULT_SAFE_IFRAME_PATTERN, PAGEBREAK_CLASS};

/// Elements the editor may put inline styles on
pub const STYLED_ELEMENTS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "div", "blockquote", "pre", "strong", "em", "b",
    "i", "u", "a", "span", "img",
];

/// Tags whose content the sanitizer always drops; never allow-listable
const CONTENT_STRIPPED_TAGS: &[&str] = &["script", "style"];

const IFRAME_ATTRIBUTES: &[&str] = &[
    "src",
    "width",
    "height",
    "frameborder",
    "allow",
    "allowfullscreen",
    "title",
];

/// Which iframes may be embedded
#[derive(Debug, Clone)]
pub struct IframePolicy {
    schemes: BTreeSet<String>,
    src_pattern: Regex,
}

impl IframePolicy {
    /// # Errors
    ///
    /// Returns `MalformedManualConfig` when `src_pattern` does not compile.
    pub fn new<S: Into<String>>(
        schemes: impl IntoIterator<Item = S>,
        src_pattern: &str,
    ) -> ContentResult<Self> {
        let src_pattern = Regex::new(src_pattern).map_err(|e| {
            ContentError::MalformedManualConfig(format!("invalid iframe pattern: {e}"))
        })?;
        Ok(Self {
            schemes: schemes
                .into_iter()
                .map(|s| s.into().to_ascii_lowercase())
                .collect(),
            src_pattern,
        })
    }

    #[must_use]
    pub fn schemes(&self) -> &BTreeSet<String> {
        &self.schemes
    }

    #[must_use]
    pub fn src_pattern(&self) -> &str {
        self.src_pattern.as_str()
    }

    /// Protocol-relative, or an allowed scheme, and matching the pattern
    #[must_use]
    pub fn permits(&self, src: &str) -> bool {
        let src = src.trim();
        let scheme_ok = if src.starts_with("//") {
            true
        } else {
            match src.split_once(':') {
                Some((scheme, _)) => self.schemes.contains(&scheme.to_ascii_lowercase()),
                None => false,
            }
        };
        scheme_ok && self.src_pattern.is_match(src)
    }
}

impl Default for IframePolicy {
    fn default() -> Self {
        Self {
            schemes: ["http", "https"].into_iter().map(String::from).collect(),
            src_pattern: Regex::new(DEFAULT_SAFE_IFRAME_PATTERN)
                .expect("DEFAULT_SAFE_IFRAME_PATTERN: hardcoded regex is valid"),
        }
    }
}

/// Allow-list configuration handed to the HTML sanitizer
///
/// Tags and attributes listed here are added on top of the sanitizer's own
/// safe defaults; `remove_tags` takes tags away again.
#[derive(Debug, Clone, Default)]
pub struct PolicyDescriptor {
    pub tags: BTreeSet<String>,
    pub tag_attributes: BTreeMap<String, BTreeSet<String>>,
    pub generic_attributes: BTreeSet<String>,
    pub allowed_classes: BTreeMap<String, BTreeSet<String>>,
    /// Replaces the default URL scheme list when set
    pub url_schemes: Option<BTreeSet<String>>,
    pub remove_tags: BTreeSet<String>,
    pub iframe: Option<IframePolicy>,
}

impl PolicyDescriptor {
    /// Field default: inline styles on editor elements, the pagebreak
    /// divider class, and safe video embeds
    #[must_use]
    pub fn base() -> Self {
        let mut policy = Self::default();
        for tag in STYLED_ELEMENTS {
            policy.allow_attributes(tag, ["style"]);
        }
        policy.allow_attributes("a", ["target", "title"]);
        policy.allow_classes("div", [PAGEBREAK_CLASS]);
        policy.iframe = Some(IframePolicy::default());
        policy
    }

    pub fn allow_tag(&mut self, tag: &str) -> &mut Self {
        self.tags.insert(tag.to_ascii_lowercase());
        self
    }

    pub fn allow_attributes<S: AsRef<str>>(
        &mut self,
        tag: &str,
        attributes: impl IntoIterator<Item = S>,
    ) -> &mut Self {
        self.tag_attributes
            .entry(tag.to_ascii_lowercase())
            .or_default()
            .extend(attributes.into_iter().map(|a| a.as_ref().to_ascii_lowercase()));
        self
    }

    pub fn allow_classes<S: AsRef<str>>(
        &mut self,
        tag: &str,
        classes: impl IntoIterator<Item = S>,
    ) -> &mut Self {
        self.allowed_classes
            .entry(tag.to_ascii_lowercase())
            .or_default()
            .extend(classes.into_iter().map(|c| c.as_ref().to_string()));
        self
    }

    /// Reject combinations the sanitizer cannot honor
    ///
    /// # Errors
    ///
    /// Returns `SanitizerPolicy` describing the first conflict found.
    pub fn validate(&self) -> ContentResult<()> {
        for tag in CONTENT_STRIPPED_TAGS {
            if self.tags.contains(*tag) || self.tag_attributes.contains_key(*tag) {
                return Err(ContentError::SanitizerPolicy(format!(
                    "`{tag}` content is always removed and cannot be allow-listed"
                )));
            }
        }
        if !self.allowed_classes.is_empty() && self.generic_attributes.contains("class") {
            return Err(ContentError::SanitizerPolicy(
                "`class` cannot be a generic attribute while allowed classes are set".to_string(),
            ));
        }
        for tag in self.allowed_classes.keys() {
            if self
                .tag_attributes
                .get(tag)
                .is_some_and(|attrs| attrs.contains("class"))
            {
                return Err(ContentError::SanitizerPolicy(format!(
                    "`class` on `{tag}` is both an attribute and restricted by allowed classes"
                )));
            }
        }
        Ok(())
    }
}

/// Allow-list HTML sanitizer
pub trait HtmlSanitizer {
    /// # Errors
    ///
    /// Returns `SanitizerPolicy` when the policy cannot be applied. No
    /// partially sanitized output is ever returned.
    fn sanitize(&self, html: &str, policy: &PolicyDescriptor) -> ContentResult<String>;
}

/// [`HtmlSanitizer`] backed by `ammonia`
#[derive(Debug, Clone, Copy, Default)]
pub struct AmmoniaSanitizer;

impl HtmlSanitizer for AmmoniaSanitizer {
    fn sanitize(&self, html: &str, policy: &PolicyDescriptor) -> ContentResult<String> {
        policy.validate()?;

        let mut builder = ammonia::Builder::default();
        builder
            .link_rel(None)
            .strip_comments(true)
            .add_tags(policy.tags.iter())
            .rm_tags(policy.remove_tags.iter())
            .add_generic_attributes(policy.generic_attributes.iter());
        for (tag, attributes) in &policy.tag_attributes {
            builder.add_tag_attributes(tag, attributes.iter());
        }
        for (tag, classes) in &policy.allowed_classes {
            builder.add_allowed_classes(tag, classes.iter());
        }
        if let Some(schemes) = &policy.url_schemes {
            builder.url_schemes(schemes.iter().map(String::as_str).collect::<HashSet<_>>());
        }
        if let Some(iframe) = &policy.iframe {
            if !policy.remove_tags.contains("iframe") {
                builder
                    .add_tags(["iframe"])
                    .add_tag_attributes("iframe", IFRAME_ATTRIBUTES.iter().copied());
                let iframe = iframe.clone();
                builder.attribute_filter(move |element, attribute, value| {
                    if element == "iframe" && attribute == "src" && !iframe.permits(value) {
                        return None;
                    }
                    Some(Cow::Borrowed(value))
                });
            }
        }

        Ok(builder.clean(html).to_string())
    }
}
