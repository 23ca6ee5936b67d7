//! Reference resolution seam
//!
//! The codec never knows how a token becomes a URL. It calls a
//! [`ReferenceResolver`], which either returns a URL or echoes its input to
//! say "unresolved". Unresolved is a normal outcome, not an error.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::token::{LocaleId, ReferenceToken};
use crate::error::{ContentError, ContentResult};

/// Resolves wrapped reference tokens to URLs
pub trait ReferenceResolver {
    /// Resolve `{type:id[@locale][:qualifier][||fallback]}`.
    ///
    /// Returns the resolved URL, or `token` unchanged when it cannot be
    /// resolved. Must not panic for a syntactically valid but unknown token.
    fn resolve(&self, token: &str, context_locale: Option<LocaleId>) -> String;
}

impl<R: ReferenceResolver + ?Sized> ReferenceResolver for &R {
    fn resolve(&self, token: &str, context_locale: Option<LocaleId>) -> String {
        (**self).resolve(token, context_locale)
    }
}

impl<R: ReferenceResolver + ?Sized> ReferenceResolver for std::sync::Arc<R> {
    fn resolve(&self, token: &str, context_locale: Option<LocaleId>) -> String {
        (**self).resolve(token, context_locale)
    }
}

/// The element the content belongs to, as far as the core cares
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementContext {
    locale: Option<LocaleId>,
}

impl ElementContext {
    #[must_use]
    pub fn new(locale: Option<LocaleId>) -> Self {
        Self { locale }
    }

    #[must_use]
    pub fn locale(&self) -> Option<LocaleId> {
        self.locale
    }
}

/// Map-backed resolver
///
/// Keys are normalized tokens (`kind:id[@locale]:qualifier`). Lookup tries
/// the token's locale (or the context locale), then the locale-less key,
/// then the wrapped fallback URL, and otherwise echoes the input.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    urls: HashMap<String, String>,
}

impl StaticResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a URL for a token. The token is normalized before storage,
    /// so `entry:5` and `entry:5:url` share an entry.
    pub fn insert(&mut self, token: &ReferenceToken, url: impl Into<String>) {
        self.urls.insert(token.normalized().to_string(), url.into());
    }

    /// Fluent form of [`StaticResolver::insert`] taking token text
    ///
    /// # Errors
    ///
    /// Returns `MalformedManualConfig` when `token` is not a reference token.
    pub fn with(mut self, token: &str, url: impl Into<String>) -> ContentResult<Self> {
        let parsed = token
            .parse::<ReferenceToken>()
            .map_err(|e| ContentError::MalformedManualConfig(e.to_string()))?;
        self.insert(&parsed, url);
        Ok(self)
    }

    /// Load from a JSON object of `"token": "url"` pairs
    ///
    /// # Errors
    ///
    /// Returns `MalformedManualConfig` for invalid JSON or an invalid token key.
    pub fn from_json(json: &str) -> ContentResult<Self> {
        let raw: HashMap<String, String> = serde_json::from_str(json)?;
        raw.into_iter()
            .try_fold(Self::new(), |resolver, (token, url)| resolver.with(&token, url))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    fn lookup(&self, token: &ReferenceToken, context_locale: Option<LocaleId>) -> Option<&String> {
        let normalized = token.normalized();
        let scoped = match (normalized.locale(), context_locale) {
            (None, Some(locale)) => normalized.clone().with_locale(locale),
            _ => normalized.clone(),
        };
        self.urls
            .get(&scoped.to_string())
            .or_else(|| self.urls.get(&normalized.without_locale().to_string()))
    }
}

impl ReferenceResolver for StaticResolver {
    fn resolve(&self, token: &str, context_locale: Option<LocaleId>) -> String {
        let Ok((parsed, fallback)) = ReferenceToken::parse_wrapped(token) else {
            return token.to_string();
        };
        match self.lookup(&parsed, context_locale) {
            Some(url) => url.clone(),
            None => fallback.unwrap_or_else(|| token.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> StaticResolver {
        StaticResolver::new()
            .with("entry:5:url", "/blog/post")
            .and_then(|r| r.with("entry:5@2:url", "/fr/blog/article"))
            .and_then(|r| r.with("asset:7:transform:thumb", "/assets/_thumb/a.jpg"))
            .unwrap()
    }

    #[test]
    fn test_resolves_known_token() {
        assert_eq!(resolver().resolve("{entry:5:url}", None), "/blog/post");
        assert_eq!(resolver().resolve("{entry:5}", None), "/blog/post");
    }

    #[test]
    fn test_context_locale_scopes_lookup() {
        let r = resolver();
        assert_eq!(r.resolve("{entry:5:url}", Some(2)), "/fr/blog/article");
        assert_eq!(r.resolve("{entry:5@2:url}", None), "/fr/blog/article");
        // No locale-specific entry: falls back to the locale-less one
        assert_eq!(r.resolve("{entry:5:url}", Some(9)), "/blog/post");
    }

    #[test]
    fn test_unresolved_echoes_input() {
        assert_eq!(resolver().resolve("{entry:99:url}", None), "{entry:99:url}");
        assert_eq!(resolver().resolve("not a token", None), "not a token");
    }

    #[test]
    fn test_unresolved_uses_fallback() {
        assert_eq!(resolver().resolve("{entry:99:url||/old}", None), "/old");
    }

    #[test]
    fn test_from_json() {
        let r = StaticResolver::from_json(r#"{"entry:1": "/a", "asset:2:transform:x": "/b"}"#).unwrap();
        assert_eq!(r.len(), 2);
        assert_eq!(r.resolve("{entry:1:url}", None), "/a");
        assert!(StaticResolver::from_json(r#"{"nope": "/a"}"#).is_err());
        assert!(StaticResolver::from_json("[").is_err());
    }
}
