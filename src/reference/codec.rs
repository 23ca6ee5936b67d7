//! Bidirectional reference codec for `href`/`src` attribute values
//!
//! Stored form: `href="{entry:5:url||/blog/post}?utm=1"`
//! Output form: `href="/blog/post?utm=1#entry:5:url"`
//!
//! Decode resolves wrapped tokens and keeps the token as a trailing hash so
//! encode can recover it exactly. Encode folds any query or fragment that the
//! resolved URL already owns back into the fallback URL, so a save/load cycle
//! never duplicates resolver-owned parameters.

use std::borrow::Cow;
use std::sync::LazyLock;

use html_escape::{
    decode_html_entities, encode_double_quoted_attribute, encode_single_quoted_attribute,
};
use regex::{Captures, Regex};

use super::resolver::{ElementContext, ReferenceResolver};
use super::token::{HANDLE_PATTERN, ReferenceToken};

/// A quoted `href`/`src` attribute value
static ATTRIBUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(href=|src=)(?:"([^"]*)"|'([^']*)')"#)
        .expect("ATTRIBUTE_RE: hardcoded regex is valid")
});

/// `path[?query][#hash]#type:id[@locale][:qualifier]`
///
/// Groups: 1 path, 2 query (with `?`), 3 hash segments (each with `#`,
/// possibly empty), 4 kind, 5 id, 6 locale, 7 qualifier (with leading `:`).
static ENCODE_VALUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"^([^'"?#]*)(\?[^'"?#]+)?((?:#[^'"?#]+)*)(?:#|%23)([\w\\]+):(\d+)(?:@(\d+))?(:(?:transform:)?{HANDLE_PATTERN})?$"#
    ))
    .expect("ENCODE_VALUE_RE: hardcoded regex is valid")
});

/// `{type:id[@locale][:qualifier][||fallback]}[?query][#fragment]`
///
/// Groups: 1 wrapped token, 2 bare token, 3 query (without `?`),
/// 4 fragment (with `#`, may hold several segments).
static DECODE_VALUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r##"^(\{{([\w\\]+:\d+(?:@\d+)?(?::(?:transform:)?{HANDLE_PATTERN})?)(?:\|\|[^}}]+)?\}})(?:\?([^'"#]*))?((?:#[^'"#]+)+)?$"##
    ))
    .expect("DECODE_VALUE_RE: hardcoded regex is valid")
});

/// Translates between resolved URLs and reference tokens inside markup
#[derive(Clone, Copy)]
pub struct ReferenceCodec<'r> {
    resolver: &'r dyn ReferenceResolver,
}

impl<'r> ReferenceCodec<'r> {
    #[must_use]
    pub fn new(resolver: &'r dyn ReferenceResolver) -> Self {
        Self { resolver }
    }

    /// Turn `url#token` attribute values into `{token||url}` form
    ///
    /// The resolver is only consulted when the value carries a query string
    /// or a fragment besides the token.
    #[must_use]
    pub fn encode(&self, html: &str, ctx: &ElementContext) -> String {
        rewrite_attributes(html, |value, quote| self.encode_value(value, quote, ctx))
    }

    /// Turn `{token||fallback}` attribute values into `resolved#token` form
    ///
    /// Unresolvable tokens are left exactly as written.
    #[must_use]
    pub fn decode(&self, html: &str, ctx: &ElementContext) -> String {
        if !html.contains('{') {
            return html.to_string();
        }
        rewrite_attributes(html, |value, _| self.decode_value(value, ctx))
    }

    fn encode_value(&self, value: &str, quote: char, ctx: &ElementContext) -> Option<String> {
        let caps = ENCODE_VALUE_RE.captures(value)?;
        let token = ReferenceToken::from_parts(
            &caps[4],
            &caps[5],
            caps.get(6).map(|m| m.as_str()),
            caps.get(7).map(|m| &m.as_str()[1..]),
        )?
        .normalized();

        let mut url = caps[1].to_string();
        let mut query = caps.get(2).map(|m| m.as_str().to_string());
        let mut hash = caps
            .get(3)
            .map(|m| m.as_str())
            .filter(|h| !h.is_empty())
            .map(str::to_string);

        if query.is_some() || hash.is_some() {
            let locale = token.locale().or(ctx.locale());
            let preview = self.resolver.resolve(&token.wrapped(None), locale);

            if let Some(raw) = query.take() {
                query = fold_query(&preview, &raw, quote, &mut url);
            }
            if let Some(raw) = hash.take() {
                hash = fold_hash(&preview, &raw, &mut url);
            }
        }

        tracing::trace!(token = %token, url = %url, "encoded reference");

        let mut encoded = token.wrapped(Some(&url));
        encoded.push_str(query.as_deref().unwrap_or_default());
        encoded.push_str(hash.as_deref().unwrap_or_default());
        Some(encoded)
    }

    fn decode_value(&self, value: &str, ctx: &ElementContext) -> Option<String> {
        let caps = DECODE_VALUE_RE.captures(value)?;
        let wrapped = &caps[1];
        let token = caps[2].parse::<ReferenceToken>().ok()?.normalized();

        let locale = token.locale().or(ctx.locale());
        let resolved = self.resolver.resolve(wrapped, locale);
        if resolved == wrapped || resolved.is_empty() {
            tracing::warn!(token = %token, "unresolved reference kept verbatim");
            return None;
        }

        // The query goes before the resolved URL's own fragment
        let (base, owned_fragment) = match resolved.find('#') {
            Some(at) => (&resolved[..at], Some(&resolved[at..])),
            None => (resolved.as_str(), None),
        };
        let mut decoded = base.to_string();
        if let Some(query) = caps.get(3).map(|m| m.as_str()) {
            if !resolved.contains(decode_html_entities(query).as_ref()) {
                decoded.push(if base.contains('?') { '&' } else { '?' });
                decoded.push_str(query);
            }
        }
        // A URL carries one fragment: the author's replaces the resolver's
        let author_fragment = caps
            .get(4)
            .map(|m| m.as_str())
            .filter(|fragment| !resolved.contains(*fragment));
        if let Some(fragment) = author_fragment.or(owned_fragment) {
            decoded.push_str(fragment);
        }
        decoded.push('#');
        decoded.push_str(&token.to_string());

        tracing::trace!(token = %token, url = %resolved, "decoded reference");
        Some(decoded)
    }
}

/// Fold an author query into `url` when the resolved preview owns it.
///
/// Returns whatever part of the query still has to be emitted outside the
/// token wrapper.
fn fold_query(preview: &str, raw: &str, quote: char, url: &mut String) -> Option<String> {
    let author = decode_html_entities(&raw[1..]);
    if preview.contains(author.as_ref()) {
        url.push_str(raw);
        return None;
    }

    // The resolved URL's own query may lead the author's parameters
    let owned = preview
        .split_once('?')
        .map(|(_, q)| q.split('#').next().unwrap_or_default())
        .filter(|q| !q.is_empty());
    if let Some(owned) = owned {
        if let Some(rest) = author
            .strip_prefix(owned)
            .and_then(|rest| rest.strip_prefix('&'))
            .filter(|rest| !rest.is_empty())
        {
            url.push('?');
            url.push_str(&encode_attribute(owned, quote));
            return Some(format!("?{}", encode_attribute(rest, quote)));
        }
    }

    Some(raw.to_string())
}

/// Fold an author fragment into `url` when the resolved preview owns it.
///
/// When the preview's own fragment leads further fragments, it is dropped
/// and only the author's part is kept: decode lets it replace the resolved
/// fragment.
fn fold_hash(preview: &str, raw: &str, url: &mut String) -> Option<String> {
    if preview.contains(raw) {
        url.push_str(raw);
        return None;
    }
    let owned = preview
        .split_once('#')
        .map(|(_, fragment)| fragment)
        .filter(|fragment| !fragment.is_empty());
    let rest = owned
        .and_then(|fragment| raw.strip_prefix('#')?.strip_prefix(fragment))
        .filter(|rest| rest.len() > 1 && rest.starts_with('#'));
    Some(rest.unwrap_or(raw).to_string())
}

fn encode_attribute(text: &str, quote: char) -> Cow<'_, str> {
    if quote == '\'' {
        encode_single_quoted_attribute(text)
    } else {
        encode_double_quoted_attribute(text)
    }
}

/// Apply `rewrite` to every quoted `href`/`src` value. `None` keeps the
/// attribute untouched.
fn rewrite_attributes<F>(html: &str, mut rewrite: F) -> String
where
    F: FnMut(&str, char) -> Option<String>,
{
    ATTRIBUTE_RE
        .replace_all(html, |caps: &Captures| {
            let (value, quote) = match (caps.get(2), caps.get(3)) {
                (Some(m), _) => (m.as_str(), '"'),
                (None, Some(m)) => (m.as_str(), '\''),
                (None, None) => return caps[0].to_string(),
            };
            match rewrite(value, quote) {
                Some(new_value) => format!("{}{quote}{new_value}{quote}", &caps[1]),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::StaticResolver;
    use std::cell::Cell;

    struct CountingResolver<'a> {
        inner: &'a StaticResolver,
        calls: Cell<usize>,
    }

    impl ReferenceResolver for CountingResolver<'_> {
        fn resolve(&self, token: &str, locale: Option<u32>) -> String {
            self.calls.set(self.calls.get() + 1);
            self.inner.resolve(token, locale)
        }
    }

    fn resolver() -> StaticResolver {
        StaticResolver::new()
            .with("entry:5:url", "/blog/post")
            .and_then(|r| r.with("entry:6:url", "/blog/tracked?utm=1"))
            .and_then(|r| r.with("entry:7:url", "/docs?lang=fr"))
            .and_then(|r| r.with("entry:8:url", "/guide#install"))
            .and_then(|r| r.with("entry:5@2:url", "/fr/article"))
            .and_then(|r| r.with("asset:3:transform:thumb", "/img/_thumb/a.jpg"))
            .unwrap()
    }

    #[test]
    fn test_encode_plain_link_skips_resolver() {
        let inner = resolver();
        let counting = CountingResolver { inner: &inner, calls: Cell::new(0) };
        let codec = ReferenceCodec::new(&counting);
        let html = r#"<a href="/blog/post#entry:5">x</a><img src='/img/a.jpg#asset:3:transform:thumb'>"#;
        assert_eq!(
            codec.encode(html, &ElementContext::default()),
            r#"<a href="{entry:5:url||/blog/post}">x</a><img src='{asset:3:transform:thumb||/img/a.jpg}'>"#
        );
        assert_eq!(counting.calls.get(), 0);
    }

    #[test]
    fn test_encode_with_query_consults_resolver_once() {
        let inner = resolver();
        let counting = CountingResolver { inner: &inner, calls: Cell::new(0) };
        let codec = ReferenceCodec::new(&counting);
        let out = codec.encode(
            r#"<a href="/blog/post?utm=1#entry:5:url">x</a>"#,
            &ElementContext::default(),
        );
        assert_eq!(out, r#"<a href="{entry:5:url||/blog/post}?utm=1">x</a>"#);
        assert_eq!(counting.calls.get(), 1);
    }

    #[test]
    fn test_encode_folds_resolver_owned_query() {
        let r = resolver();
        let codec = ReferenceCodec::new(&r);
        let out = codec.encode(
            r#"<a href="/blog/tracked?utm=1#entry:6:url">x</a>"#,
            &ElementContext::default(),
        );
        assert_eq!(out, r#"<a href="{entry:6:url||/blog/tracked?utm=1}">x</a>"#);
    }

    #[test]
    fn test_encode_splits_owned_query_prefix() {
        let r = resolver();
        let codec = ReferenceCodec::new(&r);
        let out = codec.encode(
            r#"<a href="/docs?lang=fr&amp;page=2#entry:7:url">x</a>"#,
            &ElementContext::default(),
        );
        assert_eq!(out, r#"<a href="{entry:7:url||/docs?lang=fr}?page=2">x</a>"#);
    }

    #[test]
    fn test_encode_folds_resolver_owned_hash() {
        let r = resolver();
        let codec = ReferenceCodec::new(&r);
        let ctx = ElementContext::default();
        assert_eq!(
            codec.encode(r#"<a href="/guide#install#entry:8">x</a>"#, &ctx),
            r#"<a href="{entry:8:url||/guide#install}">x</a>"#
        );
        assert_eq!(
            codec.encode(r#"<a href="/blog/post#top#entry:5">x</a>"#, &ctx),
            r#"<a href="{entry:5:url||/blog/post}#top">x</a>"#
        );
    }

    #[test]
    fn test_decode_keeps_query_before_resolved_fragment() {
        let r = resolver();
        let codec = ReferenceCodec::new(&r);
        let ctx = ElementContext::default();
        assert_eq!(
            codec.decode(r#"<a href="{entry:8:url||/guide#install}?x=1">x</a>"#, &ctx),
            r#"<a href="/guide?x=1#install#entry:8:url">x</a>"#
        );
        assert_eq!(
            codec.decode(r#"<a href="{entry:8:url||/guide}#top">x</a>"#, &ctx),
            r#"<a href="/guide#top#entry:8:url">x</a>"#
        );
    }

    #[test]
    fn test_resolved_fragment_cycles_are_stable() {
        let r = resolver();
        let codec = ReferenceCodec::new(&r);
        let ctx = ElementContext::default();
        for (editable, stored) in [
            (r#"<a href="/guide?x=1#install#entry:8">x</a>"#, r#"<a href="{entry:8:url||/guide#install}?x=1">x</a>"#),
            (r#"<a href="/guide#top#entry:8">x</a>"#, r#"<a href="{entry:8:url||/guide}#top">x</a>"#),
            (r#"<a href="/guide#install#top#entry:8">x</a>"#, r#"<a href="{entry:8:url||/guide}#top">x</a>"#),
        ] {
            let once = codec.encode(editable, &ctx);
            assert_eq!(once, stored);
            let twice = codec.encode(&codec.decode(&once, &ctx), &ctx);
            assert_eq!(twice, once);
        }
    }

    #[test]
    fn test_encode_accepts_percent_encoded_separator() {
        let r = resolver();
        let codec = ReferenceCodec::new(&r);
        assert_eq!(
            codec.encode(r#"<a href="/blog/post%23entry:5">x</a>"#, &ElementContext::default()),
            r#"<a href="{entry:5:url||/blog/post}">x</a>"#
        );
    }

    #[test]
    fn test_encode_leaves_ordinary_links() {
        let r = resolver();
        let codec = ReferenceCodec::new(&r);
        let html = r##"<a href="https://example.com/a?b=c#d">x</a><a href="#top">y</a>"##;
        assert_eq!(codec.encode(html, &ElementContext::default()), html);
    }

    #[test]
    fn test_decode_folds_contained_query() {
        let r = StaticResolver::new().with("entry:5:url", "/blog/post?utm=1").unwrap();
        let codec = ReferenceCodec::new(&r);
        assert_eq!(
            codec.decode(r#"<a href="{entry:5:url}?utm=1">x</a>"#, &ElementContext::default()),
            r#"<a href="/blog/post?utm=1#entry:5:url">x</a>"#
        );
    }

    #[test]
    fn test_decode_appends_foreign_query_and_fragment() {
        let r = resolver();
        let codec = ReferenceCodec::new(&r);
        let ctx = ElementContext::default();
        assert_eq!(
            codec.decode(r#"<a href="{entry:5:url||/old}?utm=1#top">x</a>"#, &ctx),
            r#"<a href="/blog/post?utm=1#top#entry:5:url">x</a>"#
        );
        assert_eq!(
            codec.decode(r#"<a href="{entry:7:url}?page=2">x</a>"#, &ctx),
            r#"<a href="/docs?lang=fr&page=2#entry:7:url">x</a>"#
        );
    }

    #[test]
    fn test_decode_normalizes_missing_qualifier() {
        let r = resolver();
        let codec = ReferenceCodec::new(&r);
        assert_eq!(
            codec.decode(r#"<a href="{entry:5}">x</a>"#, &ElementContext::default()),
            r#"<a href="/blog/post#entry:5:url">x</a>"#
        );
    }

    #[test]
    fn test_decode_uses_context_locale() {
        let r = resolver();
        let codec = ReferenceCodec::new(&r);
        assert_eq!(
            codec.decode(r#"<a href="{entry:5:url}">x</a>"#, &ElementContext::new(Some(2))),
            r#"<a href="/fr/article#entry:5:url">x</a>"#
        );
    }

    #[test]
    fn test_decode_leaves_unresolved_untouched() {
        let r = resolver();
        let codec = ReferenceCodec::new(&r);
        let html = r#"<a href="{entry:404:url}?x=1">x</a>"#;
        assert_eq!(codec.decode(html, &ElementContext::default()), html);
    }

    #[test]
    fn test_decode_without_braces_is_noop() {
        let inner = resolver();
        let counting = CountingResolver { inner: &inner, calls: Cell::new(0) };
        let codec = ReferenceCodec::new(&counting);
        let html = r#"<a href="/blog/post#entry:5:url">x</a>"#;
        assert_eq!(codec.decode(html, &ElementContext::default()), html);
        assert_eq!(counting.calls.get(), 0);
    }

    #[test]
    fn test_substring_containment_false_positive_is_kept() {
        // "a=a" occurs inside "a=ab", so the author query is folded even
        // though it is not the resolved URL's own parameter.
        let r = StaticResolver::new().with("entry:1:url", "/x?a=ab").unwrap();
        let codec = ReferenceCodec::new(&r);
        assert_eq!(
            codec.decode(r#"<a href="{entry:1:url}?a=a">x</a>"#, &ElementContext::default()),
            r#"<a href="/x?a=ab#entry:1:url">x</a>"#
        );
    }
}
