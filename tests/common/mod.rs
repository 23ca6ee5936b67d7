//! Test utilities and fixtures for the richtext-refs test suite

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use richtext_refs::{
    ContentNormalizer, FieldConfig, LocaleId, ReferenceResolver, StaticResolver,
};

/// Resolver with a small, fixed site map
#[allow(dead_code)]
pub fn site_resolver() -> StaticResolver {
    StaticResolver::from_json(
        r#"{
            "entry:5:url": "/blog/post",
            "entry:5@2:url": "/fr/blog/article",
            "entry:6:url": "/blog/tracked?utm=1",
            "entry:7:url": "/docs?lang=fr",
            "entry:8:url": "/guide#install",
            "asset:3:url": "/uploads/photo.jpg",
            "asset:3:transform:thumb": "/uploads/_thumb/photo.jpg"
        }"#,
    )
    .expect("fixture reference map is valid")
}

/// Resolver that counts how often it is consulted
#[allow(dead_code)]
pub struct CountingResolver {
    inner: StaticResolver,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl CountingResolver {
    pub fn new(inner: StaticResolver) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ReferenceResolver for CountingResolver {
    fn resolve(&self, token: &str, context_locale: Option<LocaleId>) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.resolve(token, context_locale)
    }
}

/// Config with every cleanup stage on and two style capabilities
#[allow(dead_code)]
pub fn styled_config() -> FieldConfig {
    FieldConfig::builder()
        .capabilities(["alignment", "fontcolor"])
        .remove_nbsp(true)
        .build()
        .expect("fixture config is valid")
}

#[allow(dead_code)]
pub fn normalizer(config: FieldConfig) -> ContentNormalizer {
    ContentNormalizer::new(config, Arc::new(site_resolver()))
}
