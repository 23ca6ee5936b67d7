//! Reference tokens: `type:id[@locale][:qualifier]`
//!
//! A token marks a link or image as pointing at a managed content item
//! rather than at a literal URL. Inside stored content it appears wrapped as
//! `{token||fallback-url}`; at output time it rides along as a URL hash,
//! `resolved-url#token`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Numeric identifier of a localized variant (site)
pub type LocaleId = u32;

/// Handle grammar shared by transform and named qualifiers
pub(crate) const HANDLE_PATTERN: &str = r"[A-Za-z][A-Za-z0-9_]*";

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^([\w\\]+):(\d+)(?:@(\d+))?(?::((?:transform:)?{HANDLE_PATTERN}))?$"
    ))
    .expect("TOKEN_RE: hardcoded regex is valid")
});

static WRAPPED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\{([^{}|]+)(?:\|\|([^}]*))?\}$").expect("WRAPPED_RE: hardcoded regex is valid")
});

/// Which derived representation of the target a token resolves to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Qualifier {
    /// `:url`, the target's own URL
    Url,
    /// `:transform:handle`, a named image transform
    Transform(String),
    /// `:handle`, any other named representation
    Named(String),
}

impl Qualifier {
    fn parse(raw: &str) -> Self {
        if raw == "url" {
            Qualifier::Url
        } else if let Some(handle) = raw.strip_prefix("transform:") {
            Qualifier::Transform(handle.to_string())
        } else {
            Qualifier::Named(raw.to_string())
        }
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Qualifier::Url => f.write_str("url"),
            Qualifier::Transform(handle) => write!(f, "transform:{handle}"),
            Qualifier::Named(handle) => f.write_str(handle),
        }
    }
}

/// Immutable, parsed reference token
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceToken {
    kind: String,
    id: u64,
    locale: Option<LocaleId>,
    qualifier: Option<Qualifier>,
}

/// Error returned when text is not a reference token
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid reference token: {0}")]
pub struct TokenParseError(pub String);

impl ReferenceToken {
    #[must_use]
    pub fn new(kind: impl Into<String>, id: u64) -> Self {
        Self {
            kind: kind.into(),
            id,
            locale: None,
            qualifier: None,
        }
    }

    #[must_use]
    pub fn with_locale(mut self, locale: LocaleId) -> Self {
        self.locale = Some(locale);
        self
    }

    #[must_use]
    pub fn with_qualifier(mut self, qualifier: Qualifier) -> Self {
        self.qualifier = Some(qualifier);
        self
    }

    /// Build a token from its raw regex pieces. Returns `None` when the id or
    /// locale do not fit their integer types.
    pub(crate) fn from_parts(
        kind: &str,
        id: &str,
        locale: Option<&str>,
        qualifier: Option<&str>,
    ) -> Option<Self> {
        let id = id.parse::<u64>().ok()?;
        let locale = match locale {
            Some(raw) => Some(raw.parse::<LocaleId>().ok()?),
            None => None,
        };
        Some(Self {
            kind: kind.to_string(),
            id,
            locale,
            qualifier: qualifier.map(Qualifier::parse),
        })
    }

    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn locale(&self) -> Option<LocaleId> {
        self.locale
    }

    #[must_use]
    pub fn qualifier(&self) -> Option<&Qualifier> {
        self.qualifier.as_ref()
    }

    /// Same token, with the qualifier defaulted to `url`
    #[must_use]
    pub fn normalized(&self) -> Self {
        let mut token = self.clone();
        if token.qualifier.is_none() {
            token.qualifier = Some(Qualifier::Url);
        }
        token
    }

    /// Same token without its locale
    #[must_use]
    pub fn without_locale(&self) -> Self {
        let mut token = self.clone();
        token.locale = None;
        token
    }

    /// `{token}`, or `{token||fallback}` when a non-empty fallback is given
    #[must_use]
    pub fn wrapped(&self, fallback: Option<&str>) -> String {
        match fallback {
            Some(url) if !url.is_empty() => format!("{{{self}||{url}}}"),
            _ => format!("{{{self}}}"),
        }
    }

    /// Parse `{token}` or `{token||fallback}`
    pub fn parse_wrapped(wrapped: &str) -> Result<(Self, Option<String>), TokenParseError> {
        let caps = WRAPPED_RE
            .captures(wrapped)
            .ok_or_else(|| TokenParseError(wrapped.to_string()))?;
        let token = caps[1].parse::<ReferenceToken>()?;
        let fallback = caps
            .get(2)
            .map(|m| m.as_str().to_string())
            .filter(|url| !url.is_empty());
        Ok((token, fallback))
    }
}

impl FromStr for ReferenceToken {
    type Err = TokenParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = TOKEN_RE
            .captures(s)
            .ok_or_else(|| TokenParseError(s.to_string()))?;
        Self::from_parts(
            &caps[1],
            &caps[2],
            caps.get(3).map(|m| m.as_str()),
            caps.get(4).map(|m| m.as_str()),
        )
        .ok_or_else(|| TokenParseError(s.to_string()))
    }
}

impl fmt::Display for ReferenceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)?;
        if let Some(locale) = self.locale {
            write!(f, "@{locale}")?;
        }
        if let Some(qualifier) = &self.qualifier {
            write!(f, ":{qualifier}")?;
        }
        Ok(())
    }
}
