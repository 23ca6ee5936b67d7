//! Capability-driven inline style allow-list

use std::collections::BTreeSet;

/// Capability name to the CSS property it unlocks
const CAPABILITY_PROPERTIES: &[(&str, &str)] = &[
    ("alignment", "text-align"),
    ("fontcolor", "color"),
    ("fontfamily", "font-family"),
    ("fontsize", "font-size"),
];

/// Source of the enabled editor capabilities for a field
pub trait CapabilityProvider {
    fn enabled_capabilities(&self) -> BTreeSet<String>;
}

impl CapabilityProvider for BTreeSet<String> {
    fn enabled_capabilities(&self) -> BTreeSet<String> {
        self.clone()
    }
}

impl CapabilityProvider for [&str] {
    fn enabled_capabilities(&self) -> BTreeSet<String> {
        self.iter().map(|c| (*c).to_string()).collect()
    }
}

/// Maps enabled capabilities to permitted inline CSS property names
pub struct StyleAllowlistPolicy;

impl StyleAllowlistPolicy {
    /// Permitted properties for `enabled`. Unknown capabilities contribute
    /// nothing.
    #[must_use]
    pub fn resolve<S: AsRef<str>>(enabled: impl IntoIterator<Item = S>) -> BTreeSet<&'static str> {
        let enabled: BTreeSet<String> = enabled
            .into_iter()
            .map(|c| c.as_ref().trim().to_ascii_lowercase())
            .collect();
        CAPABILITY_PROPERTIES
            .iter()
            .filter(|(capability, _)| enabled.contains(*capability))
            .map(|(_, property)| *property)
            .collect()
    }

    /// Whether `property` is unlocked by any capability at all
    #[must_use]
    pub fn is_known_property(property: &str) -> bool {
        CAPABILITY_PROPERTIES.iter().any(|(_, p)| *p == property)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_known_capabilities() {
        let allowed = StyleAllowlistPolicy::resolve(["alignment", "fontcolor"]);
        assert_eq!(allowed, BTreeSet::from(["text-align", "color"]));
    }

    #[test]
    fn test_unknown_and_empty() {
        assert!(StyleAllowlistPolicy::resolve(["table", "video"]).is_empty());
        assert!(StyleAllowlistPolicy::resolve(Vec::<String>::new()).is_empty());
    }

    #[test]
    fn test_capability_names_are_case_insensitive() {
        let allowed = StyleAllowlistPolicy::resolve(["FontSize "]);
        assert_eq!(allowed, BTreeSet::from(["font-size"]));
    }

    #[test]
    fn test_provider_for_slices() {
        let provider: &[&str] = &["fontfamily"];
        let allowed = StyleAllowlistPolicy::resolve(provider.enabled_capabilities());
        assert!(allowed.contains("font-family"));
        assert!(StyleAllowlistPolicy::is_known_property("color"));
        assert!(!StyleAllowlistPolicy::is_known_property("position"));
    }
}
