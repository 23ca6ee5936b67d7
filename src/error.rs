//! Error types for content transformation
//!
//! Semantic problems (unresolved references, empty content) are never errors:
//! the transformations degrade to a well-defined output instead. The variants
//! below cover structural failures that must reach the caller.

use thiserror::Error;

/// Result type alias for content operations
pub type ContentResult<T> = Result<T, ContentError>;

/// Error types for content transformation and configuration
#[derive(Debug, Error)]
pub enum ContentError {
    /// Manual policy or field settings payload is not valid structured data
    #[error("Malformed manual config: {0}")]
    MalformedManualConfig(String),

    /// The HTML sanitizer rejected its policy
    #[error("Sanitizer policy error: {0}")]
    SanitizerPolicy(String),

    /// Isolated vector-graphics sanitization failed
    #[error("Vector graphics sanitization failed: {0}")]
    GraphicsSanitization(String),

    /// A vector-graphics placeholder was lost or duplicated between extract and reinsert
    #[error("Placeholder '{placeholder}' found {occurrences} times during reinsertion (expected 1)")]
    PlaceholderMismatch {
        placeholder: String,
        occurrences: usize,
    },

    /// Input exceeds the configured size ceiling
    #[error("HTML input too large: {size} bytes. Maximum allowed: {max} bytes")]
    InputTooLarge { size: usize, max: usize },

    /// A backtracking pattern failed at runtime
    #[error("Pattern evaluation failed: {0}")]
    Pattern(String),
}

impl From<serde_json::Error> for ContentError {
    fn from(error: serde_json::Error) -> Self {
        ContentError::MalformedManualConfig(error.to_string())
    }
}

impl From<fancy_regex::Error> for ContentError {
    fn from(error: fancy_regex::Error) -> Self {
        ContentError::Pattern(error.to_string())
    }
}

impl ContentError {
    /// Check if the error was raised while validating configuration,
    /// as opposed to while transforming content
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            ContentError::MalformedManualConfig(_) | ContentError::SanitizerPolicy(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_maps_to_malformed_config() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: ContentError = err.into();
        assert!(matches!(err, ContentError::MalformedManualConfig(_)));
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_placeholder_mismatch_message() {
        let err = ContentError::PlaceholderMismatch {
            placeholder: "vg:abc".to_string(),
            occurrences: 0,
        };
        assert!(err.to_string().contains("vg:abc"));
        assert!(!err.is_configuration_error());
    }
}
