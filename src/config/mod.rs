//! Configuration module for rich-text fields
//!
//! This module provides the `FieldConfig` struct and its builder, the
//! serializable `FieldSettings` form, and manual sanitizer policies.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod manual;
pub mod settings;
pub mod types;

// Re-exports for public API
pub use builder::FieldConfigBuilder;
pub use manual::ManualPolicyConfig;
pub use settings::FieldSettings;
pub use types::{FieldConfig, PolicyExtension};
