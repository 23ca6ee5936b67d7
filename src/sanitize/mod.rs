//! Save-time sanitization: allow-list policy, style allow-list, vector
//! graphics isolation, cleanup stages and the pipeline composing them

pub mod cleanup;
pub mod pipeline;
pub mod policy;
pub mod style_policy;
pub mod vector_graphics;

pub use pipeline::SanitizationPipeline;
pub use policy::{AmmoniaSanitizer, HtmlSanitizer, IframePolicy, PolicyDescriptor, STYLED_ELEMENTS};
pub use style_policy::{CapabilityProvider, StyleAllowlistPolicy};
pub use vector_graphics::{GraphicsFragment, VectorGraphicsGuard};
