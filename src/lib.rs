pub mod config;
pub mod content;
pub mod error;
pub mod reference;
pub mod sanitize;
pub mod utils;

pub use config::{FieldConfig, FieldSettings, ManualPolicyConfig};
pub use content::{ContentNormalizer, FieldData};
pub use error::{ContentError, ContentResult};
pub use reference::{
    ElementContext, LocaleId, Qualifier, ReferenceCodec, ReferenceResolver, ReferenceToken,
    StaticResolver,
};
pub use sanitize::{
    AmmoniaSanitizer, CapabilityProvider, HtmlSanitizer, IframePolicy, PolicyDescriptor,
    SanitizationPipeline, StyleAllowlistPolicy, VectorGraphicsGuard,
};
