//! Reference tokens, their resolution seam, and the attribute codec

pub mod codec;
pub mod resolver;
pub mod token;

pub use codec::ReferenceCodec;
pub use resolver::{ElementContext, ReferenceResolver, StaticResolver};
pub use token::{LocaleId, Qualifier, ReferenceToken, TokenParseError};
