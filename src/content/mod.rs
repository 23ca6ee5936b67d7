//! Field content value and the normalizer sequencing the transformations

pub mod field_data;
pub mod normalizer;
pub mod pagebreak;
pub mod storage;

pub use field_data::FieldData;
pub use normalizer::ContentNormalizer;
