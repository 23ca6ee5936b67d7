pub mod constants;
pub mod html_utils;

pub use constants::*;
pub use html_utils::{collapse_whitespace, is_html_empty, strip_tags};
