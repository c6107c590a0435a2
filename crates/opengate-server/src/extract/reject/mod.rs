//! Extractors that map rejections into the error catalog.

mod json;
mod validated_json;

pub use json::Json;
pub use validated_json::ValidateJson;
