//! Model Output Validation
//!
//! Two stages turn raw model text into form fields:
//! - [`extract_json`]: locate and parse the JSON array, tolerating prose and fences
//! - [`FieldNormalizer`]: coerce each element into a well-formed [`Field`]
//!
//! ## Design Philosophy
//! - Fail only when nothing usable exists; repair everything else and say so

mod extract;
mod normalize;

pub use extract::{RawFieldList, extract_json};
pub use normalize::{FieldNormalizer, Normalized, normalize};

use crate::types::Result;

/// Run extraction then normalisation over raw model text
pub fn parse_fields(raw_text: &str, normalizer: &FieldNormalizer) -> Result<Normalized> {
    let raw = extract_json(raw_text)?;
    Ok(normalizer.normalize(&raw)?)
}
