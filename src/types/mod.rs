pub mod error;
pub mod field;
pub mod generation;
pub mod utils;

pub use error::{
    ErrorClassifier, ExtractError, FailureKind, FormError, NormalizeError, ProviderError, Result,
};
pub use field::{Field, FieldType};
pub use generation::{
    AttemptStatus, GenerationIntent, GenerationOutcome, GenerationRequest, OutcomeKind,
    ProviderAttempt,
};
pub use utils::{json_bool, json_string, json_string_lenient, truncate_chars};
