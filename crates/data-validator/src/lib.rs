//! Attribute Validation
//!
//! Provides per-field bounds and range checking for house attribute input.
//! The bounds double as the form's `min`/`max`/default values, so the
//! rendered form and the server-side check never drift apart.

mod error;
mod validator;

pub use error::ValidationError;
pub use validator::{FieldBounds, ValidationConfig, ValidationResult, Validator};
