//! Validation Error Types

use thiserror::Error;

/// Errors during attribute validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    /// Bounds table is inconsistent (min > max or default outside range)
    #[error("invalid bounds for {field}: min={min}, max={max}, default={default}")]
    InvalidBounds {
        field: &'static str,
        min: u32,
        max: u32,
        default: u32,
    },

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}
