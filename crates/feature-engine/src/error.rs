//! Feature Engine Error Types

use thiserror::Error;

/// Errors building a region catalog
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("supported region list is empty")]
    Empty,
    #[error("region listed twice: {0}")]
    Duplicate(String),
    #[error("region {0} is listed as both supported and unsupported")]
    Overlap(String),
}

/// Mismatch between a feature row and the schema a model expects
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("feature width mismatch: expected {expected} columns, got {actual}")]
    WidthMismatch { expected: usize, actual: usize },
    #[error("column {index} mismatch: expected {expected:?}, got {actual:?}")]
    ColumnMismatch {
        index: usize,
        expected: String,
        actual: String,
    },
    #[error("failed to read schema: {0}")]
    Io(String),
    #[error("failed to parse schema: {0}")]
    Parse(String),
}

/// Errors during feature encoding
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// Region is selectable but the model has no coverage for it
    #[error("no pricing data available for region {0}")]
    RegionUnavailable(String),
    /// Region is not in the catalog at all
    #[error("unknown region: {0}")]
    UnknownRegion(String),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}
