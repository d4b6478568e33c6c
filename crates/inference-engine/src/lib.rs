//! Price Inference Engine
//!
//! Loads the trained regression model behind the [`Model`] trait and turns
//! encoded feature rows into rupiah estimates. The model predicts in
//! log-space; estimates are recovered with `exp(x) - 1`.

mod engine;
mod format;
mod loader;
mod model;
mod onnx;

pub use engine::{Estimate, EstimateError, PriceEstimator};
pub use format::{format_rupiah, group_thousands};
pub use loader::{LoadPolicy, LoadedModel, ModelFormat, ModelLoader, ModelSpec};
pub use model::{LinearModel, Model};
pub use onnx::OnnxModel;

use feature_engine::SchemaError;
use thiserror::Error;

/// Errors during model loading and inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: String, actual: String },
    #[error("Feature schema mismatch: {0}")]
    Schema(#[from] SchemaError),
    #[error("Model produced a non-finite value: {0}")]
    NonFinite(f64),
}
