//! ONNX Model Backend

use crate::model::Model;
use crate::InferenceError;
use feature_engine::FeatureVector;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tract_onnx::prelude::*;

type Plan = SimplePlan<TypedFact, Box<dyn TypedOp>, TypedModel>;

/// ONNX export of the trained regressor, executed with tract
///
/// The graph takes a single `[1, width]` f32 input and its first output
/// element is the log-space price.
pub struct OnnxModel {
    path: PathBuf,
    width: usize,
    plan: Plan,
}

impl OnnxModel {
    /// Load and optimize an ONNX model expecting `width` input columns
    pub fn load(path: impl AsRef<Path>, width: usize) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        info!("Loading ONNX model {} (width={})", path.display(), width);

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| model.with_input_fact(0, f32::fact([1, width]).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| InferenceError::ModelLoadError(format!("{}: {:#}", path.display(), e)))?;

        Ok(Self {
            path: path.to_path_buf(),
            width,
            plan,
        })
    }

    /// Input width the graph was specialised for
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn run(&self, values: Vec<f32>) -> TractResult<f64> {
        let input: Tensor = tract_ndarray::Array2::from_shape_vec((1, self.width), values)?.into();
        let outputs = self.plan.run(tvec!(input.into()))?;
        let output = outputs
            .first()
            .ok_or_else(|| anyhow::anyhow!("model produced no outputs"))?
            .cast_to::<f64>()?;
        output
            .as_slice::<f64>()?
            .first()
            .copied()
            .ok_or_else(|| anyhow::anyhow!("model output tensor is empty"))
    }
}

impl Model for OnnxModel {
    fn predict(&self, row: &FeatureVector) -> Result<f64, InferenceError> {
        if row.len() != self.width {
            return Err(InferenceError::InvalidInputShape {
                expected: format!("[1, {}]", self.width),
                actual: format!("[1, {}]", row.len()),
            });
        }

        let log_price = self
            .run(row.to_f32())
            .map_err(|e| InferenceError::InferenceFailed(format!("{:#}", e)))?;
        debug!("ONNX prediction: {:.4}", log_price);
        Ok(log_price)
    }

    fn describe(&self) -> String {
        format!("onnx({})", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_load_error() {
        let result = OnnxModel::load("/nonexistent/house_price.onnx", 30);
        assert!(matches!(result, Err(InferenceError::ModelLoadError(msg)) if msg.contains("house_price.onnx")));
    }

    #[test]
    fn test_corrupt_file_is_load_error() {
        let path = std::env::temp_dir().join(format!("corrupt-{}.onnx", std::process::id()));
        std::fs::write(&path, b"definitely not protobuf").unwrap();
        let result = OnnxModel::load(&path, 30);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(InferenceError::ModelLoadError(_))));
    }
}
