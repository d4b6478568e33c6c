//! Regression Model Abstraction

use crate::InferenceError;
use feature_engine::FeatureVector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// A trained regressor mapping one feature row to a log-space price
pub trait Model: Send + Sync {
    /// Predict the log1p-scaled price for a single row
    fn predict(&self, row: &FeatureVector) -> Result<f64, InferenceError>;

    /// Short human-readable identity, used in logs and health output
    fn describe(&self) -> String;
}

/// Linear regressor keyed by column label
///
/// Stored as `{ "intercept": f64, "coefficients": { "<label>": f64, ... } }`.
/// Coefficients are matched by label so column order cannot skew the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: BTreeMap<String, f64>,
}

impl LinearModel {
    pub fn new(intercept: f64, coefficients: BTreeMap<String, f64>) -> Self {
        Self {
            intercept,
            coefficients,
        }
    }

    /// Parse from JSON
    pub fn from_json_str(json: &str) -> Result<Self, InferenceError> {
        serde_json::from_str(json).map_err(|e| InferenceError::ModelLoadError(e.to_string()))
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            InferenceError::ModelLoadError(format!("{}: {}", path.display(), e))
        })?;
        let model = Self::from_json_str(&json)?;
        info!(
            "Linear model loaded from {} ({} coefficients)",
            path.display(),
            model.coefficients.len()
        );
        Ok(model)
    }
}

impl Model for LinearModel {
    fn predict(&self, row: &FeatureVector) -> Result<f64, InferenceError> {
        if let Some(label) = self.coefficients.keys().find(|l| row.get(l).is_none()) {
            return Err(InferenceError::InvalidInputShape {
                expected: format!("column {:?}", label),
                actual: format!("{} columns without it", row.len()),
            });
        }

        let log_price = row
            .columns()
            .iter()
            .zip(row.values())
            .map(|(label, value)| self.coefficients.get(label).copied().unwrap_or(0.0) * value)
            .sum::<f64>()
            + self.intercept;

        debug!("Linear prediction: {:.4}", log_price);
        Ok(log_price)
    }

    fn describe(&self) -> String {
        format!("linear({} coefficients)", self.coefficients.len())
    }
}
