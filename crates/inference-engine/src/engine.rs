//! Price Estimator
//!
//! validate → encode (region gate) → acquire model → schema check →
//! predict → `exp(x) - 1` → format. The region gate runs before the model
//! is touched, so an uncovered region never costs a model load.

use crate::format::format_rupiah;
use crate::loader::ModelLoader;
use crate::InferenceError;
use data_validator::{ValidationResult, Validator};
use feature_engine::{EncodeError, FeatureEncoder, HouseAttributes, RegionStatus};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

/// A finished estimate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate {
    /// Canonical region name
    pub region: String,
    /// Raw model output
    pub log_price: f64,
    /// `exp(log_price) - 1`
    pub price: f64,
    /// `Rp 1,234,567`
    pub formatted: String,
    /// Time spent encoding and predicting
    pub latency_ms: u64,
}

/// Why an estimate could not be produced
#[derive(Debug, Error)]
pub enum EstimateError {
    /// One or more attributes out of bounds
    #[error("invalid input: {}", .0.summary())]
    Invalid(ValidationResult),
    /// The model has no coverage for this region
    #[error("no pricing data available for region {0}")]
    RegionUnavailable(String),
    #[error("unknown region: {0}")]
    UnknownRegion(String),
    /// Model missing, corrupt, incompatible or misbehaving
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

impl EstimateError {
    /// Whether this is a domain rejection rather than an infrastructure failure
    pub fn is_rejection(&self) -> bool {
        !matches!(self, EstimateError::Inference(_))
    }
}

impl From<EncodeError> for EstimateError {
    fn from(e: EncodeError) -> Self {
        match e {
            EncodeError::RegionUnavailable(region) => EstimateError::RegionUnavailable(region),
            EncodeError::UnknownRegion(region) => EstimateError::UnknownRegion(region),
            EncodeError::Schema(e) => EstimateError::Inference(InferenceError::Schema(e)),
        }
    }
}

/// Validates, encodes and prices a single request
pub struct PriceEstimator {
    validator: Validator,
    encoder: FeatureEncoder,
    loader: ModelLoader,
}

impl PriceEstimator {
    pub fn new(validator: Validator, encoder: FeatureEncoder, loader: ModelLoader) -> Self {
        info!(
            "Creating price estimator: width={}, policy={:?}",
            encoder.width(),
            loader.policy()
        );
        Self {
            validator,
            encoder,
            loader,
        }
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    pub fn loader(&self) -> &ModelLoader {
        &self.loader
    }

    /// Produce an estimate or a declared failure
    pub fn estimate(&self, attrs: &HouseAttributes) -> Result<Estimate, EstimateError> {
        let start = std::time::Instant::now();

        let validation = attrs.validate(&self.validator);
        if !validation.valid {
            debug!("Rejected input: {}", validation.summary());
            return Err(EstimateError::Invalid(validation));
        }

        let row = self.encoder.encode(attrs).map_err(|e| {
            warn!("Encoding rejected for region {:?}: {}", attrs.region, e);
            EstimateError::from(e)
        })?;

        let loaded = self.loader.acquire()?;
        if let Some(schema) = loaded.schema() {
            schema.verify(row.columns()).map_err(InferenceError::from)?;
        }

        let log_price = loaded.model().predict(&row)?;
        if !log_price.is_finite() {
            return Err(InferenceError::NonFinite(log_price).into());
        }

        let price = log_price.exp_m1();
        if !price.is_finite() {
            return Err(InferenceError::NonFinite(price).into());
        }

        let region = match self.encoder.catalog().resolve(&attrs.region) {
            RegionStatus::Supported { name, .. } => name.to_string(),
            _ => attrs.region.clone(),
        };

        let latency_ms = start.elapsed().as_millis() as u64;
        debug!(
            "Estimate for {}: log={:.4}, price={:.0} ({}ms)",
            region, log_price, price, latency_ms
        );

        Ok(Estimate {
            region,
            log_price,
            price,
            formatted: format_rupiah(price),
            latency_ms,
        })
    }
}
