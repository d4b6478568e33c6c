//! HTTP Routes

pub mod catalog;
pub mod form;
pub mod predictions;

use feature_engine::HouseAttributes;
use inference_engine::{Estimate, EstimateError, InferenceError};
use std::sync::Arc;
use tracing::{info, warn};

use crate::AppState;

/// Run one estimate on the blocking pool and record its outcome
pub(crate) async fn run_estimate(
    state: &Arc<AppState>,
    attrs: HouseAttributes,
) -> Result<Estimate, EstimateError> {
    let task_state = state.clone();
    let result = tokio::task::spawn_blocking(move || task_state.estimator.estimate(&attrs))
        .await
        .unwrap_or_else(|e| {
            Err(InferenceError::InferenceFailed(format!("prediction task failed: {}", e)).into())
        });

    let outcome = match &result {
        Ok(estimate) => {
            metrics::histogram!("estimator_inference_latency_ms").record(estimate.latency_ms as f64);
            info!("Estimate {} for {}", estimate.formatted, estimate.region);
            "ok"
        }
        Err(EstimateError::RegionUnavailable(_)) => "region_unavailable",
        Err(EstimateError::UnknownRegion(_)) | Err(EstimateError::Invalid(_)) => "invalid",
        Err(EstimateError::Inference(e)) => {
            warn!("Estimate failed: {}", e);
            "error"
        }
    };
    metrics::counter!("estimator_requests_total", "outcome" => outcome).increment(1);

    result
}
