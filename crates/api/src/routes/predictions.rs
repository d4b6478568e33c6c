//! Prediction Routes

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use feature_engine::HouseAttributes;
use inference_engine::{Estimate, EstimateError};
use serde::Serialize;
use std::sync::Arc;

use super::run_estimate;
use crate::AppState;

/// Error body for the JSON API
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Machine-readable kind
    pub error: &'static str,
    pub message: String,
}

/// Failure of a JSON prediction request
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    fn new(status: StatusCode, error: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                error,
                message: message.into(),
            },
        }
    }
}

impl From<EstimateError> for ApiError {
    fn from(e: EstimateError) -> Self {
        let message = e.to_string();
        match e {
            EstimateError::RegionUnavailable(_) => {
                ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, "region_unavailable", message)
            }
            EstimateError::UnknownRegion(_) => {
                ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, "unknown_region", message)
            }
            EstimateError::Invalid(_) => {
                ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, "invalid_input", message)
            }
            EstimateError::Inference(_) => {
                ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "inference_failed", message)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Estimate a price from a JSON body
pub async fn post_prediction(
    State(state): State<Arc<AppState>>,
    body: Result<Json<HouseAttributes>, JsonRejection>,
) -> Result<Json<Estimate>, ApiError> {
    let Json(attrs) = body.map_err(|rejection| {
        ApiError::new(rejection.status(), "malformed_request", rejection.body_text())
    })?;

    let estimate = run_estimate(&state, attrs).await?;
    Ok(Json(estimate))
}
