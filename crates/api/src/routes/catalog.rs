//! Region and Schema Routes

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

/// Response for the regions endpoint
#[derive(Debug, Serialize)]
pub struct RegionResponse {
    /// In indicator column order
    pub supported: Vec<String>,
    pub unsupported: Vec<String>,
}

/// Response for the schema endpoint
#[derive(Debug, Serialize)]
pub struct SchemaResponse {
    pub width: usize,
    pub columns: Vec<String>,
}

/// List selectable regions
pub async fn get_regions(State(state): State<Arc<AppState>>) -> Json<RegionResponse> {
    let catalog = state.estimator.encoder().catalog();
    Json(RegionResponse {
        supported: catalog.supported().to_vec(),
        unsupported: catalog.unsupported().to_vec(),
    })
}

/// Column layout of the feature row sent to the model
pub async fn get_schema(State(state): State<Arc<AppState>>) -> Json<SchemaResponse> {
    let schema = state.estimator.encoder().schema();
    Json(SchemaResponse {
        width: schema.width(),
        columns: schema.columns().to_vec(),
    })
}
