//! House Price Estimator API Server
//!
//! Serves the estimate form as HTML plus a JSON API over the same
//! encode-and-predict path.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use feature_engine::HouseAttributes;
use inference_engine::{LoadPolicy, PriceEstimator};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_governor::GovernorLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub mod config;
pub mod page;
pub mod rate_limit;
mod routes;

pub use crate::config::{LoggingSettings, Settings};

/// Application state shared across handlers
pub struct AppState {
    /// Encoder, validator and model loader
    pub estimator: PriceEstimator,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
    /// Prometheus exporter, when a recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new application state
    pub fn new(estimator: PriceEstimator, metrics: Option<PrometheusHandle>) -> Self {
        Self {
            estimator,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
            metrics,
        }
    }

    /// Form values shown before the first submission
    pub fn default_attributes(&self) -> HouseAttributes {
        let region = self
            .estimator
            .encoder()
            .catalog()
            .supported()
            .first()
            .cloned()
            .unwrap_or_default();
        HouseAttributes::from_defaults(self.estimator.validator().config(), region)
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub model: ModelHealth,
}

/// Model loader status
#[derive(Debug, Serialize)]
pub struct ModelHealth {
    pub loaded: bool,
    pub description: Option<String>,
    pub policy: LoadPolicy,
    pub feature_width: usize,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::form::get_form))
        .route("/predict", post(routes::form::submit_form))
        .route("/api/v1/predict", post(routes::predictions::post_prediction))
        .route("/api/v1/regions", get(routes::catalog::get_regions))
        .route("/api/v1/schema", get(routes::catalog::get_schema))
        .route("/api/v1/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let loader = state.estimator.loader();
    // A cached-policy loader that has not loaded yet is still waiting on its artifact
    let status = if loader.is_loaded() || loader.policy() == LoadPolicy::PerRequest {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status: status.to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        model: ModelHealth {
            loaded: loader.is_loaded(),
            description: loader.describe(),
            policy: loader.policy(),
            feature_width: state.estimator.encoder().width(),
        },
    })
}

/// Prometheus scrape endpoint
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed".to_string()),
    }
}

/// Initialize logging; later calls are no-ops
pub fn init_logging(settings: &LoggingSettings) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let _ = if settings.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

/// Run the server until Ctrl-C
pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let estimator = settings.build_estimator()?;

    if settings.model.warm_on_start && settings.model.policy == LoadPolicy::Cached {
        if let Err(e) = estimator.loader().warm() {
            warn!("Model not loaded at startup, will retry per request: {}", e);
        }
    }

    let metrics = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Prometheus recorder unavailable: {}", e);
            None
        }
    };

    let state = Arc::new(AppState::new(estimator, metrics));
    let mut app = create_router(state);

    if settings.rate_limit.enabled {
        let config = rate_limit::create_governor_config(&settings.rate_limit)?;
        app = app.layer(GovernorLayer { config });
    }

    info!("Starting API server on {}", settings.server.addr);

    let listener = tokio::net::TcpListener::bind(&settings.server.addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use data_validator::Validator;
    use feature_engine::FeatureEncoder;
    use inference_engine::{LinearModel, LoadedModel, ModelFormat, ModelLoader, ModelSpec};
    use std::collections::BTreeMap;
    use tower::ServiceExt;

    fn linear_state() -> Arc<AppState> {
        let mut coefficients = BTreeMap::new();
        coefficients.insert("Luas Bangunan".to_string(), 1.0);
        let model = LinearModel::new(14.0, coefficients);
        let estimator = PriceEstimator::new(
            Validator::default(),
            FeatureEncoder::default(),
            ModelLoader::preloaded(LoadedModel::new(Box::new(model), None)),
        );
        Arc::new(AppState::new(estimator, None))
    }

    fn missing_model_state() -> Arc<AppState> {
        let loader = ModelLoader::new(
            ModelSpec {
                path: "/nonexistent/house_price.onnx".into(),
                format: ModelFormat::Onnx,
                schema_path: None,
                width: 30,
            },
            LoadPolicy::PerRequest,
        );
        let estimator = PriceEstimator::new(Validator::default(), FeatureEncoder::default(), loader);
        Arc::new(AppState::new(estimator, None))
    }

    const CIKUPA_FORM: &str = "bedrooms=3&bathrooms=2&land_area=100&building_area=80\
        &electrical_power=1300&floors=1&carports=1&servant_bedrooms=0&servant_bathrooms=0\
        &region=Cikupa";

    async fn send(state: Arc<AppState>, request: Request<Body>) -> (StatusCode, String) {
        let response = create_router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn form_request(body: String) -> Request<Body> {
        Request::post("/predict")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    fn json_request(body: serde_json::Value) -> Request<Body> {
        Request::post("/api/v1/predict")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn expected_price() -> String {
        inference_engine::format_rupiah((14.0 + 80f64.ln_1p()).exp_m1())
    }

    #[tokio::test]
    async fn test_form_page_renders() {
        let (status, body) = send(linear_state(), Request::get("/").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<form method=\"post\" action=\"/predict\">"));
        assert!(body.contains("<option value=\"Balaraja\" selected>"));
    }

    #[tokio::test]
    async fn test_form_submit_shows_estimate() {
        let (status, body) = send(linear_state(), form_request(CIKUPA_FORM.to_string())).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(&expected_price()));
        assert!(body.contains(page::DISCLAIMER));
        assert!(body.contains("<option value=\"Cikupa\" selected>"));
    }

    #[tokio::test]
    async fn test_form_unsupported_region_message() {
        let body = CIKUPA_FORM.replace("region=Cikupa", "region=Sukadiri");
        let (status, body) = send(missing_model_state(), form_request(body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.contains("Maaf, data untuk kecamatan Sukadiri belum tersedia."));
        assert!(!body.contains("Terjadi kesalahan"));
    }

    #[tokio::test]
    async fn test_form_missing_model_message() {
        let (status, body) = send(missing_model_state(), form_request(CIKUPA_FORM.to_string())).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body.contains("Terjadi kesalahan: Model load failed"));
    }

    #[tokio::test]
    async fn test_form_garbage_input() {
        let body = CIKUPA_FORM
            .replace("floors=1", "floors=two")
            .replace("bedrooms=3", "bedrooms=5")
            .replace("region=Cikupa", "region=Legok");
        let (status, body) = send(linear_state(), form_request(body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.contains("Input tidak valid: Invalid data format: floors &#39;two&#39;"));
        // Everything else the user entered is shown again
        assert!(body.contains("name=\"bedrooms\" min=\"1\" max=\"10\" step=\"1\" value=\"5\""));
        assert!(body.contains("<option value=\"Legok\" selected>"));
    }

    #[tokio::test]
    async fn test_form_missing_field() {
        let body = CIKUPA_FORM.replace("&carports=1", "");
        let (status, body) = send(linear_state(), form_request(body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.contains("Missing required field: carports"));
        assert!(body.contains("<option value=\"Cikupa\" selected>"));
    }

    #[tokio::test]
    async fn test_form_wrong_content_type() {
        let request = Request::post("/predict")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from(CIKUPA_FORM))
            .unwrap();
        let (status, body) = send(linear_state(), request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.contains("Input tidak valid: Invalid data format"));
    }

    #[tokio::test]
    async fn test_json_prediction() {
        let request = json_request(serde_json::json!({
            "bedrooms": 3, "bathrooms": 2, "land_area": 100, "building_area": 80,
            "electrical_power": 1300, "floors": 1, "carports": 1,
            "servant_bedrooms": 0, "servant_bathrooms": 0, "region": "Cikupa"
        }));
        let (status, body) = send(linear_state(), request).await;
        assert_eq!(status, StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["region"], "Cikupa");
        assert_eq!(json["formatted"], expected_price());
    }

    #[tokio::test]
    async fn test_json_rejections() {
        let mut input = serde_json::json!({
            "bedrooms": 3, "bathrooms": 2, "land_area": 100, "building_area": 80,
            "electrical_power": 1300, "floors": 1, "carports": 1,
            "servant_bedrooms": 0, "servant_bathrooms": 0, "region": "Sukadiri"
        });
        let (status, body) = send(linear_state(), json_request(input.clone())).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.contains("region_unavailable"));
        assert!(body.contains("Sukadiri"));

        input["region"] = "Cikupa".into();
        input["electrical_power"] = 9000.into();
        let (status, body) = send(linear_state(), json_request(input)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.contains("invalid_input"));
    }

    #[tokio::test]
    async fn test_json_model_failure() {
        let request = json_request(serde_json::json!({
            "bedrooms": 3, "bathrooms": 2, "land_area": 100, "building_area": 80,
            "electrical_power": 1300, "floors": 1, "carports": 1,
            "servant_bedrooms": 0, "servant_bathrooms": 0, "region": "Cikupa"
        }));
        let (status, body) = send(missing_model_state(), request).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body.contains("inference_failed"));
        assert!(body.contains("Model load failed"));
    }

    #[tokio::test]
    async fn test_schema_and_regions() {
        let (_, body) = send(linear_state(), Request::get("/api/v1/schema").body(Body::empty()).unwrap()).await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["width"], 30);
        assert_eq!(json["columns"][9], "kec_Balaraja");

        let (_, body) = send(linear_state(), Request::get("/api/v1/regions").body(Body::empty()).unwrap()).await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["supported"].as_array().unwrap().len(), 21);
        assert_eq!(json["unsupported"].as_array().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(linear_state(), Request::get("/api/v1/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["model"]["loaded"], true);
        assert_eq!(json["model"]["policy"], "cached");
    }

    #[tokio::test]
    async fn test_metrics_without_recorder() {
        let (status, _) = send(linear_state(), Request::get("/metrics").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
