//! HTML Form Routes

use axum::{
    extract::{rejection::FormRejection, State},
    http::StatusCode,
    response::Html,
    Form,
};
use data_validator::ValidationError;
use feature_engine::HouseAttributes;
use inference_engine::EstimateError;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use super::run_estimate;
use crate::page::{self, Outcome};
use crate::AppState;

/// Form pre-filled with defaults, no result yet
pub async fn get_form(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(render(&state, &state.default_attributes(), &Outcome::Pending))
}

/// Handle a form submission and show the result below the form
pub async fn submit_form(
    State(state): State<Arc<AppState>>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> (StatusCode, Html<String>) {
    let fields = match form {
        Ok(Form(fields)) => fields,
        Err(rejection) => {
            debug!("Form rejected: {}", rejection);
            let error = ValidationError::InvalidFormat(rejection.body_text());
            let outcome = Outcome::Error(format!("Input tidak valid: {}", error));
            let html = render(&state, &state.default_attributes(), &outcome);
            return (StatusCode::UNPROCESSABLE_ENTITY, Html(html));
        }
    };

    let (attrs, parsed) = HouseAttributes::from_fields(&fields, state.estimator.validator());
    if !parsed.valid {
        debug!("Form fields rejected: {}", parsed.summary());
        let outcome = Outcome::from_result(&Err(EstimateError::Invalid(parsed)));
        let html = render(&state, &attrs, &outcome);
        return (StatusCode::UNPROCESSABLE_ENTITY, Html(html));
    }

    let result = run_estimate(&state, attrs.clone()).await;
    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err(e) if e.is_rejection() => StatusCode::UNPROCESSABLE_ENTITY,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    };

    let html = render(&state, &attrs, &Outcome::from_result(&result));
    (status, Html(html))
}

fn render(state: &AppState, values: &HouseAttributes, outcome: &Outcome) -> String {
    let estimator = &state.estimator;
    page::render(
        estimator.validator().config(),
        estimator.encoder().catalog(),
        values,
        outcome,
    )
}
