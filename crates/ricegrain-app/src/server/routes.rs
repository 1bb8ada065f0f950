use crate::models::{ConfigResponse, DefaultsResponse, PredictResponse};
use crate::state::{error_kind, AppState};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ricegrain_core::{Error, FeatureInput};
use serde_json::json;

// ============================================================================
// Health endpoints
// ============================================================================

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

// ============================================================================
// Configuration endpoints
// ============================================================================

pub async fn get_config(State(state): State<AppState>) -> Result<Json<ConfigResponse>, AppError> {
    let model = state.model()?;
    Ok(Json(ConfigResponse::new(&state.config, &model)))
}

pub async fn get_defaults() -> impl IntoResponse {
    Json(DefaultsResponse::new())
}

// ============================================================================
// Prediction endpoint
// ============================================================================

/// Accepts `{"features": [..7 values..]}` or named columns
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<FeatureInput>, JsonRejection>,
) -> Result<Json<PredictResponse>, AppError> {
    let features = match payload {
        Ok(Json(input)) => input.into_features(),
        Err(rejection) => Err(Error::invalid_input(rejection.body_text())),
    };

    let features = features.map_err(|e| {
        state.metrics.record_error(error_kind(&e));
        AppError(e)
    })?;

    Ok(Json(state.predict(features)?))
}

// ============================================================================
// Statistics endpoints
// ============================================================================

pub async fn get_stats(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.metrics.snapshot();
    Json(json!({
        "started_at": snapshot.started_at,
        "predictions": snapshot.predictions,
        "labels": {
            "Cammeo": snapshot.cammeo,
            "Osmancik": snapshot.osmancik,
            "Uncertain": snapshot.uncertain,
        },
        "prediction_errors": snapshot.prediction_errors,
        "avg_latency_us": snapshot.avg_latency_us(),
        "uncertain_rate": snapshot.uncertain_rate(),
    }))
}

/// Prometheus text exposition
pub async fn prometheus_metrics(State(state): State<AppState>) -> Response {
    match &state.prometheus {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::NOT_FOUND, "metrics exporter not installed").into_response(),
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Error response for API handlers
#[derive(Debug)]
pub struct AppError(pub Error);

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        AppError(err)
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::Prediction(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::ModelLoad(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Config(_) | Error::Io(_) | Error::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = json!({
            "error": {
                "message": self.0.to_string(),
                "type": error_kind(&self.0),
            }
        });

        (status, Json(body)).into_response()
    }
}
