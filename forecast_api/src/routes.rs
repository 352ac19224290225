//! API route handlers

use crate::error::ApiError;
use crate::AppState;
use axum::body::Bytes;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use sales_forecast::{ForecastError, ForecastPoint};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
}

/// Liveness probe
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `POST /forecast`: `{"data": [{"date", "amount"}, ...]}` to 30 dated predictions.
///
/// Malformed bodies are reported as `{"error": ...}` with status 500, not as an
/// extractor rejection.
pub async fn forecast(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Vec<ForecastPoint>>, ApiError> {
    let payload: Value = serde_json::from_slice(&body).map_err(|e| {
        ForecastError::DataError(format!("Request body is not valid JSON: {}", e))
    })?;

    let service = state.service;
    let points = tokio::task::spawn_blocking(move || service.forecast_request(&payload))
        .await
        .map_err(|e| ForecastError::ModelError(format!("Forecast task failed: {}", e)))??;

    tracing::debug!(points = points.len(), "Forecast produced");
    Ok(Json(points))
}
