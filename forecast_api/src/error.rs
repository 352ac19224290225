//! Mapping of forecast failures onto HTTP responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sales_forecast::{ErrorKind, ForecastError};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

/// Body of every non-2xx response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A failed request: 400 for validation failures, 500 for everything else
#[derive(Debug)]
pub struct ApiError(pub ForecastError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Processing => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ForecastError> for ApiError {
    fn from(err: ForecastError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.0.to_string();

        if status.is_server_error() {
            error!(%status, error = %message, "Forecast request failed");
        } else {
            warn!(%status, error = %message, "Forecast request rejected");
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
