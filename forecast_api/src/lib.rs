//! # forecast_api
//!
//! HTTP surface for [`sales_forecast`]: a single `POST /forecast` endpoint plus
//! a liveness probe.

use axum::routing::{get, post};
use axum::Router;
use sales_forecast::ForecastService;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod routes;

pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ErrorResponse};

/// Application state shared across handlers
#[derive(Debug, Clone, Copy, Default)]
pub struct AppState {
    pub service: ForecastService,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            service: ForecastService::new(),
        }
    }
}

/// Build the router with its middleware
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/forecast", post(routes::forecast))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
