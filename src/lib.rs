//! # Sales Forecast Workspace
//!
//! Umbrella crate for the forecasting library and its HTTP endpoint.
//!
//! ## Example
//!
//! ```
//! use sales_forecast_workspace::sales_forecast::{ForecastService, FORECAST_HORIZON};
//!
//! let service = ForecastService::new();
//! assert!(service.forecast(&[]).is_err());
//! assert_eq!(FORECAST_HORIZON, 30);
//! ```

pub use forecast_api;
pub use sales_forecast;
