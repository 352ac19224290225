//! # Sales Forecast
//!
//! Daily sales forecasting for transaction records.
//!
//! ## Features
//!
//! - Transaction decoding from JSON or CSV
//! - Aggregation into a gap-free daily series (duplicates summed, gaps zero-filled)
//! - ARIMA models estimated by conditional sum of squares
//! - A stateless [`ForecastService`] producing a 30-day ARIMA(1,1,1) forecast
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use sales_forecast::{ForecastService, TransactionRecord};
//!
//! let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
//! let records: Vec<TransactionRecord> = (1..=20)
//!     .map(|d| TransactionRecord::new(day(d), 100.0 + d as f64 * 3.0))
//!     .collect();
//!
//! let service = ForecastService::new();
//! let points = service.forecast_from(&records, day(31)).unwrap();
//! assert_eq!(points.len(), 30);
//! assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
//! ```

pub mod data;
pub mod error;
pub mod models;
pub mod optimize;
pub mod service;
pub mod utils;

// Re-export commonly used types
pub use crate::data::{DailySeries, TransactionLoader, TransactionRecord};
pub use crate::error::{ErrorKind, ForecastError};
pub use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};
pub use crate::service::{ForecastPoint, ForecastService, ARIMA_ORDER, FORECAST_HORIZON};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
