//! Error types for the sales_forecast crate

use thiserror::Error;

/// Message returned when a forecast is requested without any records
pub const NO_DATA_MESSAGE: &str = "No data provided";

/// Custom error types for the sales_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The request carried no usable input
    #[error("{0}")]
    ValidationError(String),

    /// Error related to parsing or aggregating transaction records
    #[error("{0}")]
    DataError(String),

    /// Error raised while fitting or projecting a model
    #[error("{0}")]
    ModelError(String),

    /// Error from invalid model parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from reading CSV input
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

/// The two failure categories callers need to tell apart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or empty input
    Validation,
    /// Anything that went wrong while parsing, aggregating or fitting
    Processing,
}

impl ForecastError {
    /// Shorthand for the empty-input failure
    pub fn no_data() -> Self {
        ForecastError::ValidationError(NO_DATA_MESSAGE.to_string())
    }

    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ForecastError::ValidationError(_) => ErrorKind::Validation,
            _ => ErrorKind::Processing,
        }
    }
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;
