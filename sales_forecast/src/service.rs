//! The forecasting operation exposed to callers

use crate::data::{DailySeries, TransactionRecord};
use crate::error::{ForecastError, Result};
use crate::models::arima::Arima;
use crate::models::{ForecastModel, TrainedForecastModel};
use crate::utils::forecast_dates;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Number of days every successful forecast covers
pub const FORECAST_HORIZON: usize = 30;

/// ARIMA order used for every forecast, as `(p, d, q)`
pub const ARIMA_ORDER: (usize, usize, usize) = (1, 1, 1);

/// One forecast day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Day the prediction applies to
    pub date: NaiveDate,
    /// Predicted daily total
    pub amount: f64,
}

/// Stateless forecaster: aggregate, fit ARIMA(1,1,1), project 30 days.
///
/// The service holds no data, so a single instance can be shared by every
/// request.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForecastService;

impl ForecastService {
    /// Create the service
    pub fn new() -> Self {
        Self
    }

    /// Forecast the next 30 days of daily totals.
    ///
    /// The returned dates start the day after the local date at the time of
    /// the call, whatever range the records cover.
    pub fn forecast(&self, records: &[TransactionRecord]) -> Result<Vec<ForecastPoint>> {
        self.forecast_from(records, Local::now().date_naive())
    }

    /// Same as [`ForecastService::forecast`] with an explicit current date
    pub fn forecast_from(
        &self,
        records: &[TransactionRecord],
        today: NaiveDate,
    ) -> Result<Vec<ForecastPoint>> {
        if records.is_empty() {
            return Err(ForecastError::no_data());
        }

        let series = DailySeries::from_records(records)?;
        debug!(
            records = records.len(),
            days = series.len(),
            start = %series.start(),
            end = %series.end(),
            "Aggregated daily series"
        );

        let (p, d, q) = ARIMA_ORDER;
        let trained = Arima::new(p, d, q)?.train(&series)?;
        let forecast = trained.forecast(FORECAST_HORIZON)?;
        let dates = forecast_dates(today, FORECAST_HORIZON)?;

        Ok(dates
            .into_iter()
            .zip(forecast.into_values())
            .map(|(date, amount)| ForecastPoint { date, amount })
            .collect())
    }

    /// Decode a JSON array of records and forecast from it
    pub fn forecast_json(&self, data: &Value) -> Result<Vec<ForecastPoint>> {
        let records = TransactionRecord::parse_all(data)?;
        self.forecast(&records)
    }

    /// Handle a full request body of the form `{"data": [...]}`.
    ///
    /// A missing or empty `data` field (`null`, `[]`, `{}`, `""`, `0`, `false`)
    /// is a validation failure; anything else that cannot be decoded is a
    /// processing failure.
    pub fn forecast_request(&self, body: &Value) -> Result<Vec<ForecastPoint>> {
        let fields = body.as_object().ok_or_else(|| {
            ForecastError::DataError(format!("Request body must be a JSON object, got {}", body))
        })?;

        match fields.get("data") {
            Some(data) if !is_blank(data) => self.forecast_json(data),
            _ => Err(ForecastError::no_data()),
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}
