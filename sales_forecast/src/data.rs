//! Transaction records and the daily series built from them

use crate::error::{ForecastError, Result};
use crate::utils::parse_date;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// A single dated transaction amount
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Calendar date of the transaction
    pub date: NaiveDate,
    /// Signed transaction amount
    pub amount: f64,
}

impl TransactionRecord {
    /// Create a new transaction record
    pub fn new(date: NaiveDate, amount: f64) -> Self {
        Self { date, amount }
    }

    /// Decode one record from an undecoded JSON value.
    ///
    /// `index` is the record's position in the request and only shows up in
    /// error messages.
    pub fn from_json(index: usize, value: &Value) -> Result<Self> {
        let fields = value.as_object().ok_or_else(|| {
            ForecastError::DataError(format!(
                "Record {} must be an object with 'date' and 'amount', got {}",
                index, value
            ))
        })?;

        let date = match fields.get("date") {
            Some(Value::String(raw)) => parse_date(raw)?,
            Some(other) => {
                return Err(ForecastError::DataError(format!(
                    "Record {} has a non-string date: {}",
                    index, other
                )))
            }
            None => {
                return Err(ForecastError::DataError(format!(
                    "Record {} is missing 'date'",
                    index
                )))
            }
        };

        let amount = match fields.get("amount") {
            Some(Value::Number(number)) => number.as_f64().ok_or_else(|| {
                ForecastError::DataError(format!(
                    "Record {} has an amount that does not fit a float: {}",
                    index, number
                ))
            })?,
            Some(other) => {
                return Err(ForecastError::DataError(format!(
                    "Record {} has a non-numeric amount: {}",
                    index, other
                )))
            }
            None => {
                return Err(ForecastError::DataError(format!(
                    "Record {} is missing 'amount'",
                    index
                )))
            }
        };

        Ok(Self { date, amount })
    }

    /// Decode a JSON array of records
    pub fn parse_all(data: &Value) -> Result<Vec<Self>> {
        let items = data.as_array().ok_or_else(|| {
            ForecastError::DataError(format!("'data' must be an array of records, got {}", data))
        })?;

        items
            .iter()
            .enumerate()
            .map(|(index, item)| Self::from_json(index, item))
            .collect()
    }
}

/// Gap-free daily totals spanning the earliest to the latest transaction date
#[derive(Debug, Clone, PartialEq)]
pub struct DailySeries {
    start: NaiveDate,
    values: Vec<f64>,
}

impl DailySeries {
    /// Sum records per calendar date and zero-fill the days in between
    pub fn from_records(records: &[TransactionRecord]) -> Result<Self> {
        if records.is_empty() {
            return Err(ForecastError::no_data());
        }

        let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for record in records {
            *totals.entry(record.date).or_insert(0.0) += record.amount;
        }

        // BTreeMap is non-empty here, keys are sorted
        let (start, end) = match (totals.keys().next(), totals.keys().next_back()) {
            (Some(&start), Some(&end)) => (start, end),
            _ => return Err(ForecastError::no_data()),
        };

        let span = (end - start).num_days() as usize + 1;
        let values = start
            .iter_days()
            .take(span)
            .map(|day| totals.get(&day).copied().unwrap_or(0.0))
            .collect();

        Ok(Self { start, values })
    }

    /// First day of the series
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the series
    pub fn end(&self) -> NaiveDate {
        self.start + Days::new(self.values.len().saturating_sub(1) as u64)
    }

    /// Number of days covered
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Daily totals in date order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Total for a given day, if it falls inside the series
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        let offset = (date - self.start).num_days();
        if offset < 0 {
            return None;
        }
        self.values.get(offset as usize).copied()
    }

    /// Iterate over `(date, total)` pairs in ascending date order
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.start
            .iter_days()
            .zip(self.values.iter().copied())
    }

    /// Collect the series into a date-keyed map
    pub fn to_map(&self) -> BTreeMap<NaiveDate, f64> {
        self.iter().collect()
    }
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: String,
    amount: f64,
}

/// Loader for transaction records stored as CSV
#[derive(Debug)]
pub struct TransactionLoader;

impl TransactionLoader {
    /// Load transaction records from a CSV file with `date` and `amount` columns
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<TransactionRecord>> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Load transaction records from any CSV source
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<TransactionRecord>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut records = Vec::new();
        for row in csv_reader.deserialize::<CsvRow>() {
            let row = row?;
            records.push(TransactionRecord::new(parse_date(&row.date)?, row.amount));
        }

        Ok(records)
    }
}
