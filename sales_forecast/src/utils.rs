//! Utility functions for the sales_forecast crate

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];
const OFFSET_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M%#z",
];
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a calendar date from the formats clients send.
///
/// Accepts ISO 8601 dates in extended or basic form, ISO 8601 date-times with
/// minute or second precision (with or without a `Z`/offset suffix, `T` or
/// space separator), slash-separated dates and `YYYY-MM` month labels, which
/// resolve to the first day of the month. Time of day is discarded; an offset
/// timestamp keeps the calendar date written in it.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let s = input.trim();

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Ok(date);
        }
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(s) {
        return Ok(timestamp.date_naive());
    }

    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(timestamp) = DateTime::parse_from_str(s, format) {
            return Ok(timestamp.date_naive());
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(timestamp.date());
        }
    }

    // Month labels
    if s.matches('-').count() == 1 {
        if let Ok(date) = NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d") {
            return Ok(date);
        }
    }

    Err(ForecastError::DataError(format!(
        "Unable to parse '{}' as a date",
        input
    )))
}

/// Dates labelling a forecast: the `horizon` days following `today`
pub fn forecast_dates(today: NaiveDate, horizon: usize) -> Result<Vec<NaiveDate>> {
    (1..=horizon as u64)
        .map(|offset| {
            today.checked_add_days(Days::new(offset)).ok_or_else(|| {
                ForecastError::DataError(format!(
                    "Forecast date {} days after {} is out of range",
                    offset, today
                ))
            })
        })
        .collect()
}

/// Apply `order` rounds of first differencing
pub fn difference(data: &[f64], order: usize) -> Vec<f64> {
    let mut result = data.to_vec();
    for _ in 0..order {
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Last value of the series at each differencing level below `order`.
///
/// `tails[k]` is the final element of the `k`-times differenced series; these
/// are the anchors needed to undo the differencing of a forecast.
pub fn difference_tails(data: &[f64], order: usize) -> Vec<f64> {
    let mut tails = Vec::with_capacity(order);
    let mut level = data.to_vec();
    for _ in 0..order {
        match level.last() {
            Some(&last) => tails.push(last),
            None => break,
        }
        level = difference(&level, 1);
    }
    tails
}

/// Undo differencing by cumulative summation anchored at `tails`
pub fn integrate(diffs: &[f64], tails: &[f64]) -> Vec<f64> {
    let mut result = diffs.to_vec();
    for &anchor in tails.iter().rev() {
        let mut level = anchor;
        for value in result.iter_mut() {
            level += *value;
            *value = level;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrate_inverts_difference() {
        let data = vec![3.0, 5.0, 4.0, 8.0, 13.0, 12.0];
        let head = &data[..4];
        let tail = &data[4..];

        let tails = difference_tails(head, 2);
        let diffs = difference(&data, 2);
        let restored = integrate(&diffs[diffs.len() - tail.len()..], &tails);

        assert_eq!(restored, tail.to_vec());
    }

    #[test]
    fn test_difference_tails_short_series() {
        assert_eq!(difference_tails(&[7.0], 2), vec![7.0]);
        assert!(difference_tails(&[], 1).is_empty());
    }
}
