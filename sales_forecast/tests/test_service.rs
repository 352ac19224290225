use chrono::{Days, Local, NaiveDate};
use sales_forecast::{
    ErrorKind, ForecastError, ForecastService, TransactionRecord, ARIMA_ORDER, FORECAST_HORIZON,
};
use serde_json::json;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn weekly_sales() -> Vec<TransactionRecord> {
    (0..45u64)
        .map(|i| {
            let date = ymd(2024, 1, 1) + Days::new(i);
            let amount = 200.0 + 25.0 * ((i % 7) as f64) + i as f64;
            TransactionRecord::new(date, amount)
        })
        .collect()
}

#[test]
fn test_constants() {
    assert_eq!(FORECAST_HORIZON, 30);
    assert_eq!(ARIMA_ORDER, (1, 1, 1));
}

#[test]
fn test_forecast_has_thirty_points() {
    let service = ForecastService::new();
    let points = service.forecast_from(&weekly_sales(), ymd(2024, 6, 1)).unwrap();

    assert_eq!(points.len(), FORECAST_HORIZON);
    assert!(points.iter().all(|p| p.amount.is_finite()));
}

#[test]
fn test_forecast_dates_ignore_input_range() {
    let service = ForecastService::new();
    let today = ymd(2030, 2, 20);

    // Input ends in February 2024, dates still start after `today`
    let points = service.forecast_from(&weekly_sales(), today).unwrap();

    for (offset, point) in points.iter().enumerate() {
        assert_eq!(point.date, today + Days::new(offset as u64 + 1));
    }
    assert_eq!(points[29].date, ymd(2030, 3, 22));
}

#[test]
fn test_forecast_uses_local_clock() {
    let before = Local::now().date_naive();
    let points = ForecastService::new().forecast(&weekly_sales()).unwrap();
    let after = Local::now().date_naive();

    let first = points[0].date;
    assert!(first == before + Days::new(1) || first == after + Days::new(1));
    assert_eq!(points.len(), 30);
}

#[test]
fn test_record_order_does_not_change_forecast() {
    let service = ForecastService::new();
    let today = ymd(2024, 3, 1);
    let records = weekly_sales();
    let mut reversed = records.clone();
    reversed.reverse();

    assert_eq!(
        service.forecast_from(&records, today).unwrap(),
        service.forecast_from(&reversed, today).unwrap()
    );
}

#[test]
fn test_empty_input_is_a_validation_error() {
    let err = ForecastService::new().forecast(&[]).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.to_string(), "No data provided");
}

#[test]
fn test_single_record_is_a_processing_error() {
    let records = vec![TransactionRecord::new(ymd(2024, 1, 1), 100.0)];
    let err = ForecastService::new().forecast(&records).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Processing);
    assert!(err.to_string().contains("Insufficient data"));
}

#[test]
fn test_duplicates_merge_before_fitting() {
    let service = ForecastService::new();
    let today = ymd(2024, 1, 10);

    // {2024-01-01: 15, 2024-01-02: 20} fitted either way
    let split = vec![
        TransactionRecord::new(ymd(2024, 1, 1), 10.0),
        TransactionRecord::new(ymd(2024, 1, 2), 20.0),
        TransactionRecord::new(ymd(2024, 1, 1), 5.0),
    ];
    let merged = vec![
        TransactionRecord::new(ymd(2024, 1, 1), 15.0),
        TransactionRecord::new(ymd(2024, 1, 2), 20.0),
    ];

    let points = service.forecast_from(&split, today).unwrap();
    assert_eq!(points, service.forecast_from(&merged, today).unwrap());
    assert!(points.iter().all(|p| (p.amount - 20.0).abs() < 1e-9));
}

#[test]
fn test_gap_is_zero_filled_before_fitting() {
    let service = ForecastService::new();
    let today = ymd(2024, 1, 10);

    let gapped = vec![
        TransactionRecord::new(ymd(2024, 1, 1), 15.0),
        TransactionRecord::new(ymd(2024, 1, 2), 20.0),
        TransactionRecord::new(ymd(2024, 1, 5), 7.0),
    ];
    let filled = vec![
        TransactionRecord::new(ymd(2024, 1, 1), 15.0),
        TransactionRecord::new(ymd(2024, 1, 2), 20.0),
        TransactionRecord::new(ymd(2024, 1, 3), 0.0),
        TransactionRecord::new(ymd(2024, 1, 4), 0.0),
        TransactionRecord::new(ymd(2024, 1, 5), 7.0),
    ];

    assert_eq!(
        service.forecast_from(&gapped, today).unwrap(),
        service.forecast_from(&filled, today).unwrap()
    );
}

#[test]
fn test_forecast_request_example() {
    let body = json!({
        "data": [
            {"date": "2024-01-01", "amount": 10},
            {"date": "2024-01-02", "amount": 20},
            {"date": "2024-01-01", "amount": 5}
        ]
    });

    let points = ForecastService::new().forecast_request(&body).unwrap();
    assert_eq!(points.len(), 30);
}

#[test]
fn test_forecast_request_without_data() {
    let service = ForecastService::new();

    for body in [
        json!({}),
        json!({"data": null}),
        json!({"data": []}),
        json!({"data": ""}),
        json!({"other": [1, 2, 3]}),
    ] {
        let err = service.forecast_request(&body).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation, "body {}", body);
        assert_eq!(err.to_string(), "No data provided");
    }
}

#[test]
fn test_forecast_request_processing_failures() {
    let service = ForecastService::new();

    let bodies = [
        json!([{"date": "2024-01-01", "amount": 1}]),
        json!({"data": [{"date": "2024-01-01", "amount": "abc"}, {"date": "2024-01-02", "amount": 2}]}),
        json!({"data": [{"date": "someday", "amount": 1}]}),
        json!({"data": "2024-01-01"}),
        json!({"data": [{"date": "2024-01-01", "amount": 100}]}),
    ];

    for body in bodies {
        let err = service.forecast_request(&body).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Processing, "body {}", body);
        assert!(!err.to_string().is_empty());
    }
}

#[test]
fn test_monthly_labels_are_accepted() {
    let data = json!([
        {"date": "2024-01", "amount": 3100},
        {"date": "2024-02", "amount": 2900},
        {"date": "2024-03", "amount": 3300},
        {"date": "2024-04", "amount": 3500}
    ]);

    let points = ForecastService::new().forecast_json(&data).unwrap();
    assert_eq!(points.len(), 30);
}

#[test]
fn test_forecast_point_serialization() {
    let service = ForecastService::new();
    let points = service.forecast_from(&weekly_sales(), ymd(2024, 12, 31)).unwrap();

    let value = serde_json::to_value(&points).unwrap();
    let array = value.as_array().unwrap();
    assert_eq!(array.len(), 30);
    assert_eq!(array[0]["date"], "2025-01-01");
    assert!(array[0]["amount"].is_f64());
}

#[test]
fn test_errors_are_not_panics_for_odd_amounts() {
    let records = vec![
        TransactionRecord::new(ymd(2024, 1, 1), -500.0),
        TransactionRecord::new(ymd(2024, 1, 2), 0.0),
        TransactionRecord::new(ymd(2024, 1, 3), 1e12),
    ];

    let result = ForecastService::new().forecast(&records);
    match result {
        Ok(points) => assert_eq!(points.len(), 30),
        Err(ForecastError::ModelError(message)) => assert!(!message.is_empty()),
        Err(other) => panic!("unexpected error: {}", other),
    }
}
