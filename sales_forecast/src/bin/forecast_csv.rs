//! Forecast the next 30 days from a CSV file of `date,amount` transactions.
//!
//! Prints the forecast as JSON on stdout, in the same shape the HTTP API returns.

use sales_forecast::{ForecastError, ForecastService, TransactionLoader};
use std::env;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn run(path: &str) -> Result<String, ForecastError> {
    let records = TransactionLoader::from_csv(path)?;
    tracing::info!(path, records = records.len(), "Loaded transactions");

    let points = ForecastService::new().forecast(&records)?;
    serde_json::to_string_pretty(&points).map_err(|e| ForecastError::DataError(e.to_string()))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "sales_forecast=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let Some(path) = env::args().nth(1) else {
        eprintln!("usage: forecast_csv <transactions.csv>");
        return ExitCode::from(2);
    };

    match run(&path) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
            ExitCode::FAILURE
        }
    }
}
