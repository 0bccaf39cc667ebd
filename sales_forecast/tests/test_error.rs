use chrono::NaiveDate;
use sales_forecast::error::ForecastError;
use sales_forecast::models::{ArimaOrder, EstimationMethod, FitWarning};
use std::error::Error;
use std::io;

#[test]
fn test_io_error_keeps_path_and_source() {
    let error = ForecastError::io(
        "data/online_retail.csv",
        io::Error::new(io::ErrorKind::NotFound, "file not found"),
    );

    let message = error.to_string();
    assert!(message.contains("data/online_retail.csv"));
    assert!(message.contains("file not found"));
    assert!(error.source().is_some());
}

#[test]
fn test_error_display() {
    let error = ForecastError::MalformedInput {
        row: 17,
        reason: "unparseable InvoiceDate".to_string(),
    };
    assert_eq!(
        error.to_string(),
        "Malformed input at row 17: unparseable InvoiceDate"
    );

    let error = ForecastError::InsufficientData {
        required: 2,
        actual: 1,
    };
    assert_eq!(
        error.to_string(),
        "Insufficient data: need at least 2 observations, got 1"
    );

    let error = ForecastError::SeriesAlignment {
        expected: NaiveDate::from_ymd_opt(2011, 6, 30).unwrap(),
        found: NaiveDate::from_ymd_opt(2011, 7, 31).unwrap(),
    };
    assert_eq!(
        error.to_string(),
        "Series alignment error: expected 2011-06-30, found 2011-07-31"
    );

    let error = ForecastError::InvalidParameter("horizon must be at least 1".to_string());
    assert_eq!(
        error.to_string(),
        "Invalid parameter: horizon must be at least 1"
    );
}

#[test]
fn test_model_fit_error_lists_warnings() {
    let error = ForecastError::ModelFit {
        order: ArimaOrder::new(5, 1, 0),
        reason: "series is constant".to_string(),
        warnings: vec![FitWarning::FellBack {
            from: EstimationMethod::ConditionalLeastSquares,
            to: EstimationMethod::YuleWalker,
        }],
    };

    let message = error.to_string();
    assert!(message.starts_with("Model fit error for ARIMA(5,1,0): series is constant"));
    assert!(message.contains("fell back from conditional least squares to Yule-Walker"));
}

#[test]
fn test_model_fit_error_without_warnings() {
    let error = ForecastError::ModelFit {
        order: ArimaOrder::new(1, 1, 0),
        reason: "series is constant".to_string(),
        warnings: Vec::new(),
    };
    assert_eq!(
        error.to_string(),
        "Model fit error for ARIMA(1,1,0): series is constant"
    );
}

#[test]
fn test_config_error_conversion() {
    let figment_error = figment::Figment::new()
        .extract_inner::<usize>("horizon")
        .unwrap_err();
    let error = ForecastError::from(figment_error);

    match error {
        ForecastError::ConfigError(message) => assert!(message.contains("horizon")),
        other => panic!("Expected ConfigError, got {:?}", other),
    }
}
