//! Error types for the sales_forecast crate

use crate::models::{ArimaOrder, FitWarning};
use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Custom error types for the sales_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// A source row could not be parsed or holds an unusable value
    #[error("Malformed input at row {row}: {reason}")]
    MalformedInput { row: usize, reason: String },

    /// Too few usable observations to continue
    #[error("Insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// The model could not be estimated
    #[error("Model fit error for ARIMA{order}: {reason}{}", format_warnings(.warnings))]
    ModelFit {
        order: ArimaOrder,
        reason: String,
        warnings: Vec<FitWarning>,
    },

    /// Two consecutive dates are not exactly one calendar month apart
    #[error("Series alignment error: expected {expected}, found {found}")]
    SeriesAlignment { expected: NaiveDate, found: NaiveDate },

    /// Error from IO operations on a source or sink
    #[error("IO error on '{}': {source}", .path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error while assembling configuration layers
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl ForecastError {
    /// Wrap an IO error together with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ForecastError::IoError {
            path: path.into(),
            source,
        }
    }
}

impl From<figment::Error> for ForecastError {
    fn from(err: figment::Error) -> Self {
        ForecastError::ConfigError(err.to_string())
    }
}

fn format_warnings(warnings: &[FitWarning]) -> String {
    if warnings.is_empty() {
        return String::new();
    }
    let joined: Vec<String> = warnings.iter().map(ToString::to_string).collect();
    format!(" (warnings: {})", joined.join("; "))
}
