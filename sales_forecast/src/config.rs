//! Pipeline configuration
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `SALES_FORECAST_*` environment variables. Nested keys use a double
//! underscore, e.g. `SALES_FORECAST_ORDER__P=3`.

use crate::aggregate::TrimPolicy;
use crate::data::{RecordCleaner, DEFAULT_CANCELLATION_PREFIX};
use crate::error::{ForecastError, Result};
use crate::forecaster::{DEFAULT_CONFIDENCE_LEVEL, DEFAULT_HORIZON};
use crate::models::ArimaOrder;
use crate::utils::DEFAULT_TIMESTAMP_FORMATS;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix of environment variables read by [`PipelineConfig::load`]
pub const ENV_PREFIX: &str = "SALES_FORECAST_";

/// Everything one pipeline run needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Transaction CSV to read
    pub input: Option<PathBuf>,
    /// Destination of the composed `Date,Sales,Type` CSV
    pub output: PathBuf,
    /// Optional destination of the JSON fit report
    pub report: Option<PathBuf>,
    /// Months to project
    pub horizon: usize,
    /// ARIMA order
    pub order: ArimaOrder,
    /// Coverage of the prediction intervals
    pub confidence_level: f64,
    /// Invoice prefix of cancelled orders
    pub cancellation_prefix: String,
    /// Handling of the trailing, possibly incomplete month
    pub trim: TrimPolicy,
    /// Accepted `InvoiceDate` formats, tried in order
    pub timestamp_formats: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: None,
            output: PathBuf::from("forecast_output.csv"),
            report: None,
            horizon: DEFAULT_HORIZON,
            order: ArimaOrder::default(),
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            cancellation_prefix: DEFAULT_CANCELLATION_PREFIX.to_string(),
            trim: TrimPolicy::default(),
            timestamp_formats: DEFAULT_TIMESTAMP_FORMATS
                .iter()
                .map(|f| f.to_string())
                .collect(),
        }
    }
}

impl PipelineConfig {
    /// Merge defaults, an optional TOML file and the environment
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(PipelineConfig::default()));
        if let Some(path) = file {
            if !path.exists() {
                return Err(ForecastError::io(
                    path,
                    std::io::Error::new(std::io::ErrorKind::NotFound, "config file not found"),
                ));
            }
            figment = figment.merge(Toml::file(path));
        }
        let config: PipelineConfig = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from TOML text layered over the defaults
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let config: PipelineConfig = Figment::from(Serialized::defaults(PipelineConfig::default()))
            .merge(Toml::string(toml))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Check ranges that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "horizon must be at least 1".to_string(),
            ));
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "confidence_level must be between 0 and 1, got {}",
                self.confidence_level
            )));
        }
        self.order.validate()?;
        self.cleaner().map(|_| ())
    }

    /// Record cleaner configured from these settings
    pub fn cleaner(&self) -> Result<RecordCleaner> {
        RecordCleaner::new(
            self.cancellation_prefix.clone(),
            self.timestamp_formats.clone(),
        )
    }
}
