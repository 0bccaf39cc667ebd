//! Forecasting models for monthly sales series

use crate::aggregate::MonthlySeries;
use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// ARIMA model order `(p, d, q)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArimaOrder {
    /// AR order (p)
    pub p: usize,
    /// Differencing order (d)
    pub d: usize,
    /// MA order (q)
    pub q: usize,
}

impl ArimaOrder {
    pub const fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }

    /// Number of estimated coefficients, including the constant when present
    pub fn parameter_count(&self) -> usize {
        self.p + self.q + usize::from(self.has_constant())
    }

    /// A mean term is only estimated for undifferenced series
    pub fn has_constant(&self) -> bool {
        self.d == 0
    }

    /// Check the order against the supported ranges
    pub fn validate(&self) -> Result<()> {
        if self.p + self.q == 0 {
            return Err(ForecastError::InvalidParameter(format!(
                "ARIMA{} has no AR or MA terms",
                self
            )));
        }
        if self.p > 12 || self.q > 12 {
            return Err(ForecastError::InvalidParameter(format!(
                "ARIMA{}: AR and MA orders must be <= 12",
                self
            )));
        }
        if self.d > 2 {
            return Err(ForecastError::InvalidParameter(format!(
                "ARIMA{}: differencing order must be <= 2",
                self
            )));
        }
        Ok(())
    }
}

impl Default for ArimaOrder {
    fn default() -> Self {
        Self::new(5, 1, 0)
    }
}

impl fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.p, self.d, self.q)
    }
}

impl FromStr for ArimaOrder {
    type Err = ForecastError;

    /// Parse `"p,d,q"`, optionally wrapped in parentheses
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim().trim_start_matches('(').trim_end_matches(')');
        let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(ForecastError::InvalidParameter(format!(
                "Model order must look like 'p,d,q', got '{}'",
                s
            )));
        }

        let mut values = [0usize; 3];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part.parse().map_err(|_| {
                ForecastError::InvalidParameter(format!(
                    "Model order component '{}' is not a non-negative integer",
                    part
                ))
            })?;
        }

        let order = Self::new(values[0], values[1], values[2]);
        order.validate()?;
        Ok(order)
    }
}

/// How the coefficients of a fitted model were obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimationMethod {
    /// Conditional least squares on lagged values
    ConditionalLeastSquares,
    /// Yule-Walker equations solved with Levinson-Durbin
    YuleWalker,
    /// Two-stage regression on lagged values and long-AR residuals
    HannanRissanen,
}

impl fmt::Display for EstimationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EstimationMethod::ConditionalLeastSquares => "conditional least squares",
            EstimationMethod::YuleWalker => "Yule-Walker",
            EstimationMethod::HannanRissanen => "Hannan-Rissanen",
        };
        f.write_str(name)
    }
}

/// Numerical issue noticed while fitting, kept with the result
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FitWarning {
    /// Fewer regression rows than needed for least squares
    ShortSeries { observations: usize, parameters: usize },
    /// Least squares produced a singular system
    SingularRegression { detail: String },
    /// Least squares estimate lies outside the stationary region
    NonStationaryEstimate { coefficients: Vec<f64> },
    /// Estimation switched to another method
    FellBack { from: EstimationMethod, to: EstimationMethod },
}

impl fmt::Display for FitWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitWarning::ShortSeries {
                observations,
                parameters,
            } => write!(
                f,
                "{} regression rows cannot support {} parameters",
                observations, parameters
            ),
            FitWarning::SingularRegression { detail } => {
                write!(f, "singular regression: {}", detail)
            }
            FitWarning::NonStationaryEstimate { coefficients } => {
                write!(f, "non-stationary AR estimate {:?}", coefficients)
            }
            FitWarning::FellBack { from, to } => write!(f, "fell back from {} to {}", from, to),
        }
    }
}

/// Summary of a fitted model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitReport {
    /// Model order
    pub order: ArimaOrder,
    /// Estimation method that produced the coefficients
    pub method: EstimationMethod,
    /// AR coefficients
    pub ar_coefficients: Vec<f64>,
    /// MA coefficients
    pub ma_coefficients: Vec<f64>,
    /// Constant term on the differenced scale
    pub constant: f64,
    /// Innovation variance
    pub sigma2: f64,
    /// Observations of the differenced series used for estimation
    pub observations: usize,
    /// Conditional AIC, `n * ln(sigma2) + 2k`
    pub aic: f64,
    /// Warnings captured while fitting
    pub warnings: Vec<FitWarning>,
}

impl FitReport {
    /// Serialize the report as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            ForecastError::InvalidParameter(format!("Fit report is not serializable: {}", e))
        })
    }
}

/// Forecast result containing predicted values
#[derive(Debug, Clone)]
pub struct ForecastResult {
    /// Forecasted values
    values: Vec<f64>,
    /// Prediction intervals (lower, upper), one per value
    intervals: Vec<(f64, f64)>,
}

impl ForecastResult {
    /// Create a new forecast result with prediction intervals
    pub fn new_with_intervals(values: Vec<f64>, intervals: Vec<(f64, f64)>) -> Result<Self> {
        if values.len() != intervals.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "Values length ({}) doesn't match intervals length ({})",
                values.len(),
                intervals.len()
            )));
        }

        Ok(Self { values, intervals })
    }

    /// Get the forecasted values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the prediction intervals
    pub fn intervals(&self) -> &[(f64, f64)] {
        &self.intervals
    }

    /// Get the number of periods forecasted
    pub fn horizons(&self) -> usize {
        self.values.len()
    }
}

/// Trained forecast model
pub trait TrainedForecastModel: fmt::Debug {
    /// Generate forecast for future periods at the given confidence level
    fn forecast(&self, horizon: usize, confidence_level: f64) -> Result<ForecastResult>;

    /// Diagnostics of the fit
    fn report(&self) -> &FitReport;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be trained on a monthly series
pub trait ForecastModel: fmt::Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model on the series values
    fn train(&self, data: &MonthlySeries) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

pub mod arima;
