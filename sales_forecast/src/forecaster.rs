//! Dated forecasts for monthly series

use crate::aggregate::{MonthlySeries, MIN_MONTHLY_POINTS};
use crate::error::{ForecastError, Result};
use crate::models::arima::Arima;
use crate::models::{ArimaOrder, FitReport, ForecastModel, TrainedForecastModel};
use crate::utils::future_period_ends;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

/// Number of months projected by default
pub const DEFAULT_HORIZON: usize = 6;

/// Coverage of the prediction intervals by default
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// One projected month
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    /// Last day of the projected month
    pub period_end: NaiveDate,
    /// Point prediction
    pub sales: f64,
    /// Lower prediction bound
    pub lower: f64,
    /// Upper prediction bound
    pub upper: f64,
}

/// Projected months together with the fit that produced them
#[derive(Debug, Clone)]
pub struct Forecast {
    pub points: Vec<ForecastPoint>,
    pub report: FitReport,
}

impl Forecast {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.period_end).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.sales).collect()
    }
}

/// Fits a model on a contiguous monthly series and dates its projections.
///
/// The model only sees the ordered values, so the series must not skip any
/// calendar month; this is checked before fitting.
#[derive(Debug, Clone)]
pub struct Forecaster<M: ForecastModel = Arima> {
    model: M,
    horizon: usize,
    confidence_level: f64,
}

impl Forecaster<Arima> {
    /// ARIMA forecaster with the given order and horizon
    pub fn arima(order: ArimaOrder, horizon: usize) -> Result<Self> {
        Self::new(Arima::new(order)?, horizon)
    }
}

impl<M: ForecastModel> Forecaster<M> {
    pub fn new(model: M, horizon: usize) -> Result<Self> {
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forecast horizon must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            model,
            horizon,
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
        })
    }

    /// Set the coverage of the prediction intervals
    pub fn with_confidence_level(mut self, confidence_level: f64) -> Result<Self> {
        if !(confidence_level > 0.0 && confidence_level < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "Confidence level must be between 0 and 1, got {}",
                confidence_level
            )));
        }
        self.confidence_level = confidence_level;
        Ok(self)
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Fit once on `series` and project `horizon` months past its last period
    pub fn forecast(&self, series: &MonthlySeries) -> Result<Forecast> {
        let last = series.last_date().ok_or(ForecastError::InsufficientData {
            required: MIN_MONTHLY_POINTS,
            actual: 0,
        })?;
        series.check_contiguous()?;

        let trained = self.model.train(series)?;
        let result = trained.forecast(self.horizon, self.confidence_level)?;
        let dates = future_period_ends(last, self.horizon)?;

        let points: Vec<ForecastPoint> = dates
            .into_iter()
            .zip(result.values())
            .zip(result.intervals())
            .map(|((period_end, &sales), &(lower, upper))| ForecastPoint {
                period_end,
                sales,
                lower,
                upper,
            })
            .collect();

        if points.len() != self.horizon {
            return Err(ForecastError::InvalidParameter(format!(
                "{} produced {} predictions for a horizon of {}",
                trained.name(),
                points.len(),
                self.horizon
            )));
        }

        info!(
            model = trained.name(),
            horizon = self.horizon,
            from = %last,
            "forecast generated"
        );

        Ok(Forecast {
            points,
            report: trained.report().clone(),
        })
    }
}
