//! ARIMA models for monthly sales forecasting
//!
//! Coefficients are estimated on the differenced series `w = Δ^d y`:
//!
//! - pure AR orders use conditional least squares, falling back to
//!   Yule-Walker when the regression is short, singular or non-stationary;
//! - orders with MA terms use the Hannan-Rissanen two-stage regression.
//!
//! Every issue met on the way is kept as a [`FitWarning`] in the
//! [`FitReport`] instead of being silenced.

use crate::aggregate::MonthlySeries;
use crate::error::{ForecastError, Result};
use crate::models::{
    ArimaOrder, EstimationMethod, FitReport, FitWarning, ForecastModel, ForecastResult,
    TrainedForecastModel,
};
use series_math::{
    autocovariance, difference, integrate, is_stationary, levinson_durbin, psi_weights,
    solve_least_squares, MathError,
};
use statrs::distribution::{ContinuousCDF, Normal};
use std::fmt::Display;
use tracing::{debug, info, warn};

/// ARIMA model (AutoRegressive Integrated Moving Average)
#[derive(Debug, Clone)]
pub struct Arima {
    /// Name of the model
    name: String,
    /// Model order
    order: ArimaOrder,
}

/// Trained ARIMA model
#[derive(Debug, Clone)]
pub struct TrainedArima {
    /// Name of the model
    name: String,
    /// Series the model was fitted on
    history: Vec<f64>,
    /// `history` differenced `d` times
    differenced: Vec<f64>,
    /// In-sample innovations on the differenced scale
    residuals: Vec<f64>,
    /// Coefficients and diagnostics
    report: FitReport,
}

/// Coefficients produced by one estimation method
struct Estimate {
    method: EstimationMethod,
    ar: Vec<f64>,
    ma: Vec<f64>,
    constant: f64,
    sigma2: f64,
}

impl Arima {
    /// Create a new ARIMA model
    pub fn new(order: ArimaOrder) -> Result<Self> {
        order.validate()?;
        Ok(Self {
            name: format!("ARIMA{}", order),
            order,
        })
    }

    /// Get the model order
    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    /// Fit the model on an ordered value sequence
    pub fn fit_values(&self, values: &[f64]) -> Result<TrainedArima> {
        let order = self.order;
        let required = order.d + 1;
        if values.len() < required {
            return Err(ForecastError::InsufficientData {
                required,
                actual: values.len(),
            });
        }
        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            return Err(self.fit_error(
                format!("value {} at step {} is not finite", values[pos], pos),
                &[],
            ));
        }
        if values.windows(2).all(|w| w[0] == w[1]) {
            return Err(self.fit_error("series is constant", &[]));
        }

        let differenced = difference(values, order.d);
        if differenced.iter().all(|v| *v == 0.0) {
            return Err(self.fit_error(
                format!("series differenced {} time(s) has zero variance", order.d),
                &[],
            ));
        }

        let mut warnings = Vec::new();
        let estimate = if order.q == 0 {
            self.estimate_ar(&differenced, &mut warnings)?
        } else {
            self.estimate_hannan_rissanen(&differenced, &warnings)?
        };

        let residuals =
            conditional_residuals(&differenced, &estimate.ar, &estimate.ma, estimate.constant);
        let observations = differenced.len();
        let aic = if estimate.sigma2 > 0.0 {
            let k = (order.parameter_count() + 1) as f64;
            observations as f64 * estimate.sigma2.ln() + 2.0 * k
        } else {
            f64::NEG_INFINITY
        };

        for warning in &warnings {
            warn!(model = %self.name, %warning, "fit warning");
        }
        info!(
            model = %self.name,
            method = %estimate.method,
            sigma2 = estimate.sigma2,
            observations,
            "fitted model"
        );
        debug!(ar = ?estimate.ar, ma = ?estimate.ma, constant = estimate.constant, "coefficients");

        Ok(TrainedArima {
            name: self.name.clone(),
            history: values.to_vec(),
            differenced,
            residuals,
            report: FitReport {
                order,
                method: estimate.method,
                ar_coefficients: estimate.ar,
                ma_coefficients: estimate.ma,
                constant: estimate.constant,
                sigma2: estimate.sigma2,
                observations,
                aic,
                warnings,
            },
        })
    }

    /// Conditional least squares with a Yule-Walker fallback
    fn estimate_ar(&self, w: &[f64], warnings: &mut Vec<FitWarning>) -> Result<Estimate> {
        let p = self.order.p;
        let with_constant = self.order.has_constant();
        let parameters = self.order.parameter_count();
        let rows = w.len().saturating_sub(p);

        if rows > parameters {
            let (design, target) = lagged_design(w, p, &[], 0, p, with_constant);
            match solve_least_squares(&design, &target) {
                Ok(fit) => {
                    let (ar, constant) = split_constant(fit.coefficients, p, with_constant);
                    if is_stationary(&ar) {
                        return Ok(Estimate {
                            method: EstimationMethod::ConditionalLeastSquares,
                            ar,
                            ma: Vec::new(),
                            constant,
                            sigma2: fit.ssr / rows as f64,
                        });
                    }
                    warnings.push(FitWarning::NonStationaryEstimate { coefficients: ar });
                }
                Err(MathError::Singular(detail)) => {
                    warnings.push(FitWarning::SingularRegression { detail });
                }
                Err(e) => return Err(self.fit_error(e, warnings)),
            }
        } else {
            warnings.push(FitWarning::ShortSeries {
                observations: rows,
                parameters,
            });
        }

        warnings.push(FitWarning::FellBack {
            from: EstimationMethod::ConditionalLeastSquares,
            to: EstimationMethod::YuleWalker,
        });
        self.estimate_yule_walker(w, warnings)
    }

    fn estimate_yule_walker(&self, w: &[f64], warnings: &[FitWarning]) -> Result<Estimate> {
        let p = self.order.p;
        let with_constant = self.order.has_constant();
        let mean = if with_constant {
            w.iter().sum::<f64>() / w.len() as f64
        } else {
            0.0
        };

        let acov = autocovariance(w, p, with_constant);
        let solution = levinson_durbin(&acov, p).map_err(|e| self.fit_error(e, warnings))?;
        let constant = mean * (1.0 - solution.coefficients.iter().sum::<f64>());

        Ok(Estimate {
            method: EstimationMethod::YuleWalker,
            ar: solution.coefficients,
            ma: Vec::new(),
            constant,
            sigma2: solution.prediction_error,
        })
    }

    /// Long AR for innovations, then regression on lagged values and innovations
    fn estimate_hannan_rissanen(&self, w: &[f64], warnings: &[FitWarning]) -> Result<Estimate> {
        let ArimaOrder { p, q, .. } = self.order;
        let with_constant = self.order.has_constant();
        let n = w.len();
        let long_order = (p + q + 1).min(n.saturating_sub(1)).max(1);

        let mean = if with_constant {
            w.iter().sum::<f64>() / n as f64
        } else {
            0.0
        };
        let acov = autocovariance(w, long_order, with_constant);
        let long_ar = levinson_durbin(&acov, long_order).map_err(|e| self.fit_error(e, warnings))?;

        let mut innovations = vec![0.0; n];
        for t in long_order..n {
            let predicted: f64 = long_ar
                .coefficients
                .iter()
                .enumerate()
                .map(|(i, a)| a * (w[t - 1 - i] - mean))
                .sum();
            innovations[t] = w[t] - mean - predicted;
        }

        // lagged innovations are only available once the long AR has warmed up
        let start = (long_order + q).max(p);
        let rows = n.saturating_sub(start);
        let parameters = self.order.parameter_count();
        if rows <= parameters {
            return Err(self.fit_error(
                format!(
                    "{} regression rows cannot support {} parameters with MA terms",
                    rows, parameters
                ),
                warnings,
            ));
        }

        let (design, target) = lagged_design(w, p, &innovations, q, start, with_constant);
        let fit = solve_least_squares(&design, &target).map_err(|e| self.fit_error(e, warnings))?;
        let mut coefficients = fit.coefficients;
        let constant = if with_constant {
            coefficients.pop().unwrap_or(0.0)
        } else {
            0.0
        };
        let ma = coefficients.split_off(p);
        let ar = coefficients;

        if !is_stationary(&ar) {
            return Err(self.fit_error(
                format!("non-stationary AR estimate {:?}", ar),
                warnings,
            ));
        }

        Ok(Estimate {
            method: EstimationMethod::HannanRissanen,
            ar,
            ma,
            constant,
            sigma2: fit.ssr / rows as f64,
        })
    }

    fn fit_error(&self, reason: impl Display, warnings: &[FitWarning]) -> ForecastError {
        ForecastError::ModelFit {
            order: self.order,
            reason: reason.to_string(),
            warnings: warnings.to_vec(),
        }
    }
}

impl ForecastModel for Arima {
    type Trained = TrainedArima;

    fn train(&self, data: &MonthlySeries) -> Result<TrainedArima> {
        self.fit_values(&data.values())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedForecastModel for TrainedArima {
    fn forecast(&self, horizon: usize, confidence_level: f64) -> Result<ForecastResult> {
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forecast horizon must be at least 1".to_string(),
            ));
        }
        if !(confidence_level > 0.0 && confidence_level < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "Confidence level must be between 0 and 1, got {}",
                confidence_level
            )));
        }

        let report = &self.report;
        let n = self.differenced.len();
        let mut extended = self.differenced.clone();
        let mut shocks = self.residuals.clone();

        for _ in 0..horizon {
            let t = extended.len();
            let mut next = report.constant;
            for (i, phi) in report.ar_coefficients.iter().enumerate().take(t) {
                next += phi * extended[t - 1 - i];
            }
            for (j, theta) in report.ma_coefficients.iter().enumerate().take(t) {
                next += theta * shocks[t - 1 - j];
            }
            extended.push(next);
            shocks.push(0.0);
        }

        let values = integrate(&extended[n..], &self.history, report.order.d);

        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| ForecastError::InvalidParameter(format!("Normal distribution: {}", e)))?;
        let z = normal.inverse_cdf(0.5 + confidence_level / 2.0);
        let psi = psi_weights(
            &report.ar_coefficients,
            &report.ma_coefficients,
            report.order.d,
            horizon,
        );

        let mut cumulative = 0.0;
        let intervals = values
            .iter()
            .zip(&psi)
            .map(|(value, weight)| {
                cumulative += weight * weight;
                let margin = z * (report.sigma2.max(0.0) * cumulative).sqrt();
                (value - margin, value + margin)
            })
            .collect();

        ForecastResult::new_with_intervals(values, intervals)
    }

    fn report(&self) -> &FitReport {
        &self.report
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedArima {
    /// In-sample innovations on the differenced scale
    pub fn residuals(&self) -> &[f64] {
        &self.residuals
    }
}

/// Regression rows `t = start..n` of `w_t` on `w_{t-1..p}`, `e_{t-1..q}` and an
/// optional trailing constant column.
fn lagged_design(
    w: &[f64],
    p: usize,
    innovations: &[f64],
    q: usize,
    start: usize,
    with_constant: bool,
) -> (Vec<Vec<f64>>, Vec<f64>) {
    let mut design = Vec::with_capacity(w.len().saturating_sub(start));
    let mut target = Vec::with_capacity(w.len().saturating_sub(start));
    for t in start..w.len() {
        let mut row = Vec::with_capacity(p + q + 1);
        row.extend((1..=p).map(|i| w[t - i]));
        row.extend((1..=q).map(|j| innovations[t - j]));
        if with_constant {
            row.push(1.0);
        }
        design.push(row);
        target.push(w[t]);
    }
    (design, target)
}

fn split_constant(mut coefficients: Vec<f64>, p: usize, with_constant: bool) -> (Vec<f64>, f64) {
    let constant = if with_constant && coefficients.len() > p {
        coefficients.pop().unwrap_or(0.0)
    } else {
        0.0
    };
    (coefficients, constant)
}

/// Innovations `e_t = w_t - c - sum(ar * w) - sum(ma * e)`, zero for the
/// first `p` steps where lags are unavailable.
fn conditional_residuals(w: &[f64], ar: &[f64], ma: &[f64], constant: f64) -> Vec<f64> {
    let p = ar.len();
    let mut residuals = vec![0.0; w.len()];
    for t in p..w.len() {
        let mut predicted = constant;
        for (i, phi) in ar.iter().enumerate() {
            predicted += phi * w[t - 1 - i];
        }
        for (j, theta) in ma.iter().enumerate().take(t) {
            predicted += theta * residuals[t - 1 - j];
        }
        residuals[t] = w[t] - predicted;
    }
    residuals
}
