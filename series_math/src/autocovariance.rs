//! Sample autocovariance and the Levinson-Durbin recursion
//!
//! The autocovariance uses the biased estimator (divides by `n`), so the
//! resulting Toeplitz matrix is positive definite for any series that is not
//! identically zero. Yule-Walker estimates built on it are always stationary.

use crate::{MathError, Result};

/// Solution of the Yule-Walker equations for a given order
#[derive(Debug, Clone, PartialEq)]
pub struct LevinsonResult {
    /// AR coefficients `phi_1..phi_p`
    pub coefficients: Vec<f64>,
    /// Partial autocorrelations produced at each step
    pub reflection: Vec<f64>,
    /// One-step prediction error variance at the final order
    pub prediction_error: f64,
}

/// Biased sample autocovariance for lags `0..=max_lag`.
///
/// When `demean` is false the raw second moments are used, which is the
/// right choice for a zero-mean model. Lags at or beyond the series length
/// are zero.
pub fn autocovariance(series: &[f64], max_lag: usize, demean: bool) -> Vec<f64> {
    let n = series.len();
    let mut acov = vec![0.0; max_lag + 1];
    if n == 0 {
        return acov;
    }

    let mean = if demean {
        series.iter().sum::<f64>() / n as f64
    } else {
        0.0
    };

    for (lag, slot) in acov.iter_mut().enumerate() {
        if lag >= n {
            break;
        }
        let sum: f64 = (lag..n)
            .map(|t| (series[t] - mean) * (series[t - lag] - mean))
            .sum();
        *slot = sum / n as f64;
    }

    acov
}

/// Solve the Yule-Walker equations of order `order` with Levinson-Durbin.
///
/// `acov` must contain at least `order + 1` lags.
pub fn levinson_durbin(acov: &[f64], order: usize) -> Result<LevinsonResult> {
    if acov.len() < order + 1 {
        return Err(MathError::InsufficientData(format!(
            "Levinson-Durbin of order {} needs {} autocovariance lags, got {}",
            order,
            order + 1,
            acov.len()
        )));
    }

    let r0 = acov[0];
    if !r0.is_finite() || r0 <= 0.0 {
        return Err(MathError::InvalidInput(format!(
            "Series variance must be positive and finite, got {}",
            r0
        )));
    }

    let mut phi = vec![0.0; order];
    let mut reflection = Vec::with_capacity(order);
    let mut error = r0;

    for k in 1..=order {
        let mut acc = acov[k];
        for j in 1..k {
            acc -= phi[j - 1] * acov[k - j];
        }
        let kappa = acc / error;

        if !kappa.is_finite() || kappa.abs() >= 1.0 {
            return Err(MathError::CalculationError(format!(
                "Reflection coefficient {} at lag {} is outside (-1, 1)",
                kappa, k
            )));
        }

        let previous = phi.clone();
        phi[k - 1] = kappa;
        for j in 1..k {
            phi[j - 1] = previous[j - 1] - kappa * previous[k - j - 1];
        }

        error *= 1.0 - kappa * kappa;
        if error.is_nan() || error <= 0.0 {
            return Err(MathError::CalculationError(format!(
                "Prediction error variance collapsed to {} at lag {}",
                error, k
            )));
        }
        reflection.push(kappa);
    }

    Ok(LevinsonResult {
        coefficients: phi,
        reflection,
        prediction_error: error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_autocovariance_without_demeaning() {
        let acov = autocovariance(&[10.0, -5.0, 15.0, 10.0], 5, false);
        assert_relative_eq!(acov[0], 112.5);
        assert_relative_eq!(acov[1], 6.25);
        assert_relative_eq!(acov[2], 25.0);
        assert_relative_eq!(acov[3], 25.0);
        assert_eq!(acov[4], 0.0);
        assert_eq!(acov[5], 0.0);
    }

    #[test]
    fn test_autocovariance_demeaned_constant_is_zero() {
        let acov = autocovariance(&[3.0, 3.0, 3.0], 1, true);
        assert_eq!(acov, vec![0.0, 0.0]);
    }

    #[test]
    fn test_levinson_order_one_matches_lag_one_correlation() {
        let acov = [2.0, 1.0];
        let result = levinson_durbin(&acov, 1).unwrap();
        assert_relative_eq!(result.coefficients[0], 0.5);
        assert_relative_eq!(result.prediction_error, 1.5);
    }

    #[test]
    fn test_levinson_recovers_ar2_from_theoretical_autocovariance() {
        // AR(2) with phi = (0.5, 0.3): rho1 = phi1 / (1 - phi2), rho2 = phi1 * rho1 + phi2
        let rho1 = 0.5 / 0.7;
        let rho2 = 0.5 * rho1 + 0.3;
        let result = levinson_durbin(&[1.0, rho1, rho2], 2).unwrap();
        assert_relative_eq!(result.coefficients[0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(result.coefficients[1], 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_levinson_rejects_zero_variance() {
        let err = levinson_durbin(&[0.0, 0.0], 1).unwrap_err();
        assert!(matches!(err, MathError::InvalidInput(_)));
    }

    #[test]
    fn test_levinson_short_series_yields_stationary_fit() {
        let acov = autocovariance(&[10.0, -5.0, 15.0, 10.0], 5, false);
        let result = levinson_durbin(&acov, 5).unwrap();
        assert_eq!(result.coefficients.len(), 5);
        assert!(result.reflection.iter().all(|k| k.abs() < 1.0));
        assert!(result.prediction_error > 0.0);
    }
}
