//! # Series Math
//!
//! Numerical building blocks for fitting autoregressive integrated models.
//! This crate provides differencing, sample moments, linear solvers and the
//! Levinson-Durbin recursion used by the forecasting pipeline.

use thiserror::Error;

pub mod autocovariance;
pub mod differencing;
pub mod least_squares;
pub mod polynomial;

pub use autocovariance::{autocovariance, levinson_durbin, LevinsonResult};
pub use differencing::{difference, integrate};
pub use least_squares::{solve_least_squares, LeastSquaresFit};
pub use polynomial::{is_stationary, psi_weights};

/// Errors that can occur in time series calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Singular system: {0}")]
    Singular(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for series math operations
pub type Result<T> = std::result::Result<T, MathError>;

/// Pivot magnitude below which a system is treated as singular, relative to
/// the largest diagonal entry.
pub const SINGULARITY_TOLERANCE: f64 = 1e-10;
