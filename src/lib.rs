//! # Retail Forecast
//!
//! Workspace facade over the monthly sales forecasting crates.
//!
//! - [`sales_forecast`]: cleaning, aggregation, ARIMA forecasting and export
//! - [`series_math`]: differencing, autocovariance and least-squares kernels
//!
//! ## Example
//!
//! ```
//! use retail_forecast_workspace::series_math::{difference, integrate};
//!
//! let sales = [100.0, 110.0, 105.0, 120.0];
//! let changes = difference(&sales, 1);
//! assert_eq!(changes, vec![10.0, -5.0, 15.0]);
//!
//! let next = integrate(&[5.0], &sales, 1);
//! assert_eq!(next, vec![125.0]);
//! ```

pub use sales_forecast;
pub use series_math;

pub use sales_forecast::{
    compose, pipeline, ArimaOrder, DataLoader, ForecastError, Forecaster, MonthlySeries,
    PipelineConfig, TemporalAggregator, TrimPolicy,
};
