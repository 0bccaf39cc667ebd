//! # Sales Forecast
//!
//! Monthly retail sales forecasting from raw transaction records.
//!
//! ## Pipeline
//!
//! - Cleaning of raw transactions (`data`)
//! - Monthly aggregation with an explicit trailing-month trim policy (`aggregate`)
//! - ARIMA fitting and dated projections (`models`, `forecaster`)
//! - Composition of historical and forecast rows (`compose`)
//! - Atomic CSV export (`export`)
//!
//! ## Quick Start
//!
//! ```no_run
//! use sales_forecast::config::PipelineConfig;
//! use sales_forecast::pipeline;
//!
//! let mut config = PipelineConfig::load(None)?;
//! config.input = Some("online_retail.csv".into());
//!
//! let outcome = pipeline::run(&config)?;
//! println!("{} rows written", outcome.composed.len());
//! # Ok::<(), sales_forecast::ForecastError>(())
//! ```
//!
//! Stages can also be driven one at a time:
//!
//! ```rust
//! use chrono::NaiveDate;
//! use sales_forecast::aggregate::MonthlySeries;
//! use sales_forecast::compose::compose;
//! use sales_forecast::forecaster::Forecaster;
//! use sales_forecast::models::ArimaOrder;
//!
//! let start = NaiveDate::from_ymd_opt(2011, 1, 31).unwrap();
//! let history = MonthlySeries::from_values(start, &[100.0, 110.0, 105.0, 120.0, 130.0])?;
//!
//! let forecast = Forecaster::arima(ArimaOrder::default(), 3)?.forecast(&history)?;
//! let composed = compose(&history, &forecast)?;
//! assert_eq!(composed.len(), 8);
//! # Ok::<(), sales_forecast::ForecastError>(())
//! ```

pub mod aggregate;
pub mod compose;
pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod forecaster;
pub mod models;
pub mod pipeline;
pub mod utils;

// Re-export commonly used types
pub use crate::aggregate::{MonthlySalesPoint, MonthlySeries, TemporalAggregator, TrimPolicy};
pub use crate::compose::{compose, ComposedRow, ComposedSeries, SeriesKind};
pub use crate::config::PipelineConfig;
pub use crate::data::{DataLoader, RawTransaction, RecordCleaner, Transaction};
pub use crate::error::{ForecastError, Result};
pub use crate::forecaster::{Forecast, ForecastPoint, Forecaster};
pub use crate::models::{ArimaOrder, FitReport, ForecastModel, TrainedForecastModel};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
