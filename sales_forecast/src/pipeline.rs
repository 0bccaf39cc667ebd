//! End-to-end batch run: clean, aggregate, forecast, compose, export

use crate::aggregate::{MonthlySeries, TemporalAggregator};
use crate::compose::{compose, ComposedSeries};
use crate::config::PipelineConfig;
use crate::data::{CleaningReport, DataLoader, RawTransaction};
use crate::error::{ForecastError, Result};
use crate::export::write_outputs;
use crate::forecaster::{Forecast, Forecaster};
use tracing::info;

/// Everything produced by one run
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub cleaning: CleaningReport,
    pub history: MonthlySeries,
    pub forecast: Forecast,
    pub composed: ComposedSeries,
}

/// Run every stage on in-memory records; nothing touches the filesystem
pub fn run_records(records: &[RawTransaction], config: &PipelineConfig) -> Result<PipelineOutcome> {
    config.validate()?;

    let (transactions, cleaning) = config.cleaner()?.clean(records)?;
    let history = TemporalAggregator::new(config.trim).aggregate(&transactions)?;
    let forecast = Forecaster::arima(config.order, config.horizon)?
        .with_confidence_level(config.confidence_level)?
        .forecast(&history)?;
    let composed = compose(&history, &forecast)?;

    Ok(PipelineOutcome {
        cleaning,
        history,
        forecast,
        composed,
    })
}

/// Read the configured input, run every stage and write the outputs.
///
/// Outputs are only written once the composed series is complete and every
/// output has been staged, so a failed run leaves no output file behind.
pub fn run(config: &PipelineConfig) -> Result<PipelineOutcome> {
    let input = config.input.as_deref().ok_or_else(|| {
        ForecastError::InvalidParameter("no input file configured".to_string())
    })?;
    info!(input = %input.display(), order = %config.order, horizon = config.horizon, "starting forecast run");

    let records = DataLoader::from_csv(input)?;
    let outcome = run_records(&records, config)?;

    let report = config
        .report
        .as_deref()
        .map(|path| (path, &outcome.forecast.report));
    write_outputs(&config.output, &outcome.composed, report)?;

    info!(
        historical = outcome.history.len(),
        forecast = outcome.forecast.len(),
        "forecast run finished"
    );
    Ok(outcome)
}
