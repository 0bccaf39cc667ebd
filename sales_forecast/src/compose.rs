//! Merging historical and forecast values into one labeled series

use crate::aggregate::MonthlySeries;
use crate::error::{ForecastError, Result};
use crate::forecaster::Forecast;
use crate::utils::{add_months, is_next_month};
use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::fmt;

/// Origin of a composed row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SeriesKind {
    Historical,
    Forecast,
}

impl fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesKind::Historical => f.write_str("Historical"),
            SeriesKind::Forecast => f.write_str("Forecast"),
        }
    }
}

/// One exported row: `Date,Sales,Type`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComposedRow {
    #[serde(rename = "Date", serialize_with = "serialize_date")]
    pub date: NaiveDate,
    #[serde(rename = "Sales")]
    pub sales: f64,
    #[serde(rename = "Type")]
    pub kind: SeriesKind,
}

fn serialize_date<S: Serializer>(date: &NaiveDate, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(&date.format("%Y-%m-%d"))
}

/// Historical rows followed by forecast rows, one month apart throughout
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedSeries {
    rows: Vec<ComposedRow>,
}

impl ComposedSeries {
    pub fn rows(&self) -> &[ComposedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows of one kind, in date order
    pub fn of_kind(&self, kind: SeriesKind) -> impl Iterator<Item = &ComposedRow> {
        self.rows.iter().filter(move |row| row.kind == kind)
    }
}

/// Join a historical series and its forecast.
///
/// The first forecast month must directly follow the last historical month
/// and the whole sequence must advance one calendar month per row.
pub fn compose(history: &MonthlySeries, forecast: &Forecast) -> Result<ComposedSeries> {
    let last_historical = history.last_date().ok_or(ForecastError::InsufficientData {
        required: 1,
        actual: 0,
    })?;

    if let Some(first_forecast) = forecast.points.first() {
        let expected = add_months(last_historical, 1)?;
        if first_forecast.period_end != expected {
            return Err(ForecastError::SeriesAlignment {
                expected,
                found: first_forecast.period_end,
            });
        }
    }

    let rows: Vec<ComposedRow> = history
        .points()
        .iter()
        .map(|p| ComposedRow {
            date: p.period_end,
            sales: p.sales,
            kind: SeriesKind::Historical,
        })
        .chain(forecast.points.iter().map(|p| ComposedRow {
            date: p.period_end,
            sales: p.sales,
            kind: SeriesKind::Forecast,
        }))
        .collect();

    for pair in rows.windows(2) {
        if !is_next_month(pair[0].date, pair[1].date) {
            return Err(ForecastError::SeriesAlignment {
                expected: add_months(pair[0].date, 1)?,
                found: pair[1].date,
            });
        }
    }

    Ok(ComposedSeries { rows })
}
