//! Monthly aggregation of cleaned transactions

use crate::data::Transaction;
use crate::error::{ForecastError, Result};
use crate::utils::{add_months, is_next_month, month_end};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Fewest monthly points a model can be fitted on
pub const MIN_MONTHLY_POINTS: usize = 2;

/// Total sales for one calendar month
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlySalesPoint {
    /// Last day of the month
    pub period_end: NaiveDate,
    /// Sum of `total_price` over the month
    pub sales: f64,
}

/// Ordered monthly sales, strictly increasing by period
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySeries {
    points: Vec<MonthlySalesPoint>,
}

impl MonthlySeries {
    /// Create a series from points keyed by month-end dates
    pub fn new(points: Vec<MonthlySalesPoint>) -> Result<Self> {
        for point in &points {
            if month_end(point.period_end) != point.period_end {
                return Err(ForecastError::InvalidParameter(format!(
                    "{} is not a month-end date",
                    point.period_end
                )));
            }
        }
        for pair in points.windows(2) {
            if pair[1].period_end <= pair[0].period_end {
                return Err(ForecastError::InvalidParameter(format!(
                    "Monthly periods must be strictly increasing: {} follows {}",
                    pair[1].period_end, pair[0].period_end
                )));
            }
        }
        Ok(Self { points })
    }

    /// Build a contiguous series starting at the month containing `first`
    pub fn from_values(first: NaiveDate, values: &[f64]) -> Result<Self> {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &sales)| {
                let offset = u32::try_from(i).map_err(|_| {
                    ForecastError::InvalidParameter("Series is too long".to_string())
                })?;
                Ok(MonthlySalesPoint {
                    period_end: add_months(first, offset)?,
                    sales,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(points)
    }

    pub fn points(&self) -> &[MonthlySalesPoint] {
        &self.points
    }

    /// Sales values in period order
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.sales).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.period_end)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.period_end)
    }

    /// Sales for the month ending on `period_end`
    pub fn get(&self, period_end: NaiveDate) -> Option<f64> {
        self.points
            .iter()
            .find(|p| p.period_end == period_end)
            .map(|p| p.sales)
    }

    /// Fail on the first month that is missing between two points
    pub fn check_contiguous(&self) -> Result<()> {
        for pair in self.points.windows(2) {
            if !is_next_month(pair[0].period_end, pair[1].period_end) {
                return Err(ForecastError::SeriesAlignment {
                    expected: add_months(pair[0].period_end, 1)?,
                    found: pair[1].period_end,
                });
            }
        }
        Ok(())
    }
}

/// Rule for discarding a trailing month whose collection window may be cut short
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TrimPolicy {
    /// Always drop the final month
    #[default]
    DropLast,
    /// Drop the final month unless the latest timestamp falls on its last day
    DropIfPartial,
}

impl TrimPolicy {
    /// Apply the policy to an ordered list of monthly points
    pub fn apply(
        &self,
        mut points: Vec<MonthlySalesPoint>,
        latest: Option<NaiveDateTime>,
    ) -> Vec<MonthlySalesPoint> {
        let drop = match self {
            TrimPolicy::DropLast => true,
            TrimPolicy::DropIfPartial => latest
                .map(|ts| month_end(ts.date()) != ts.date())
                .unwrap_or(true),
        };
        if drop {
            if let Some(dropped) = points.pop() {
                debug!(period = %dropped.period_end, sales = dropped.sales, policy = ?self, "trimmed trailing month");
            }
        }
        points
    }
}

/// Collapses transactions into a monthly series
#[derive(Debug, Clone, Default)]
pub struct TemporalAggregator {
    trim: TrimPolicy,
}

impl TemporalAggregator {
    pub fn new(trim: TrimPolicy) -> Self {
        Self { trim }
    }

    /// Sum `total_price` per calendar month, without trimming.
    ///
    /// Months without transactions do not appear in the output.
    pub fn group_by_month(records: &[Transaction]) -> Vec<MonthlySalesPoint> {
        let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for record in records {
            *totals.entry(month_end(record.timestamp.date())).or_insert(0.0) += record.total_price;
        }
        totals
            .into_iter()
            .map(|(period_end, sales)| MonthlySalesPoint { period_end, sales })
            .collect()
    }

    /// Group, trim and check that enough months remain
    pub fn aggregate(&self, records: &[Transaction]) -> Result<MonthlySeries> {
        let grouped = Self::group_by_month(records);
        let months_seen = grouped.len();
        let latest = records.iter().map(|r| r.timestamp).max();
        let points = self.trim.apply(grouped, latest);

        if points.len() < MIN_MONTHLY_POINTS {
            return Err(ForecastError::InsufficientData {
                required: MIN_MONTHLY_POINTS,
                actual: points.len(),
            });
        }

        info!(months = months_seen, kept = points.len(), "aggregated monthly sales");
        MonthlySeries::new(points)
    }

    pub fn trim_policy(&self) -> TrimPolicy {
        self.trim
    }
}
