//! Calendar and parsing helpers for the sales_forecast crate

use crate::error::{ForecastError, Result};
use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};

/// Formats tried, in order, when parsing transaction timestamps
pub const DEFAULT_TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

/// Last day of the month containing `date`
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let first = date.with_day(1).unwrap_or(date);
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

/// Month-end date `months` calendar months after the month of `date`
pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    let first = date.with_day(1).unwrap_or(date);
    first
        .checked_add_months(Months::new(months))
        .map(month_end)
        .ok_or_else(|| {
            ForecastError::InvalidParameter(format!(
                "Cannot advance {} by {} months",
                date, months
            ))
        })
}

/// Period-end dates for the `horizon` months following `last`
pub fn future_period_ends(last: NaiveDate, horizon: usize) -> Result<Vec<NaiveDate>> {
    (1..=horizon)
        .map(|step| {
            let step = u32::try_from(step).map_err(|_| {
                ForecastError::InvalidParameter(format!("Horizon {} is too large", horizon))
            })?;
            add_months(last, step)
        })
        .collect()
}

/// Whether `next` is the period-end of the month right after `previous`
pub fn is_next_month(previous: NaiveDate, next: NaiveDate) -> bool {
    add_months(previous, 1).map(|expected| expected == next).unwrap_or(false)
}

/// Parse a timestamp with the first matching format.
///
/// A bare `%Y-%m-%d` date is accepted as midnight.
pub fn parse_timestamp<S: AsRef<str>>(raw: &str, formats: &[S]) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    formats
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt.as_ref()).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_end_handles_leap_years() {
        assert_eq!(month_end(ymd(2024, 2, 10)), ymd(2024, 2, 29));
        assert_eq!(month_end(ymd(2023, 2, 1)), ymd(2023, 2, 28));
        assert_eq!(month_end(ymd(2011, 12, 9)), ymd(2011, 12, 31));
    }

    #[test]
    fn test_add_months_keeps_month_ends() {
        assert_eq!(add_months(ymd(2011, 1, 31), 1).unwrap(), ymd(2011, 2, 28));
        assert_eq!(add_months(ymd(2011, 11, 30), 2).unwrap(), ymd(2012, 1, 31));
    }

    #[test]
    fn test_future_period_ends() {
        let dates = future_period_ends(ymd(2011, 11, 30), 3).unwrap();
        assert_eq!(dates, vec![ymd(2011, 12, 31), ymd(2012, 1, 31), ymd(2012, 2, 29)]);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let formats = DEFAULT_TIMESTAMP_FORMATS;
        let expected = ymd(2010, 12, 1).and_hms_opt(8, 26, 0).unwrap();
        assert_eq!(parse_timestamp("2010-12-01 08:26:00", formats), Some(expected));
        assert_eq!(parse_timestamp("12/1/2010 8:26", formats), Some(expected));
        assert_eq!(
            parse_timestamp("2010-12-01", formats),
            Some(ymd(2010, 12, 1).and_hms_opt(0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("yesterday", formats), None);
    }
}
