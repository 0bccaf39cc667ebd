//! Transaction records: loading from CSV and cleaning into analyzable rows

use crate::error::{ForecastError, Result};
use crate::utils::{parse_timestamp, DEFAULT_TIMESTAMP_FORMATS};
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Invoice prefix that marks a cancelled order
pub const DEFAULT_CANCELLATION_PREFIX: &str = "C";

/// A transaction row as it appears in the source file
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawTransaction {
    /// 1-based data row number (the header is not counted)
    #[serde(skip)]
    pub row: usize,
    #[serde(rename = "InvoiceNo")]
    pub invoice_no: String,
    #[serde(rename = "CustomerID", default)]
    pub customer_id: Option<String>,
    #[serde(rename = "Quantity")]
    pub quantity: i64,
    #[serde(rename = "UnitPrice")]
    pub unit_price: f64,
    #[serde(rename = "InvoiceDate")]
    pub invoice_date: String,
}

/// A transaction that passed every cleaning rule
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub invoice_no: String,
    pub customer_id: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub timestamp: NaiveDateTime,
    /// `quantity * unit_price`
    pub total_price: f64,
}

/// Why a raw row was excluded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    MissingCustomer,
    Cancelled,
    NonPositiveQuantity,
    NonPositivePrice,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DropReason::MissingCustomer => "missing customer id",
            DropReason::Cancelled => "cancelled invoice",
            DropReason::NonPositiveQuantity => "quantity <= 0",
            DropReason::NonPositivePrice => "unit price <= 0",
        };
        f.write_str(text)
    }
}

/// Row counts produced by a cleaning pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleaningReport {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub missing_customer: usize,
    pub cancelled: usize,
    pub non_positive_quantity: usize,
    pub non_positive_price: usize,
}

impl CleaningReport {
    fn record(&mut self, reason: DropReason) {
        match reason {
            DropReason::MissingCustomer => self.missing_customer += 1,
            DropReason::Cancelled => self.cancelled += 1,
            DropReason::NonPositiveQuantity => self.non_positive_quantity += 1,
            DropReason::NonPositivePrice => self.non_positive_price += 1,
        }
    }

    /// Total number of dropped rows
    pub fn rows_dropped(&self) -> usize {
        self.rows_read - self.rows_kept
    }
}

/// Data loader for transaction files
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load raw transactions from a CSV file with a header row
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<RawTransaction>> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| ForecastError::io(path, e))?;
        let records = Self::read_records(file, path)?;
        info!(path = %path.display(), rows = records.len(), "loaded transactions");
        Ok(records)
    }

    /// Load raw transactions from any reader producing CSV with a header row
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<RawTransaction>> {
        Self::read_records(reader, Path::new("<reader>"))
    }

    fn read_records<R: Read>(reader: R, source: &Path) -> Result<Vec<RawTransaction>> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut records = Vec::new();
        for (idx, result) in rdr.deserialize::<RawTransaction>().enumerate() {
            let row = idx + 1;
            let mut record = result.map_err(|e| map_csv_error(e, row, source))?;
            record.row = row;
            records.push(record);
        }
        Ok(records)
    }
}

fn map_csv_error(err: csv::Error, row: usize, source: &Path) -> ForecastError {
    if !err.is_io_error() {
        return ForecastError::MalformedInput {
            row,
            reason: err.to_string(),
        };
    }
    match err.into_kind() {
        csv::ErrorKind::Io(io) => ForecastError::io(source, io),
        other => ForecastError::MalformedInput {
            row,
            reason: format!("{:?}", other),
        },
    }
}

/// Filters raw transactions down to rows that are safe to aggregate.
///
/// Rules are applied in a fixed order: customer present, invoice not
/// cancelled, quantity positive, unit price positive. Nothing is imputed.
#[derive(Debug, Clone)]
pub struct RecordCleaner {
    cancellation_prefix: String,
    timestamp_formats: Vec<String>,
}

impl Default for RecordCleaner {
    fn default() -> Self {
        Self {
            cancellation_prefix: DEFAULT_CANCELLATION_PREFIX.to_string(),
            timestamp_formats: DEFAULT_TIMESTAMP_FORMATS
                .iter()
                .map(|f| f.to_string())
                .collect(),
        }
    }
}

impl RecordCleaner {
    /// Create a cleaner with a custom cancellation prefix and timestamp formats
    pub fn new(cancellation_prefix: impl Into<String>, timestamp_formats: Vec<String>) -> Result<Self> {
        let cancellation_prefix = cancellation_prefix.into();
        if cancellation_prefix.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "Cancellation prefix must not be empty".to_string(),
            ));
        }
        if timestamp_formats.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "At least one timestamp format is required".to_string(),
            ));
        }
        Ok(Self {
            cancellation_prefix,
            timestamp_formats,
        })
    }

    /// First rule the record violates, if any
    pub fn classify(&self, record: &RawTransaction) -> Option<DropReason> {
        let has_customer = record
            .customer_id
            .as_deref()
            .map_or(false, |id| !id.trim().is_empty());
        if !has_customer {
            return Some(DropReason::MissingCustomer);
        }
        if record.invoice_no.starts_with(&self.cancellation_prefix) {
            return Some(DropReason::Cancelled);
        }
        if record.quantity <= 0 {
            return Some(DropReason::NonPositiveQuantity);
        }
        // NaN is not a positive price either
        if record.unit_price.is_nan() || record.unit_price <= 0.0 {
            return Some(DropReason::NonPositivePrice);
        }
        None
    }

    /// Apply the filter pipeline and parse timestamps of surviving rows
    pub fn clean(&self, records: &[RawTransaction]) -> Result<(Vec<Transaction>, CleaningReport)> {
        let mut report = CleaningReport {
            rows_read: records.len(),
            ..CleaningReport::default()
        };
        let mut cleaned = Vec::with_capacity(records.len());

        for record in records {
            if let Some(reason) = self.classify(record) {
                report.record(reason);
                continue;
            }

            if !record.unit_price.is_finite() {
                return Err(ForecastError::MalformedInput {
                    row: record.row,
                    reason: format!("unit price '{}' is not finite", record.unit_price),
                });
            }

            let timestamp = parse_timestamp(&record.invoice_date, &self.timestamp_formats)
                .ok_or_else(|| ForecastError::MalformedInput {
                    row: record.row,
                    reason: format!("unparseable invoice date '{}'", record.invoice_date),
                })?;

            cleaned.push(Transaction {
                invoice_no: record.invoice_no.clone(),
                customer_id: record.customer_id.clone().unwrap_or_default().trim().to_string(),
                quantity: record.quantity,
                unit_price: record.unit_price,
                timestamp,
                total_price: record.quantity as f64 * record.unit_price,
            });
        }

        report.rows_kept = cleaned.len();
        debug!(
            missing_customer = report.missing_customer,
            cancelled = report.cancelled,
            non_positive_quantity = report.non_positive_quantity,
            non_positive_price = report.non_positive_price,
            "cleaning drop counts"
        );
        info!(
            read = report.rows_read,
            kept = report.rows_kept,
            dropped = report.rows_dropped(),
            "cleaned transactions"
        );

        Ok((cleaned, report))
    }

    /// Get the cancellation prefix
    pub fn cancellation_prefix(&self) -> &str {
        &self.cancellation_prefix
    }
}
