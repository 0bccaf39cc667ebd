use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstest::rstest;
use sales_forecast::data::{DataLoader, DropReason, RawTransaction, RecordCleaner};
use sales_forecast::ForecastError;
use std::io::Write;
use tempfile::NamedTempFile;

const HEADER: &str = "InvoiceNo,StockCode,Description,Quantity,InvoiceDate,UnitPrice,CustomerID,Country";

fn raw(invoice: &str, customer: Option<&str>, quantity: i64, price: f64) -> RawTransaction {
    RawTransaction {
        row: 1,
        invoice_no: invoice.to_string(),
        customer_id: customer.map(str::to_string),
        quantity,
        unit_price: price,
        invoice_date: "2011-03-15 10:30:00".to_string(),
    }
}

#[test]
fn test_data_loader_from_csv() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", HEADER).unwrap();
    writeln!(file, "536365,85123A,\"WHITE HANGING HEART, T-LIGHT\",6,12/1/2010 8:26,2.55,17850,United Kingdom").unwrap();
    writeln!(file, "C536379,D,Discount,-1,12/1/2010 9:41,27.5,14527,United Kingdom").unwrap();
    writeln!(file, "536414,22139,,56,12/1/2010 11:52,0,,United Kingdom").unwrap();

    let records = DataLoader::from_csv(file.path()).unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].invoice_no, "536365");
    assert_eq!(records[0].customer_id.as_deref(), Some("17850"));
    assert_eq!(records[0].quantity, 6);
    assert_eq!(records[1].row, 2);
    assert_eq!(records[2].customer_id, None);
    assert_eq!(records[2].unit_price, 0.0);
}

#[test]
fn test_data_loader_reports_malformed_row() {
    let csv = format!(
        "{}\n536365,A,x,6,2010-12-01 08:26:00,2.55,17850,UK\n536366,B,y,six,2010-12-01 08:28:00,1.85,17850,UK\n",
        HEADER
    );

    let err = DataLoader::from_reader(csv.as_bytes()).unwrap_err();
    match err {
        ForecastError::MalformedInput { row, .. } => assert_eq!(row, 2),
        other => panic!("Expected MalformedInput, got {:?}", other),
    }
}

#[test]
fn test_data_loader_missing_file() {
    let err = DataLoader::from_csv("nonexistent_transactions.csv").unwrap_err();
    assert!(matches!(err, ForecastError::IoError { .. }));
}

#[rstest]
#[case(raw("536365", None, 6, 2.55), Some(DropReason::MissingCustomer))]
#[case(raw("536365", Some("   "), 6, 2.55), Some(DropReason::MissingCustomer))]
#[case(raw("C536379", Some("14527"), 1, 27.5), Some(DropReason::Cancelled))]
#[case(raw("536365", Some("17850"), 0, 2.55), Some(DropReason::NonPositiveQuantity))]
#[case(raw("536365", Some("17850"), -5, 2.55), Some(DropReason::NonPositiveQuantity))]
#[case(raw("536365", Some("17850"), 6, 0.0), Some(DropReason::NonPositivePrice))]
#[case(raw("536365", Some("17850"), 6, -1.0), Some(DropReason::NonPositivePrice))]
#[case(raw("536365", Some("17850"), 6, f64::NAN), Some(DropReason::NonPositivePrice))]
#[case(raw("536365", Some("17850"), 6, 2.55), None)]
fn test_cleaner_rules(#[case] record: RawTransaction, #[case] expected: Option<DropReason>) {
    let cleaner = RecordCleaner::default();
    assert_eq!(cleaner.classify(&record), expected);
}

#[test]
fn test_cleaner_rules_apply_in_order() {
    // Violates every rule; the first one wins
    let record = raw("C1", None, -1, -1.0);
    assert_eq!(
        RecordCleaner::default().classify(&record),
        Some(DropReason::MissingCustomer)
    );
}

#[test]
fn test_cleaner_computes_total_price() {
    let records = vec![raw("536365", Some("17850"), 6, 2.55)];
    let (cleaned, report) = RecordCleaner::default().clean(&records).unwrap();

    assert_eq!(cleaned.len(), 1);
    assert!((cleaned[0].total_price - 15.3).abs() < 1e-9);
    assert_eq!(
        cleaned[0].timestamp.date(),
        NaiveDate::from_ymd_opt(2011, 3, 15).unwrap()
    );
    assert_eq!(report.rows_kept, 1);
    assert_eq!(report.rows_dropped(), 0);
}

#[test]
fn test_cleaner_keeps_exactly_the_valid_rows() {
    let mut rng = StdRng::seed_from_u64(7);
    let records: Vec<RawTransaction> = (0..500)
        .map(|i| {
            let customer = match rng.gen_range(0..4) {
                0 => None,
                1 => Some(String::new()),
                _ => Some(format!("{}", 12000 + i)),
            };
            let invoice = if rng.gen_bool(0.2) {
                format!("C{}", 540000 + i)
            } else {
                format!("{}", 540000 + i)
            };
            RawTransaction {
                row: i + 1,
                invoice_no: invoice,
                customer_id: customer,
                quantity: rng.gen_range(-3..10),
                unit_price: rng.gen_range(-2.0..5.0),
                invoice_date: "2011-05-02 09:00:00".to_string(),
            }
        })
        .collect();

    let (cleaned, report) = RecordCleaner::default().clean(&records).unwrap();

    let expected: Vec<String> = records
        .iter()
        .filter(|r| {
            r.customer_id.as_deref().map_or(false, |c| !c.trim().is_empty())
                && !r.invoice_no.starts_with('C')
                && r.quantity > 0
                && r.unit_price > 0.0
        })
        .map(|r| r.invoice_no.clone())
        .collect();
    let kept: Vec<String> = cleaned.iter().map(|t| t.invoice_no.clone()).collect();

    assert_eq!(kept, expected);
    assert_eq!(report.rows_read, 500);
    assert_eq!(
        report.missing_customer
            + report.cancelled
            + report.non_positive_quantity
            + report.non_positive_price,
        report.rows_dropped()
    );
    assert!(cleaned
        .iter()
        .all(|t| t.quantity > 0 && t.unit_price > 0.0 && !t.customer_id.is_empty()));
}

#[test]
fn test_cleaner_rejects_unparseable_timestamp() {
    let mut record = raw("536365", Some("17850"), 6, 2.55);
    record.row = 42;
    record.invoice_date = "not a date".to_string();

    let err = RecordCleaner::default().clean(&[record]).unwrap_err();
    match err {
        ForecastError::MalformedInput { row, reason } => {
            assert_eq!(row, 42);
            assert!(reason.contains("not a date"));
        }
        other => panic!("Expected MalformedInput, got {:?}", other),
    }
}

#[test]
fn test_cleaner_ignores_timestamps_of_dropped_rows() {
    let mut record = raw("C536365", Some("17850"), 6, 2.55);
    record.invoice_date = "garbage".to_string();

    let (cleaned, report) = RecordCleaner::default().clean(&[record]).unwrap();
    assert!(cleaned.is_empty());
    assert_eq!(report.cancelled, 1);
}

#[test]
fn test_cleaner_rejects_infinite_price() {
    let record = raw("536365", Some("17850"), 6, f64::INFINITY);
    let err = RecordCleaner::default().clean(&[record]).unwrap_err();
    assert!(matches!(err, ForecastError::MalformedInput { row: 1, .. }));
}

#[test]
fn test_cleaner_custom_prefix() {
    let cleaner = RecordCleaner::new("X", vec!["%Y-%m-%d %H:%M:%S".to_string()]).unwrap();
    assert_eq!(cleaner.cancellation_prefix(), "X");
    assert_eq!(RecordCleaner::default().cancellation_prefix(), "C");
    assert_eq!(cleaner.classify(&raw("C1", Some("1"), 1, 1.0)), None);
    assert_eq!(
        cleaner.classify(&raw("X1", Some("1"), 1, 1.0)),
        Some(DropReason::Cancelled)
    );

    assert!(RecordCleaner::new("", vec!["%Y".to_string()]).is_err());
    assert!(RecordCleaner::new("C", Vec::new()).is_err());
}
