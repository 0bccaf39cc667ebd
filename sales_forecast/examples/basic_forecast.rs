use chrono::NaiveDate;
use sales_forecast::aggregate::MonthlySeries;
use sales_forecast::compose::{compose, SeriesKind};
use sales_forecast::forecaster::Forecaster;
use sales_forecast::models::ArimaOrder;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Sales Forecast: Basic Forecasting Example");
    println!("=========================================\n");

    // Twelve months of sales with a mild upward trend and a year-end peak
    let sales = [
        560_000.0, 498_000.0, 683_000.0, 493_000.0, 723_000.0, 691_000.0, 681_000.0, 704_000.0,
        1_019_000.0, 1_070_000.0, 1_461_000.0, 1_160_000.0,
    ];
    let start = NaiveDate::from_ymd_opt(2010, 12, 31).ok_or("invalid start date")?;
    let history = MonthlySeries::from_values(start, &sales)?;
    println!("History: {} months ending {:?}\n", history.len(), history.last_date());

    let forecaster = Forecaster::arima(ArimaOrder::default(), 6)?;
    let forecast = forecaster.forecast(&history)?;

    println!("Model fitted with {}", forecast.report.method);
    for warning in &forecast.report.warnings {
        println!("  warning: {}", warning);
    }

    println!("\nForecast (95% prediction intervals):");
    for point in &forecast.points {
        println!(
            "  {}  {:>14.2}  [{:.2}, {:.2}]",
            point.period_end, point.sales, point.lower, point.upper
        );
    }

    let composed = compose(&history, &forecast)?;
    println!(
        "\nComposed series: {} historical + {} forecast rows",
        composed.of_kind(SeriesKind::Historical).count(),
        composed.of_kind(SeriesKind::Forecast).count()
    );

    Ok(())
}
