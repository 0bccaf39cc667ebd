use anyhow::Context;
use clap::Parser;
use sales_forecast::{pipeline, ArimaOrder, PipelineConfig, TrimPolicy};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

#[derive(Parser)]
#[command(name = "sales-forecast")]
#[command(about = "Forecast monthly retail sales from raw transactions", long_about = None)]
struct Cli {
    /// Transaction CSV (InvoiceNo, CustomerID, Quantity, UnitPrice, InvoiceDate)
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// Composed Date,Sales,Type CSV to write
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// TOML configuration file
    #[arg(short, long, env = "SALES_FORECAST_CONFIG")]
    config: Option<PathBuf>,
    /// Months to forecast
    #[arg(long)]
    horizon: Option<usize>,
    /// ARIMA order as p,d,q
    #[arg(long, value_parser = parse_order)]
    order: Option<ArimaOrder>,
    /// Handling of the trailing, possibly incomplete month
    #[arg(long, value_enum)]
    trim: Option<TrimPolicy>,
    /// Write the fit report as JSON to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

fn parse_order(raw: &str) -> Result<ArimaOrder, String> {
    raw.parse().map_err(|e: sales_forecast::ForecastError| e.to_string())
}

impl Cli {
    fn into_config(self) -> anyhow::Result<PipelineConfig> {
        let mut config = PipelineConfig::load(self.config.as_deref())
            .context("failed to load configuration")?;
        if let Some(input) = self.input {
            config.input = Some(input);
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(horizon) = self.horizon {
            config.horizon = horizon;
        }
        if let Some(order) = self.order {
            config.order = order;
        }
        if let Some(trim) = self.trim {
            config.trim = trim;
        }
        if let Some(report) = self.report {
            config.report = Some(report);
        }
        config.validate()?;
        Ok(config)
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.into_config()?;
    let outcome = pipeline::run(&config).context("forecast run failed")?;

    for row in outcome.composed.rows() {
        println!("{}  {:>14.2}  {}", row.date, row.sales, row.kind);
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
