//! Trendcast CLI: forecast and config commands.
//!
//! Commands:
//! - `forecast` fetches two price histories, fits a polynomial trend to each,
//!   and writes a chart of actuals plus extrapolated forecasts
//! - `init-config` writes the default TOML configuration

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trendcast_core::data::{CsvProvider, DataProvider, SyntheticProvider, YahooProvider};
use trendcast_runner::{run_forecast, ForecastConfig, GnuplotRenderer, RunReport};

#[derive(Parser)]
#[command(
    name = "trendcast",
    version,
    about = "Trendcast CLI: polynomial price-trend forecasts for two assets"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Source {
    /// Yahoo Finance chart API.
    Yahoo,
    /// Local `<SYMBOL>.csv` files with `date,adj_close` rows.
    Csv,
    /// Deterministic random walk, no network.
    Synthetic,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, fit, and chart both assets.
    Forecast {
        /// Path to a TOML config file. Defaults are used when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// First history date (YYYY-MM-DD).
        #[arg(long, value_parser = parse_date)]
        start: Option<NaiveDate>,

        /// Last history date (YYYY-MM-DD), inclusive. Defaults to yesterday.
        #[arg(long, value_parser = parse_date)]
        end: Option<NaiveDate>,

        /// Forecast horizon in calendar days.
        #[arg(long)]
        horizon: Option<u32>,

        /// Directory the chart is written to.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Write `<stem>.png` instead of a date-stamped name.
        #[arg(long, default_value_t = false)]
        static_name: bool,

        /// Where price history comes from.
        #[arg(long, value_enum, default_value_t = Source::Yahoo)]
        source: Source,

        /// Directory of CSV files (with `--source csv`).
        #[arg(long, default_value = "data")]
        csv_dir: PathBuf,

        /// Print the run report as JSON instead of a text summary.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Write the default configuration as TOML.
    InitConfig {
        /// Destination file.
        #[arg(long, default_value = "trendcast.toml")]
        path: PathBuf,

        /// Overwrite an existing file.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Forecast {
            config,
            start,
            end,
            horizon,
            output_dir,
            static_name,
            source,
            csv_dir,
            json,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(start) = start {
                config.start_date = start;
            }
            if end.is_some() {
                config.end_date = end;
            }
            if let Some(horizon) = horizon {
                config.horizon_days = horizon;
            }
            if let Some(dir) = output_dir {
                config.output.dir = dir;
            }
            if static_name {
                config.output.date_stamped = false;
            }
            run_forecast_cmd(&config, source, csv_dir, json)
        }
        Commands::InitConfig { path, force } => run_init_config(&path, force),
    }
}

fn load_config(path: Option<&Path>) -> Result<ForecastConfig> {
    match path {
        Some(path) => ForecastConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(ForecastConfig::default()),
    }
}

fn build_provider(source: Source, csv_dir: PathBuf) -> Result<Box<dyn DataProvider>> {
    Ok(match source {
        Source::Yahoo => Box::new(YahooProvider::new().context("building Yahoo client")?),
        Source::Csv => Box::new(CsvProvider::new(csv_dir)),
        Source::Synthetic => Box::new(SyntheticProvider::default()),
    })
}

fn run_forecast_cmd(
    config: &ForecastConfig,
    source: Source,
    csv_dir: PathBuf,
    json: bool,
) -> Result<()> {
    let provider = build_provider(source, csv_dir)?;
    let today = chrono::Local::now().date_naive();

    let report = run_forecast(config, provider.as_ref(), &GnuplotRenderer, today)
        .context("forecast run failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }
    Ok(())
}

fn run_init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists; pass --force to overwrite", path.display());
    }
    let text = ForecastConfig::default().to_toml()?;
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

fn print_summary(report: &RunReport) {
    println!();
    println!("=== Forecast ===");
    println!("History:        {} to {}", report.start_date, report.end_date);
    println!("Shared days:    {}", report.observations);
    println!("Horizon:        {} days", report.horizon_days);
    for asset in &report.assets {
        println!();
        println!("--- {} ({}) ---", asset.label, asset.symbol);
        println!("Rows fetched:   {}", asset.fetched_rows);
        let coeffs: Vec<String> = asset.coefficients.iter().map(|c| format!("{c:.6e}")).collect();
        println!("Coefficients:   [{}]", coeffs.join(", "));
        if let Some(p) = asset.last_actual {
            println!("Last actual:    {} ${:.2}", p.date, p.price);
        }
        if let Some(p) = asset.last_forecast {
            println!("Last forecast:  {} ${:.2}", p.date, p.price);
        }
    }
    println!();
    println!("Chart: {}", report.output.written.display());
    for failure in &report.output.failed_deletions {
        println!("WARNING: {failure}");
    }
    println!();
}
