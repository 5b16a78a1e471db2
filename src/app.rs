//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and installs logging
//! - resolves the run configuration (fatal errors stop here)
//! - collects both series from the API
//! - writes the chart
//! - prints the run summary and writes the optional CSV export

use clap::Parser;
use tracing::Level;

use crate::cli::Cli;
use crate::config::RunConfig;
use crate::data::dates::MonthlyDates;
use crate::data::sst::SstClient;
use crate::error::AppError;
use crate::plot::ChartMeta;

pub mod pipeline;

/// Entry point for the `sst-graph` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    init_logging(&cli);

    let config = RunConfig::from_cli(&cli)?;
    let client = SstClient::new(config.api.clone())?;
    tracing::debug!("Querying {}", client.url());

    run_with(&client, &config)
}

/// Collect, render, report, and export for an already resolved configuration.
///
/// The chart is written before the optional CSV so a bad export path never
/// costs the chart.
pub fn run_with<S>(source: &S, config: &RunConfig) -> Result<(), AppError>
where
    S: crate::data::sst::PointSource + ?Sized,
{
    let dates = MonthlyDates::new(config.years);
    let collection = pipeline::collect_series(source, &config.coordinate, &dates, config.delay);

    let meta = ChartMeta {
        coordinate: config.coordinate,
        years: config.years,
    };
    crate::plot::render_chart(&config.output, &collection.series, &meta)?;
    tracing::info!("Graph saved to {}", config.output.display());

    let exported = match &config.export_csv {
        Some(path) => crate::io::export::write_series_csv(path, &collection.series)
            .inspect(|_| tracing::info!("Series exported to {}", path.display())),
        None => Ok(()),
    };

    println!("{}", crate::report::format_run_summary(config, &collection));
    exported
}

fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::WARN
    } else {
        Level::INFO
    };

    // A subscriber may already be installed (e.g. by an embedding binary).
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}
