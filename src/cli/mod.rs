//! Command-line parsing for the SST time-series grapher.
//!
//! Only the argument surface lives here; turning it into a validated
//! `RunConfig` is `config`'s job.

use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_LAT: f64 = 38.13;
pub const DEFAULT_LON: f64 = 4.13;
pub const DEFAULT_START_YEAR: i32 = 1981;
pub const DEFAULT_END_YEAR: i32 = 2025;
pub const DEFAULT_OUTPUT: &str = "sst_timeseries.png";
pub const DEFAULT_DELAY_SECS: f64 = 0.1;

/// Top-level CLI.
#[derive(Debug, Parser, Clone)]
#[command(
    name = "sst-graph",
    version,
    about = "Plot monthly sea-surface temperature and anomaly for one point"
)]
pub struct Cli {
    /// Latitude in decimal degrees.
    #[arg(long, default_value_t = DEFAULT_LAT, allow_negative_numbers = true)]
    pub lat: f64,

    /// Longitude in decimal degrees.
    #[arg(long, default_value_t = DEFAULT_LON, allow_negative_numbers = true)]
    pub lon: f64,

    /// First year to sample (inclusive).
    #[arg(long, default_value_t = DEFAULT_START_YEAR)]
    pub start_year: i32,

    /// Last year to sample (inclusive).
    #[arg(long, default_value_t = DEFAULT_END_YEAR)]
    pub end_year: i32,

    /// Chart output file. `.svg` writes SVG, anything else a bitmap (PNG).
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// API key. Falls back to `SST_API_KEY` (environment or `.env`).
    #[arg(long)]
    pub api_key: Option<String>,

    /// API base URL. Falls back to `SST_API_BASE_URL`, then the public endpoint.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Seconds to wait between consecutive API calls.
    #[arg(long, default_value_t = DEFAULT_DELAY_SECS)]
    pub delay: f64,

    /// Also write the collected series to CSV.
    #[arg(long = "export-csv", value_name = "CSV")]
    pub export_csv: Option<PathBuf>,

    /// Log every request.
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors.
    #[arg(short, long)]
    pub quiet: bool,
}
