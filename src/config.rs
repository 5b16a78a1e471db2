//! Run configuration.
//!
//! Flags, environment, and `.env` are resolved exactly once into an immutable
//! `RunConfig`. Every check here runs before any network activity.

use std::path::PathBuf;
use std::time::Duration;

use crate::cli::Cli;
use crate::data::sst::{ApiConfig, DEFAULT_BASE_URL};
use crate::domain::{Coordinate, SampleDate, YearRange};
use crate::error::AppError;

pub const API_KEY_ENV: &str = "SST_API_KEY";
pub const BASE_URL_ENV: &str = "SST_API_BASE_URL";

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub coordinate: Coordinate,
    pub years: YearRange,
    pub output: PathBuf,
    pub export_csv: Option<PathBuf>,
    /// Pause between consecutive API calls.
    pub delay: Duration,
    pub api: ApiConfig,
}

impl RunConfig {
    /// Resolve from CLI flags and the process environment (after loading `.env`).
    pub fn from_cli(cli: &Cli) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::resolve(cli, |key| std::env::var(key).ok())
    }

    /// Resolve from CLI flags and an arbitrary environment lookup.
    pub fn resolve(cli: &Cli, env: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let coordinate = Coordinate::new(cli.lat, cli.lon)?;
        let years = validate_years(cli.start_year, cli.end_year)?;
        let delay = parse_delay(cli.delay)?;
        let api_key = resolve_api_key(cli.api_key.as_deref(), env(API_KEY_ENV))?;
        let base_url = cli
            .base_url
            .clone()
            .or_else(|| env(BASE_URL_ENV))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            coordinate,
            years,
            output: cli.output.clone(),
            export_csv: cli.export_csv.clone(),
            delay,
            api: ApiConfig::new(base_url, api_key),
        })
    }
}

/// Flag first, then environment; blank values count as absent.
pub fn resolve_api_key(flag: Option<&str>, env: Option<String>) -> Result<String, AppError> {
    flag.map(str::to_string)
        .filter(|k| !k.trim().is_empty())
        .or_else(|| env.filter(|k| !k.trim().is_empty()))
        .map(|k| k.trim().to_string())
        .ok_or_else(|| {
            AppError::config(format!(
                "Missing API key: pass --api-key or set {API_KEY_ENV} (environment or .env)."
            ))
        })
}

pub fn parse_delay(secs: f64) -> Result<Duration, AppError> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(AppError::config(format!(
            "Invalid delay {secs}: must be a non-negative number of seconds."
        )));
    }
    Duration::try_from_secs_f64(secs)
        .map_err(|e| AppError::config(format!("Invalid delay {secs}: {e}")))
}

/// Years must be representable as calendar dates. A reversed range is allowed.
pub fn validate_years(start: i32, end: i32) -> Result<YearRange, AppError> {
    for year in [start, end] {
        if SampleDate::new(year, 1).is_none() || SampleDate::new(year, 12).is_none() {
            return Err(AppError::config(format!("Year {year} is out of range.")));
        }
    }
    Ok(YearRange::new(start, end))
}
