//! Shared domain types.
//!
//! All of these are built fresh for each run and live only in memory:
//!
//! - the sampled point (`Coordinate`) and year window (`YearRange`)
//! - the monthly sample index (`SampleDate`)
//! - the collected values (`SamplePoint`, `Series`, `SeriesPair`)

use std::fmt;

use chrono::{Datelike, NaiveDate};

use crate::error::AppError;

/// A geographic point in decimal degrees.
///
/// Validated once on construction and immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Result<Self, AppError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(AppError::config(format!(
                "Invalid latitude {lat}: must be within [-90, 90]."
            )));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(AppError::config(format!(
                "Invalid longitude {lon}: must be within [-180, 180]."
            )));
        }
        Ok(Self { lat, lon })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°N, {}°E", self.lat, self.lon)
    }
}

/// Inclusive range of calendar years to sample.
///
/// `start > end` is allowed and simply yields no samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// Number of monthly samples covered by the range.
    pub fn month_count(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            12 * (i64::from(self.end) - i64::from(self.start) + 1) as usize
        }
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// A calendar month, represented by its first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SampleDate(NaiveDate);

impl SampleDate {
    /// First day of `month` (1-12) in `year`, if representable.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// The first day of the following month.
    pub fn next_month(&self) -> Option<Self> {
        if self.month() == 12 {
            Self::new(self.year().checked_add(1)?, 1)
        } else {
            Self::new(self.year(), self.month() + 1)
        }
    }

    /// Position on a continuous time axis, e.g. 2020-07-01 -> 2020.5.
    pub fn fractional_year(&self) -> f64 {
        f64::from(self.year()) + f64::from(self.month() - 1) / 12.0
    }
}

impl fmt::Display for SampleDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Which quantity a point query asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    /// Mean sea-surface temperature (°C).
    Mean,
    /// Deviation from the long-term baseline (°C).
    Anomaly,
}

impl MetricKind {
    /// Fetch order within one sample date.
    pub const ALL: [MetricKind; 2] = [MetricKind::Mean, MetricKind::Anomaly];

    /// Value of the `data_type` query parameter.
    pub fn as_query_str(self) -> &'static str {
        match self {
            MetricKind::Mean => "mean",
            MetricKind::Anomaly => "anomaly",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            MetricKind::Mean => "Temperature",
            MetricKind::Anomaly => "Anomaly",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query_str())
    }
}

/// One position of a series. `None` means the fetch failed or returned no data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    pub date: SampleDate,
    pub value: Option<f64>,
}

/// An ordered, date-indexed series with explicit gaps.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub kind: MetricKind,
    pub points: Vec<SamplePoint>,
}

impl Series {
    pub fn new(kind: MetricKind) -> Self {
        Self {
            kind,
            points: Vec::new(),
        }
    }

    pub fn with_capacity(kind: MetricKind, capacity: usize) -> Self {
        Self {
            kind,
            points: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, date: SampleDate, value: Option<f64>) {
        self.points.push(SamplePoint { date, value });
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn present_count(&self) -> usize {
        self.points.iter().filter(|p| p.value.is_some()).count()
    }

    /// Present values with their dates, skipping gaps.
    pub fn present(&self) -> impl Iterator<Item = (SampleDate, f64)> + '_ {
        self.points.iter().filter_map(|p| p.value.map(|v| (p.date, v)))
    }

    /// Maximal runs of consecutive present values.
    ///
    /// A gap ends the current run; values on either side are never joined.
    pub fn runs(&self) -> Vec<Vec<(SampleDate, f64)>> {
        let mut out = Vec::new();
        let mut current = Vec::new();
        for p in &self.points {
            match p.value {
                Some(v) => current.push((p.date, v)),
                None => {
                    if !current.is_empty() {
                        out.push(std::mem::take(&mut current));
                    }
                }
            }
        }
        if !current.is_empty() {
            out.push(current);
        }
        out
    }

    /// (min, max) over present values.
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        self.present().fold(None, |acc, (_, v)| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    pub fn mean(&self) -> Option<f64> {
        let n = self.present_count();
        if n == 0 {
            return None;
        }
        Some(self.present().map(|(_, v)| v).sum::<f64>() / n as f64)
    }
}

/// Temperature and anomaly series sharing one date index.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPair {
    pub temperature: Series,
    pub anomaly: Series,
}

impl SeriesPair {
    pub fn new() -> Self {
        Self {
            temperature: Series::new(MetricKind::Mean),
            anomaly: Series::new(MetricKind::Anomaly),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            temperature: Series::with_capacity(MetricKind::Mean, capacity),
            anomaly: Series::with_capacity(MetricKind::Anomaly, capacity),
        }
    }

    pub fn series(&self, kind: MetricKind) -> &Series {
        match kind {
            MetricKind::Mean => &self.temperature,
            MetricKind::Anomaly => &self.anomaly,
        }
    }

    pub fn series_mut(&mut self, kind: MetricKind) -> &mut Series {
        match kind {
            MetricKind::Mean => &mut self.temperature,
            MetricKind::Anomaly => &mut self.anomaly,
        }
    }

    /// The shared date index.
    pub fn dates(&self) -> impl Iterator<Item = SampleDate> + '_ {
        self.temperature.points.iter().map(|p| p.date)
    }

    pub fn len(&self) -> usize {
        self.temperature.len()
    }

    pub fn is_empty(&self) -> bool {
        self.temperature.is_empty()
    }
}

impl Default for SeriesPair {
    fn default() -> Self {
        Self::new()
    }
}
