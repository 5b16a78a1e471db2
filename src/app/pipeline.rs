//! The collection loop: dates -> point queries -> `SeriesPair`.
//!
//! Strictly sequential. One request is in flight at a time, with a fixed pause
//! between consecutive requests. A failed request leaves a gap at its position
//! and the loop moves on; nothing is retried.

use std::time::Duration;

use crate::data::dates::MonthlyDates;
use crate::data::sst::{FetchError, PointSource};
use crate::domain::{Coordinate, MetricKind, SampleDate, SeriesPair};

/// Progress is logged at the first sample and every this many samples.
const PROGRESS_EVERY: usize = 12;

/// Everything the collection loop produced.
#[derive(Debug, Clone)]
pub struct Collection {
    pub series: SeriesPair,
    /// Requests issued (2 per sample date).
    pub calls: usize,
    pub failed_calls: usize,
    /// Subset of `failed_calls` rejected with 401/403.
    pub auth_failures: usize,
}

/// Fetch both metrics for every date, pausing `delay` between calls.
pub fn collect_series<S>(
    source: &S,
    coord: &Coordinate,
    dates: &MonthlyDates,
    delay: Duration,
) -> Collection
where
    S: PointSource + ?Sized,
{
    collect_series_with(source, coord, dates, delay, std::thread::sleep)
}

/// As `collect_series`, with the pause supplied by the caller.
pub fn collect_series_with<S, F>(
    source: &S,
    coord: &Coordinate,
    dates: &MonthlyDates,
    delay: Duration,
    mut pause: F,
) -> Collection
where
    S: PointSource + ?Sized,
    F: FnMut(Duration),
{
    let total = dates.len();
    let range = dates.range();
    tracing::info!(
        "Collecting data for {total} monthly samples from {} to {} at {coord}...",
        range.start,
        range.end
    );

    if dates.is_empty() {
        tracing::warn!("No sample dates in {range}; the chart will have no data.");
    }

    let mut out = Collection {
        series: SeriesPair::with_capacity(total),
        calls: 0,
        failed_calls: 0,
        auth_failures: 0,
    };

    for (i, date) in dates.iter().enumerate() {
        if i == 0 || (i + 1) % PROGRESS_EVERY == 0 {
            tracing::info!(
                "Progress: {}/{} ({:.1}%)",
                i + 1,
                total,
                100.0 * (i + 1) as f64 / total as f64
            );
        }

        for metric in MetricKind::ALL {
            if out.calls > 0 && !delay.is_zero() {
                pause(delay);
            }
            out.calls += 1;

            let value = match source.fetch_point(coord, date, metric) {
                Ok(v) => Some(v),
                Err(err) => {
                    out.failed_calls += 1;
                    if err.is_auth() {
                        out.auth_failures += 1;
                    }
                    warn_failure(date, metric, &err);
                    None
                }
            };
            out.series.series_mut(metric).push(date, value);
        }
    }

    tracing::info!(
        "Data collection complete. Retrieved {} temperature values and {} anomaly values.",
        out.series.temperature.present_count(),
        out.series.anomaly.present_count()
    );
    if out.calls > 0 && out.auth_failures == out.calls {
        tracing::warn!("Every request was rejected by the API; the API key is probably invalid.");
    }

    out
}

fn warn_failure(date: SampleDate, metric: MetricKind, err: &FetchError) {
    if err.is_auth() {
        tracing::warn!("API key rejected for {date} ({metric}): {err}");
    } else {
        tracing::warn!("No {metric} value for {date}: {err}");
    }
}
