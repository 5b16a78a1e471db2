//! Dual-axis SST chart rendered with Plotters.
//!
//! Temperature is drawn against the left axis and anomaly against the right,
//! over a shared time axis in fractional years. Gaps are never bridged: each
//! contiguous run of values becomes its own line, and a lone value becomes a dot.

use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{FontStyle, register_font};

use crate::domain::{Coordinate, Series, SeriesPair, YearRange};
use crate::error::AppError;

/// Output size in pixels (SVG uses the same units).
pub const CHART_SIZE: (u32, u32) = (1600, 900);

const FONT_FAMILY: &str = "sans-serif";
static FONT_BYTES: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

const TITLE: &str = "SST Time Series: Temperature and Anomaly";

// matplotlib's tab:blue / tab:red.
const TEMPERATURE_COLOR: RGBColor = RGBColor(31, 119, 180);
const ANOMALY_COLOR: RGBColor = RGBColor(214, 39, 40);

/// Axis ranges used when a series has no values at all.
const EMPTY_TEMPERATURE_RANGE: (f64, f64) = (0.0, 30.0);
const EMPTY_ANOMALY_RANGE: (f64, f64) = (-2.0, 2.0);

/// Display metadata that is not part of the data itself.
#[derive(Debug, Clone, Copy)]
pub struct ChartMeta {
    pub coordinate: Coordinate,
    pub years: YearRange,
}

impl ChartMeta {
    pub fn subtitle(&self) -> String {
        format!("Location: {} ({})", self.coordinate, self.years)
    }
}

/// Render `series` to `path`. `.svg` selects SVG output, anything else a bitmap.
///
/// Succeeds with empty series too; the axes and legend are still drawn.
pub fn render_chart(path: &Path, series: &SeriesPair, meta: &ChartMeta) -> Result<(), AppError> {
    register_font(FONT_FAMILY, FontStyle::Normal, FONT_BYTES)
        .map_err(|_| AppError::output("Failed to load the bundled chart font."))?;

    let is_svg = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"));

    // The two backends have different error types, so each branch maps its own.
    if is_svg {
        let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
        draw(&root, series, meta)
            .and_then(|()| root.present())
            .map_err(|e| chart_error(path, e))
    } else {
        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        draw(&root, series, meta)
            .and_then(|()| root.present())
            .map_err(|e| chart_error(path, e))
    }
}

fn chart_error(path: &Path, err: impl std::fmt::Display) -> AppError {
    AppError::output(format!("Failed to write chart '{}': {err}", path.display()))
}

fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    series: &SeriesPair,
    meta: &ChartMeta,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;
    let root = root.titled(TITLE, (FONT_FAMILY, 30).into_font())?;

    let (x0, x1) = time_bounds(meta.years);
    let (t0, t1) = padded_bounds(series.temperature.value_bounds(), EMPTY_TEMPERATURE_RANGE);
    let (a0, a1) = padded_bounds(series.anomaly.value_bounds(), EMPTY_ANOMALY_RANGE);

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(meta.subtitle(), (FONT_FAMILY, 20))
        .x_label_area_size(50)
        .y_label_area_size(70)
        .right_y_label_area_size(70)
        .build_cartesian_2d(x0..x1, t0..t1)?
        .set_secondary_coord(x0..x1, a0..a1);

    chart
        .configure_mesh()
        .light_line_style(BLACK.mix(0.04))
        .bold_line_style(BLACK.mix(0.15))
        .x_desc("Date")
        .y_desc("SST Temperature (°C)")
        .x_labels(year_label_count(meta.years))
        .x_label_formatter(&format_time_tick)
        .y_label_formatter(&|y: &f64| format!("{y:.1}"))
        .label_style((FONT_FAMILY, 14))
        .axis_desc_style((FONT_FAMILY, 18).into_font().color(&TEMPERATURE_COLOR))
        .draw()?;

    chart
        .configure_secondary_axes()
        .y_desc("SST Anomaly (°C)")
        .y_label_formatter(&|y: &f64| format!("{y:.1}"))
        .label_style((FONT_FAMILY, 14))
        .axis_desc_style((FONT_FAMILY, 18).into_font().color(&ANOMALY_COLOR))
        .draw()?;

    // Legend entries are registered on empty series so they exist even without data.
    chart
        .draw_series(LineSeries::new(
            std::iter::empty::<(f64, f64)>(),
            TEMPERATURE_COLOR.stroke_width(2),
        ))?
        .label("Temperature")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], TEMPERATURE_COLOR.stroke_width(2)));
    chart
        .draw_secondary_series(LineSeries::new(
            std::iter::empty::<(f64, f64)>(),
            ANOMALY_COLOR.stroke_width(2),
        ))?
        .label("Anomaly")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], ANOMALY_COLOR.stroke_width(2)));

    for run in plot_runs(&series.temperature) {
        if run.len() == 1 {
            chart.draw_series(run.into_iter().map(|p| Circle::new(p, 3, TEMPERATURE_COLOR.filled())))?;
        } else {
            chart.draw_series(LineSeries::new(run, TEMPERATURE_COLOR.stroke_width(2)))?;
        }
    }
    for run in plot_runs(&series.anomaly) {
        if run.len() == 1 {
            chart.draw_secondary_series(run.into_iter().map(|p| Circle::new(p, 3, ANOMALY_COLOR.filled())))?;
        } else {
            chart.draw_secondary_series(LineSeries::new(run, ANOMALY_COLOR.stroke_width(2)))?;
        }
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .label_font((FONT_FAMILY, 16))
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}

/// Contiguous runs of present values as (fractional year, value) points.
fn plot_runs(series: &Series) -> Vec<Vec<(f64, f64)>> {
    series
        .runs()
        .into_iter()
        .map(|run| run.into_iter().map(|(d, v)| (d.fractional_year(), v)).collect())
        .collect()
}

/// Time axis covering every sampled month in full.
fn time_bounds(years: YearRange) -> (f64, f64) {
    if years.is_empty() {
        let start = f64::from(years.start);
        (start, start + 1.0)
    } else {
        (f64::from(years.start), f64::from(years.end) + 1.0)
    }
}

/// Data bounds with 5% padding; `fallback` when there is no data.
fn padded_bounds(bounds: Option<(f64, f64)>, fallback: (f64, f64)) -> (f64, f64) {
    let Some((lo, hi)) = bounds else {
        return fallback;
    };
    let span = hi - lo;
    if span <= f64::EPSILON * hi.abs().max(1.0) {
        return (lo - 0.5, hi + 0.5);
    }
    let pad = span * 0.05;
    (lo - pad, hi + pad)
}

fn year_label_count(years: YearRange) -> usize {
    if years.is_empty() {
        2
    } else {
        ((years.end - years.start) as usize + 2).clamp(2, 25)
    }
}

/// `2020` on year boundaries, `2020-07` elsewhere.
fn format_time_tick(x: &f64) -> String {
    let months = (x * 12.0).round() as i64;
    let year = months.div_euclid(12);
    let month = months.rem_euclid(12) + 1;
    if month == 1 {
        format!("{year}")
    } else {
        format!("{year}-{month:02}")
    }
}
