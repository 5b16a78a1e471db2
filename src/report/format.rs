//! End-of-run summary for the terminal.

use crate::app::pipeline::Collection;
use crate::config::RunConfig;
use crate::domain::Series;

/// Format the run summary (inputs, coverage, and per-series statistics).
pub fn format_run_summary(config: &RunConfig, collection: &Collection) -> String {
    let mut out = String::new();

    out.push_str("=== sst-graph - SST Time Series ===\n");
    out.push_str(&format!("Location: {}\n", config.coordinate));
    out.push_str(&format!("Years: {}\n", config.years));
    out.push_str(&format!(
        "Samples: {} | calls={} | failed={}",
        collection.series.len(),
        collection.calls,
        collection.failed_calls
    ));
    if collection.auth_failures > 0 {
        out.push_str(&format!(" (rejected key: {})", collection.auth_failures));
    }
    out.push('\n');

    out.push_str(&format_series_line(&collection.series.temperature));
    out.push_str(&format_series_line(&collection.series.anomaly));

    out.push_str(&format!("Chart: {}", config.output.display()));
    if let Some(path) = &config.export_csv {
        out.push_str(&format!("\nCSV: {}", path.display()));
    }

    out
}

fn format_series_line(series: &Series) -> String {
    let n = series.len();
    let present = series.present_count();
    let coverage = if n == 0 {
        0.0
    } else {
        100.0 * present as f64 / n as f64
    };

    let stats = match (series.value_bounds(), series.mean()) {
        (Some((lo, hi)), Some(mean)) => {
            format!(" | min={lo:.2} mean={mean:.2} max={hi:.2} °C")
        }
        _ => String::new(),
    };

    format!(
        "{:<12} {present}/{n} ({coverage:.1}%){stats}\n",
        format!("{}:", series.kind.display_name()),
    )
}
