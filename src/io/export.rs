//! Export the collected series to CSV.
//!
//! One row per sample date; an absent value is an empty cell, never `0`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::SeriesPair;
use crate::error::AppError;

/// Write `date,temperature,anomaly` rows to `path`.
pub fn write_series_csv(path: &Path, series: &SeriesPair) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::output(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(file);
    write_series(&mut out, series)
        .and_then(|()| out.flush())
        .map_err(|e| AppError::output(format!("Failed to write export CSV '{}': {e}", path.display())))
}

fn write_series<W: Write>(out: &mut W, series: &SeriesPair) -> std::io::Result<()> {
    writeln!(out, "date,temperature,anomaly")?;
    let rows = series
        .dates()
        .zip(&series.temperature.points)
        .zip(&series.anomaly.points);
    for ((date, t), a) in rows {
        writeln!(out, "{},{},{}", date, fmt_cell(t.value), fmt_cell(a.value))?;
    }
    Ok(())
}

fn fmt_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SampleDate;

    #[test]
    fn gaps_are_empty_cells() {
        let mut pair = SeriesPair::new();
        let jan = SampleDate::new(2020, 1).unwrap();
        let feb = SampleDate::new(2020, 2).unwrap();
        pair.temperature.push(jan, Some(20.5));
        pair.anomaly.push(jan, None);
        pair.temperature.push(feb, None);
        pair.anomaly.push(feb, Some(-0.25));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_series_csv(&path, &pair).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "date,temperature,anomaly\n2020-01-01,20.5,\n2020-02-01,,-0.25\n"
        );
    }

    #[test]
    fn empty_series_writes_header_only() {
        let mut buf = Vec::new();
        write_series(&mut buf, &SeriesPair::new()).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "date,temperature,anomaly\n");
    }
}
