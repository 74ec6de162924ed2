use std::path::Path;

use tracing::{debug, warn};

use crate::error::{Result, SegmentError};
use crate::pipeline::BoundaryRow;
use crate::signal::Signal;

/// Header of the position column written by the inspection export
pub const DEFAULT_POSITION_COLUMN: &str = "Degree";
/// Header of the intensity column written by the inspection export
pub const DEFAULT_INTENSITY_COLUMN: &str = "Sum of Pixels";

fn column_index(headers: &csv::StringRecord, column: &str) -> Result<usize> {
    headers.iter().position(|h| h == column).ok_or_else(|| {
        SegmentError::MalformedSignal(format!(
            "column '{column}' not found (headers: {})",
            headers.iter().collect::<Vec<_>>().join(", ")
        ))
    })
}

/// Reads a position column and an intensity column from a CSV file into a [`Signal`].
///
/// Rows where either field is missing or not a number are skipped and logged.
pub fn read_signal<P: AsRef<Path>>(
    path: P,
    position_column: &str,
    intensity_column: &str,
) -> Result<Signal> {
    let path = path.as_ref();
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;

    // Read headers once and resolve both columns
    let headers = rdr.headers()?.clone();
    let pos_index = column_index(&headers, position_column)?;
    let int_index = column_index(&headers, intensity_column)?;

    let mut positions = Vec::new();
    let mut intensities = Vec::new();
    let mut skipped = 0usize;

    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        let position = record.get(pos_index).and_then(|f| f.parse::<f64>().ok());
        let intensity = record.get(int_index).and_then(|f| f.parse::<f64>().ok());
        match (position, intensity) {
            (Some(p), Some(v)) => {
                positions.push(p);
                intensities.push(v);
            }
            _ => {
                skipped += 1;
                warn!(row = row + 1, path = %path.display(), "skipping row without numeric values");
            }
        }
    }

    debug!(rows = intensities.len(), skipped, path = %path.display(), "loaded signal");
    Signal::new(positions, intensities)
}

/// Writes position, raw intensity and smoothed intensity side by side.
///
/// The first two columns carry the headers the signal was read with, so the
/// output can be loaded again with the same column names.
pub fn write_smoothed<P: AsRef<Path>>(
    path: P,
    signal: &Signal,
    smoothed: &[f64],
    position_column: &str,
    intensity_column: &str,
) -> Result<()> {
    if smoothed.len() != signal.len() {
        return Err(SegmentError::MalformedSignal(format!(
            "{} smoothed values for {} samples",
            smoothed.len(),
            signal.len()
        )));
    }

    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record([position_column, intensity_column, "Smoothed"])?;
    for ((position, raw), smooth) in signal
        .positions()
        .iter()
        .zip(signal.intensities())
        .zip(smoothed)
    {
        wtr.write_record([position.to_string(), raw.to_string(), smooth.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes one row per pattern boundary.
pub fn write_boundaries<P: AsRef<Path>>(path: P, rows: &[BoundaryRow]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record([
        "Pattern",
        "Start Index",
        "End Index",
        "Pattern Start (Degree)",
        "Pattern End (Degree)",
        "Wrapped",
    ])?;
    for row in rows {
        wtr.write_record([
            row.pattern.to_string(),
            row.start_index.to_string(),
            row.end_index.to_string(),
            row.start_position.to_string(),
            row.end_position.to_string(),
            row.wrapped.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
