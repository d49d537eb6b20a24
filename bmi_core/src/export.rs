//! CSV export of a user's history.

use crate::{MeasurementRecord, Result};
use std::io::Write;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    date: String,
    weight_kg: f64,
    height_cm: f64,
    bmi: f64,
    category: &'a str,
}

impl<'a> From<&'a MeasurementRecord> for CsvRow<'a> {
    fn from(record: &'a MeasurementRecord) -> Self {
        CsvRow {
            date: record.timestamp_label(),
            weight_kg: record.weight_kg,
            height_cm: record.height_cm,
            bmi: record.bmi,
            category: record.category.name(),
        }
    }
}

/// Write records as CSV (with headers) to any writer
pub fn write_history_csv<W: Write>(writer: W, history: &[MeasurementRecord]) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in history {
        csv_writer.serialize(CsvRow::from(record))?;
    }
    csv_writer.flush()?;
    Ok(history.len())
}

/// Export records to a CSV file, replacing it if present
pub fn export_history_csv(path: &Path, history: &[MeasurementRecord]) -> Result<usize> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = std::fs::File::create(path)?;
    let count = write_history_csv(std::io::BufWriter::new(file), history)?;
    tracing::info!("Exported {} entries to {:?}", count, path);
    Ok(count)
}
