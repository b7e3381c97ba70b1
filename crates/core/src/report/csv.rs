//! CSV serialization of the record set.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use super::{ReportError, TrackingRecord, CSV_HEADER};

/// Write the header row followed by one row per record.
pub fn write_report<W: Write>(writer: W, records: &[TrackingRecord]) -> Result<(), ReportError> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record(CSV_HEADER)?;
    for record in records {
        wtr.write_record(record.to_row())?;
    }

    wtr.flush()?;
    Ok(())
}

/// Create (or truncate) `path` and write the report to it.
pub fn write_report_file(path: &Path, records: &[TrackingRecord]) -> Result<(), ReportError> {
    let file = File::create(path)?;
    write_report(file, records)?;
    info!(path = %path.display(), rows = records.len(), "Report written");
    Ok(())
}

/// Sibling path used when a run aborts: `leads.csv` -> `leads.partial.csv`.
pub fn partial_output_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    let file_name = match path.extension() {
        Some(ext) => format!("{}.partial.{}", stem, ext.to_string_lossy()),
        None => format!("{}.partial", stem),
    };
    path.with_file_name(file_name)
}
