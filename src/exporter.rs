//! Partitioned CSV export.
//!
//! Writes the complete aggregate to `crimes.csv` plus one file per hour
//! of day (`crimes_00.csv` .. `crimes_23.csv`) containing only the
//! records for that hour. The 25 outputs are independent: a failure on
//! one is recorded and the rest are still attempted, and prior output is
//! never deleted.

use crate::constants::{CSV_EXTENSION, EXPORT_BASENAME, EXPORT_HEADERS, HOUR_PARTITIONS};
use crate::error::{Error, Result};
use crate::models::{ExportSummary, IncidentRecord};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Exporter for one results directory
#[derive(Debug)]
pub struct CsvExporter {
    output_dir: PathBuf,
}

impl CsvExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Write the full export and all 24 hour partitions.
    ///
    /// Returns `Error::Export` carrying the complete set of per-file
    /// failures if any output could not be written; a partial set of
    /// outputs may exist in that case.
    pub fn export(&self, records: &[IncidentRecord]) -> Result<ExportSummary> {
        std::fs::create_dir_all(&self.output_dir).map_err(|e| Error::Export {
            failures: vec![format!(
                "cannot create output directory {}: {e}",
                self.output_dir.display()
            )],
        })?;

        let mut summary = ExportSummary::default();
        let mut failures = Vec::new();

        let mut targets: Vec<(PathBuf, Option<u8>)> =
            vec![(self.partition_path(None), None)];
        for hour in 0..HOUR_PARTITIONS {
            targets.push((self.partition_path(Some(hour)), Some(hour)));
        }

        for (path, hour) in targets {
            match write_partition(&path, records, hour) {
                Ok(rows) => {
                    debug!("Wrote {} rows to {}", rows, path.display());
                    summary.rows_written += rows;
                    summary.files_written.push(path);
                }
                Err(e) => {
                    error!("Export failed for {}: {}", path.display(), e);
                    failures.push(format!("{}: {e}", path.display()));
                }
            }
        }

        if failures.is_empty() {
            info!(
                "Exported {} records into {} files under {}",
                records.len(),
                summary.files_written.len(),
                self.output_dir.display()
            );
            Ok(summary)
        } else {
            Err(Error::Export { failures })
        }
    }

    /// Output path for the full export (`None`) or an hour partition
    fn partition_path(&self, hour: Option<u8>) -> PathBuf {
        let name = match hour {
            Some(hour) => format!("{EXPORT_BASENAME}_{hour:02}.{CSV_EXTENSION}"),
            None => format!("{EXPORT_BASENAME}.{CSV_EXTENSION}"),
        };
        self.output_dir.join(name)
    }
}

/// Write one output file: the header row, then every record matching the
/// hour filter (all records when `hour` is `None`).
fn write_partition(path: &Path, records: &[IncidentRecord], hour: Option<u8>) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(EXPORT_HEADERS)?;

    let mut rows = 0usize;
    for record in records {
        if let Some(hour) = hour {
            if record.hour != hour {
                continue;
            }
        }
        writer.write_record(record.to_fields())?;
        rows += 1;
    }

    writer.flush()?;
    Ok(rows)
}
