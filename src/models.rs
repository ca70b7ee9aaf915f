//! Core data structures for incident processing.
//!
//! Defines the validated incident record, per-file processing results,
//! the run-wide aggregate, and processing statistics.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A point in the source projected coordinate system
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

/// One validated, enriched incident event.
///
/// Created exactly once by the record parser from a raw CSV row and
/// immutable thereafter. Every record that exists has a location strictly
/// inside the configured bounding box; rows failing that filter (or the
/// timestamp acceptance filter) are never materialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentRecord {
    /// Hour of day the incident occurred, 0..=23
    pub hour: u8,
    /// Day of week the incident occurred, 0..=6 with Sunday = 0
    pub weekday: u8,
    /// Category code from the source row
    pub category: String,
    /// Secondary descriptive code from the source row, unused downstream
    pub detail_code: String,
    /// Weight resolved from the category weight table (0 for unknown codes)
    pub weight: u8,
    /// Whether the source flagged the incident as gang related
    pub gang_related: bool,
    /// Incident location in the source projected coordinate system
    pub location: Coordinate,
}

impl IncidentRecord {
    /// Render the record as export fields in the fixed output column order
    /// (weekday, hour, weight, gang flag, x, y)
    pub fn to_fields(&self) -> [String; 6] {
        [
            self.weekday.to_string(),
            self.hour.to_string(),
            self.weight.to_string(),
            self.gang_related.to_string(),
            self.location.x.to_string(),
            self.location.y.to_string(),
        ]
    }
}

/// Per-file processing summary produced by exactly one worker and folded
/// into the aggregate exactly once.
#[derive(Debug, Default)]
pub struct FileResult {
    /// Records accepted from this file, in file order
    pub records: Vec<IncidentRecord>,
    /// Raw data rows read from this file, including rows that failed
    /// validation or were skipped by the acceptance filter
    pub rows_read: usize,
    /// Rows skipped because they were malformed rather than filtered
    pub rows_malformed: usize,
}

/// Run-wide accumulator.
///
/// Mutated only by the aggregation funnel, one fold at a time; read-only
/// once the pipeline completes. Record order is unspecified.
#[derive(Debug, Default)]
pub struct AggregateState {
    pub records: Vec<IncidentRecord>,
    pub rows_read: usize,
}

impl AggregateState {
    /// Fold one file's results into the aggregate.
    ///
    /// The caller must guarantee folds are serialized; the pipeline does so
    /// by funnelling every `FileResult` through a single consuming loop.
    pub fn fold(&mut self, result: FileResult) {
        self.records.extend(result.records);
        self.rows_read += result.rows_read;
    }

    /// Number of accepted records in the aggregate
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows rejected by validation or the acceptance filter
    pub fn rows_rejected(&self) -> usize {
        self.rows_read.saturating_sub(self.records.len())
    }
}

/// Statistics for one pipeline run
#[derive(Debug, Default, Clone)]
pub struct ProcessingStats {
    /// Files read to completion
    pub files_processed: usize,
    /// Files that could not be opened
    pub files_failed: usize,
    /// Rows skipped because they were malformed (wrong arity, CSV error)
    pub rows_malformed: usize,
    /// Total processing time
    pub processing_time: std::time::Duration,
}

impl ProcessingStats {
    /// Files processed per second over the whole run
    pub fn files_per_second(&self) -> f64 {
        if self.processing_time.as_secs_f64() > 0.0 {
            self.files_processed as f64 / self.processing_time.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// Complete outcome of a pipeline run: the final aggregate plus run statistics
#[derive(Debug)]
pub struct PipelineReport {
    pub aggregate: AggregateState,
    pub stats: ProcessingStats,
}

/// Outcome of the export stage
#[derive(Debug, Default)]
pub struct ExportSummary {
    /// Output files written successfully
    pub files_written: Vec<PathBuf>,
    /// Total data rows written across all output files
    pub rows_written: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(hour: u8) -> IncidentRecord {
        IncidentRecord {
            hour,
            weekday: 2,
            category: "BURG".to_string(),
            detail_code: "0310".to_string(),
            weight: 4,
            gang_related: false,
            location: Coordinate {
                x: 6_480_464.8,
                y: 1_830_021.8,
            },
        }
    }

    #[test]
    fn test_fold_accumulates_records_and_counts() {
        let mut aggregate = AggregateState::default();

        aggregate.fold(FileResult {
            records: vec![record(1), record(2)],
            rows_read: 5,
            rows_malformed: 0,
        });
        aggregate.fold(FileResult {
            records: vec![record(3)],
            rows_read: 4,
            rows_malformed: 1,
        });

        assert_eq!(aggregate.len(), 3);
        assert_eq!(aggregate.rows_read, 9);
        assert_eq!(aggregate.rows_rejected(), 6);
    }

    #[test]
    fn test_fold_empty_file_result() {
        let mut aggregate = AggregateState::default();
        aggregate.fold(FileResult::default());

        assert!(aggregate.is_empty());
        assert_eq!(aggregate.rows_read, 0);
    }

    #[test]
    fn test_export_field_order() {
        let fields = record(22).to_fields();

        assert_eq!(fields[0], "2"); // weekday
        assert_eq!(fields[1], "22"); // hour
        assert_eq!(fields[2], "4"); // weight
        assert_eq!(fields[3], "false"); // gang flag
        assert_eq!(fields[4], "6480464.8");
        assert_eq!(fields[5], "1830021.8");
    }

    #[test]
    fn test_coordinate_fields_render_without_exponent() {
        let c = Coordinate {
            x: 6_000_000.0,
            y: 1_800_000.5,
        };
        assert_eq!(c.x.to_string(), "6000000");
        assert_eq!(c.y.to_string(), "1800000.5");
    }

    #[test]
    fn test_stats_files_per_second() {
        let stats = ProcessingStats {
            files_processed: 10,
            processing_time: std::time::Duration::from_secs(5),
            ..Default::default()
        };
        assert!((stats.files_per_second() - 2.0).abs() < f64::EPSILON);

        let zero = ProcessingStats::default();
        assert_eq!(zero.files_per_second(), 0.0);
    }
}
