//! Record parsing and validation for raw incident CSV rows.
//!
//! The parser is a pure function of one raw row, the pipeline
//! configuration, and the read-only weight table. It produces either a
//! validated [`IncidentRecord`] or nothing: incomplete timestamps and
//! out-of-box locations are deliberate acceptance filters, not errors.
//! The only error it reports is a row whose arity does not match the
//! configured field count.

use crate::config::PipelineConfig;
use crate::constants::{
    fields, GANG_FLAG_VALUES, MIN_TIMESTAMP_LEN, TIME_FORMAT_DASHED, TIME_FORMAT_SLASHED,
};
use crate::models::{Coordinate, IncidentRecord};
use crate::weights::WeightTable;
use chrono::{Datelike, NaiveDateTime, TimeZone, Timelike};
use csv::StringRecord;
use std::sync::Arc;
use tracing::trace;

/// A row whose field count does not match the configured schema.
///
/// Carries no location context; the worker that owns the file wraps it
/// into [`crate::Error::SchemaMismatch`] with path and line number.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("expected {expected} fields, found {found}")]
pub struct ArityMismatch {
    pub expected: usize,
    pub found: usize,
}

/// Stateless row parser shared read-only across all workers
#[derive(Debug, Clone)]
pub struct RecordParser {
    config: Arc<PipelineConfig>,
    weights: Arc<WeightTable>,
}

impl RecordParser {
    pub fn new(config: Arc<PipelineConfig>, weights: Arc<WeightTable>) -> Self {
        Self { config, weights }
    }

    /// Parse one raw data row into a validated record.
    ///
    /// Returns `Ok(None)` when the row is intentionally filtered out:
    /// - the timestamp field is empty or too short to carry a time of day
    /// - the timestamp does not parse under the layout its separator selects
    /// - either coordinate fails to parse, or the point lies outside the
    ///   configured bounding box
    ///
    /// Earlier versions constructed a zero-hour record on timestamp parse
    /// failure; such rows are now rejected outright so that hour 0 in the
    /// output only ever means midnight.
    pub fn parse_row(
        &self,
        record: &StringRecord,
    ) -> Result<Option<IncidentRecord>, ArityMismatch> {
        if record.len() != self.config.field_count {
            return Err(ArityMismatch {
                expected: self.config.field_count,
                found: record.len(),
            });
        }

        let raw_timestamp = record.get(fields::TIMESTAMP).unwrap_or("").trim();
        if raw_timestamp.len() < MIN_TIMESTAMP_LEN {
            trace!("Skipping row with incomplete timestamp: '{raw_timestamp}'");
            return Ok(None);
        }

        let Some(occurred_at) = self.parse_timestamp(raw_timestamp) else {
            trace!("Skipping row with unparsable timestamp: '{raw_timestamp}'");
            return Ok(None);
        };

        let Some(location) = self.parse_location(record) else {
            return Ok(None);
        };

        let category = record.get(fields::CATEGORY).unwrap_or("").to_string();
        let detail_code = record.get(fields::DETAIL_CODE).unwrap_or("").to_string();
        let gang_related = is_gang_related(record.get(fields::GANG_FLAG).unwrap_or(""));
        let weight = self.weights.weight_for(&category);

        Ok(Some(IncidentRecord {
            hour: occurred_at.hour() as u8,
            weekday: occurred_at.weekday().num_days_from_sunday() as u8,
            category,
            detail_code,
            weight,
            gang_related,
            location,
        }))
    }

    /// Parse the timestamp under the layout selected by its date separator
    /// and localize it to the configured time zone.
    fn parse_timestamp(&self, raw: &str) -> Option<chrono::DateTime<chrono_tz::Tz>> {
        let format = if raw.contains('-') {
            TIME_FORMAT_DASHED
        } else if raw.contains('/') {
            TIME_FORMAT_SLASHED
        } else {
            return None;
        };

        let naive = NaiveDateTime::parse_from_str(raw, format).ok()?;

        // DST gaps make a wall-clock time unmappable and folds make it
        // ambiguous; take the earliest valid instant in either case.
        self.config.timezone.from_local_datetime(&naive).earliest()
    }

    /// Parse the coordinate fields and apply the bounding-box filter
    fn parse_location(&self, record: &StringRecord) -> Option<Coordinate> {
        let x = record.get(fields::X_COORD)?.trim().parse::<f64>().ok()?;
        let y = record.get(fields::Y_COORD)?.trim().parse::<f64>().ok()?;

        let location = Coordinate { x, y };
        if self.config.bounding_box.contains(location) {
            Some(location)
        } else {
            trace!("Skipping row with out-of-box location ({x}, {y})");
            None
        }
    }
}

/// Resolve the free-text gang-related flag against the allow-list,
/// case-insensitively. Anything not on the list is `false`.
fn is_gang_related(raw: &str) -> bool {
    let upper = raw.trim().to_uppercase();
    GANG_FLAG_VALUES.contains(&upper.as_str())
}
