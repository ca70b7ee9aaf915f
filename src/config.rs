//! Configuration management and validation.
//!
//! Provides the read-only configuration object shared across the worker
//! pool: input/output locations, the coordinate bounding box, the source
//! time zone, and concurrency settings. Built once at startup, immutable,
//! and freely shared behind an `Arc`.

use crate::constants::{self, bounding_box, SOURCE_FIELD_COUNT, WORKERS_PER_CPU};
use crate::error::{Error, Result};
use crate::models::Coordinate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Rectangular coordinate filter for plausible incident locations.
///
/// Membership uses strict inequalities on every edge; points on the
/// boundary are outside.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x_lower: f64,
    pub x_upper: f64,
    pub y_lower: f64,
    pub y_upper: f64,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            x_lower: bounding_box::X_LOWER,
            x_upper: bounding_box::X_UPPER,
            y_lower: bounding_box::Y_LOWER,
            y_upper: bounding_box::Y_UPPER,
        }
    }
}

impl BoundingBox {
    /// Whether a coordinate lies strictly inside the box
    pub fn contains(&self, c: Coordinate) -> bool {
        c.x > self.x_lower && c.x < self.x_upper && c.y > self.y_lower && c.y < self.y_upper
    }
}

/// Global configuration for one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Root directory scanned for input CSV files
    pub input_dir: PathBuf,

    /// Directory receiving the full and per-hour export files
    pub output_dir: PathBuf,

    /// Path to the category weight table JSON file
    pub weights_path: PathBuf,

    /// Number of parallel workers pulling files from the shared backlog
    pub workers: usize,

    /// Expected field count for every source data row
    pub field_count: usize,

    /// Coordinate filter applied to every parsed record
    pub bounding_box: BoundingBox,

    /// Time zone source timestamps are expressed in
    pub timezone: Tz,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("crime_data"),
            output_dir: PathBuf::from("results"),
            weights_path: PathBuf::from("crime_categories.json"),
            workers: default_workers(),
            field_count: SOURCE_FIELD_COUNT,
            bounding_box: BoundingBox::default(),
            timezone: default_timezone(),
        }
    }
}

/// Default worker count: a small multiple of the available hardware
/// parallelism, to keep workers busy while some block on file IO
pub fn default_workers() -> usize {
    (num_cpus::get() * WORKERS_PER_CPU).max(1)
}

fn default_timezone() -> Tz {
    constants::DEFAULT_TIMEZONE
        .parse()
        .unwrap_or(chrono_tz::America::Los_Angeles)
}

impl PipelineConfig {
    /// Create a configuration for the given input and output locations
    pub fn new(
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        weights_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            weights_path: weights_path.into(),
            ..Default::default()
        }
    }

    /// Set the worker count (0 falls back to the hardware-based default)
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = if workers == 0 {
            default_workers()
        } else {
            workers
        };
        self
    }

    /// Set a custom bounding box
    pub fn with_bounding_box(mut self, bounding_box: BoundingBox) -> Self {
        self.bounding_box = bounding_box;
        self
    }

    /// Set the source time zone
    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    /// Validate the configuration before the run starts
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::configuration("worker count must be at least 1"));
        }
        if self.field_count == 0 {
            return Err(Error::configuration("field count must be at least 1"));
        }
        if self.bounding_box.x_lower >= self.bounding_box.x_upper
            || self.bounding_box.y_lower >= self.bounding_box.y_upper
        {
            return Err(Error::configuration("bounding box has no interior"));
        }
        if !self.input_dir.is_dir() {
            return Err(Error::configuration(format!(
                "input directory does not exist: {}",
                self.input_dir.display()
            )));
        }
        Ok(())
    }
}
