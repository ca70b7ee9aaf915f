//! Application constants for the incident processor
//!
//! This module contains the source CSV field layout, timestamp layouts,
//! default filter bounds, and output naming used throughout the pipeline.

// =============================================================================
// Source CSV Layout
// =============================================================================

/// Number of fields in every data row of a source incident CSV
pub const SOURCE_FIELD_COUNT: usize = 18;

/// Positions of the fields the pipeline consumes within a source row
pub mod fields {
    /// Local timestamp of the incident
    pub const TIMESTAMP: usize = 0;

    /// Category code used for weight lookup
    pub const CATEGORY: usize = 2;

    /// Secondary descriptive code (carried through, unused downstream)
    pub const DETAIL_CODE: usize = 3;

    /// Projected x coordinate
    pub const X_COORD: usize = 9;

    /// Projected y coordinate
    pub const Y_COORD: usize = 10;

    /// Free-text gang-related flag
    pub const GANG_FLAG: usize = 14;
}

/// Minimum length of a usable timestamp field; anything shorter is a
/// date-only value and the row is skipped by the acceptance filter
pub const MIN_TIMESTAMP_LEN: usize = 10;

/// Timestamp layout for rows using `-` as the date separator
/// (e.g. `05-Jan-14 22:30:00`)
pub const TIME_FORMAT_DASHED: &str = "%d-%b-%y %H:%M:%S";

/// Timestamp layout for rows using `/` as the date separator
/// (e.g. `1/2/2014 3:04:05 PM`)
pub const TIME_FORMAT_SLASHED: &str = "%m/%d/%Y %I:%M:%S %p";

/// Strings accepted (case-insensitively) as a truthy gang-related flag
pub const GANG_FLAG_VALUES: &[&str] = &["YES", "TRUE", "Y"];

// =============================================================================
// Filter Bounds
// =============================================================================

/// Default bounding box for plausible incident locations, in the source
/// projected coordinate system. Determined empirically from coordinate
/// histograms of the source data; not verified against lat/long projections.
pub mod bounding_box {
    pub const X_LOWER: f64 = 5_500_000.0;
    pub const X_UPPER: f64 = 7_500_000.0;
    pub const Y_LOWER: f64 = 1_700_000.0;
    pub const Y_UPPER: f64 = 1_920_000.0;
}

/// IANA identifier of the time zone incident timestamps are expressed in
pub const DEFAULT_TIMEZONE: &str = "America/Los_Angeles";

// =============================================================================
// Concurrency Defaults
// =============================================================================

/// Worker multiplier applied to the detected CPU count when no explicit
/// worker count is configured
pub const WORKERS_PER_CPU: usize = 3;

/// Capacity of the worker-to-aggregator result channel
pub const RESULT_CHANNEL_CAPACITY: usize = 64;

// =============================================================================
// Output Naming
// =============================================================================

/// Basename of the full export file (`crimes.csv`)
pub const EXPORT_BASENAME: &str = "crimes";

/// Extension shared by input and output files
pub const CSV_EXTENSION: &str = "csv";

/// Header row written to every export file
pub const EXPORT_HEADERS: &[&str] = &["DoW", "Hour", "Weight", "Gang", "X", "Y"];

/// Number of hour partitions written alongside the full export
pub const HOUR_PARTITIONS: u8 = 24;
