//! Incident Processor Library
//!
//! A Rust library for batch ingestion of geolocated incident records from
//! heterogeneous CSV files into a single validated aggregate, with
//! partitioned CSV exports.
//!
//! This library provides tools for:
//! - Scanning an input directory for incident CSV files
//! - Parsing and validating raw rows against a bounding box and timestamp
//!   acceptance filter
//! - Enriching records with weights from a category weight table
//! - Concurrent file processing through a pull-based worker pool with
//!   race-free aggregation
//! - Writing a full CSV export plus 24 hour-of-day partitions

pub mod config;
pub mod constants;
pub mod error;
pub mod exporter;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod weights;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use config::{BoundingBox, PipelineConfig};
pub use error::{Error, Result};
pub use models::{AggregateState, IncidentRecord, PipelineReport};
pub use pipeline::Pipeline;
pub use weights::WeightTable;
