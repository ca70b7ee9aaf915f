//! Command-line argument definitions for the incident processor.
//!
//! Defines the CLI surface using the clap derive API. The `process`
//! subcommand carries everything needed to build a [`PipelineConfig`].

use crate::config::{default_workers, PipelineConfig};
use crate::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for the incident data processor
///
/// Ingests a directory of geolocated incident CSV files, filters and
/// normalizes every record through a concurrent worker pool, and writes a
/// full CSV export plus 24 per-hour partitions.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "incident-processor",
    version,
    about = "Concurrent batch processor for geolocated incident CSV data"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Ingest incident CSV files and write partitioned exports
    Process(ProcessArgs),
}

/// Arguments for the process command
#[derive(Debug, Clone, Parser)]
pub struct ProcessArgs {
    /// Root directory scanned recursively for `.csv` input files
    #[arg(
        short = 'i',
        long = "input",
        value_name = "PATH",
        default_value = "crime_data",
        help = "Input directory containing incident CSV files"
    )]
    pub input_dir: PathBuf,

    /// Directory receiving crimes.csv and the 24 hour partitions
    ///
    /// Created if it does not exist. Existing files are overwritten but
    /// never deleted up front.
    #[arg(
        short = 'o',
        long = "output",
        value_name = "PATH",
        default_value = "results",
        help = "Output directory for the partitioned CSV exports"
    )]
    pub output_dir: PathBuf,

    /// Path to the category weight table
    ///
    /// A JSON object mapping category code strings to small integer
    /// weights. Missing or malformed content aborts the run before any
    /// file processing begins.
    #[arg(
        short = 'w',
        long = "weights",
        value_name = "FILE",
        default_value = "crime_categories.json",
        help = "Path to the category weight table JSON file"
    )]
    pub weights_path: PathBuf,

    /// Number of parallel workers
    ///
    /// Controls how many input files are read concurrently. Defaults to
    /// three times the detected CPU count; 0 selects the default.
    #[arg(
        short = 'j',
        long = "workers",
        value_name = "COUNT",
        default_value_t = 0,
        help = "Number of parallel workers (0 = 3x CPU count)"
    )]
    pub workers: usize,

    /// Skip the post-run console summary
    #[arg(long = "no-summary", help = "Skip the post-run summary report")]
    pub no_summary: bool,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: debug, -vv: trace)"
    )]
    pub verbose: u8,

    /// Only show errors; disables the progress bar
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

impl ProcessArgs {
    /// Build the pipeline configuration from the CLI arguments
    pub fn to_config(&self) -> Result<PipelineConfig> {
        let workers = if self.workers == 0 {
            default_workers()
        } else {
            self.workers
        };

        let config = PipelineConfig::new(&self.input_dir, &self.output_dir, &self.weights_path)
            .with_workers(workers);
        config.validate()?;
        Ok(config)
    }

    /// tracing filter directive implied by the verbosity flags
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }

    /// Whether to draw the progress bar
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}
