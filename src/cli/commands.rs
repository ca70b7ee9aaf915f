//! Command implementations for the incident processor CLI.
//!
//! Wires startup (logging, configuration, weight table), the concurrent
//! pipeline, the partitioned export, and the post-run summary together.
//! Fatal startup errors propagate out before any file processing begins.

use crate::cli::args::{Args, Commands, ProcessArgs};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::exporter::CsvExporter;
use crate::models::PipelineReport;
use crate::pipeline::Pipeline;
use crate::report;
use crate::weights::WeightTable;

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Dispatch the parsed CLI arguments
pub async fn run(args: Args, token: CancellationToken) -> Result<()> {
    match args.command {
        Some(Commands::Process(process_args)) => run_process(process_args, token).await,
        None => unreachable!("main exits early when no subcommand is given"),
    }
}

/// Execute the process command end to end
async fn run_process(args: ProcessArgs, token: CancellationToken) -> Result<()> {
    setup_logging(&args);

    info!("Starting incident processor");
    debug!("Command line arguments: {:?}", args);

    // Fatal startup stage: configuration and weight table. Nothing has
    // been read or written yet if these fail.
    let config = Arc::new(args.to_config()?);
    let weights = Arc::new(WeightTable::load(&config.weights_path)?);
    info!(
        "Loaded {} category weights from {}",
        weights.len(),
        config.weights_path.display()
    );

    let progress = if args.show_progress() {
        Some(create_progress_bar())
    } else {
        None
    };

    let pipeline = Pipeline::new(config.clone(), weights);
    let report = pipeline.run(token, progress).await?;

    export_results(&config, &report)?;

    if !args.no_summary && !args.quiet {
        report::print_summary(&report.aggregate);
    }

    Ok(())
}

/// Write the full export plus the 24 hour partitions
fn export_results(config: &PipelineConfig, report: &PipelineReport) -> Result<()> {
    let exporter = CsvExporter::new(&config.output_dir);
    let summary = exporter.export(&report.aggregate.records)?;

    info!(
        "Wrote {} output files ({} data rows) to {}",
        summary.files_written.len(),
        summary.rows_written,
        config.output_dir.display()
    );
    Ok(())
}

/// Set up structured logging to stderr based on the verbosity flags
fn setup_logging(args: &ProcessArgs) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("incident_processor={}", args.log_level())));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

/// Progress bar drawn while the worker pool drains the backlog
fn create_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb.set_message("Processing files");
    pb
}
