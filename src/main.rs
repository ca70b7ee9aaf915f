use clap::Parser;
use incident_processor::cli::{args::Args, commands};
use std::process;
use tokio_util::sync::CancellationToken;

fn main() {
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        // Cancellation token for coordinating graceful shutdown
        let cancellation_token = CancellationToken::new();

        let shutdown_signal = async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to install CTRL+C signal handler");

            cancellation_token.cancel();
        };

        tokio::select! {
            result = commands::run(args, cancellation_token.clone()) => {
                result
            }
            _ = shutdown_signal => {
                eprintln!("\nReceived CTRL+C, shutting down gracefully...");
                Err(incident_processor::Error::interrupted(
                    "Processing interrupted by user",
                ))
            }
        }
    });

    match result {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            // partial export failures leave usable output behind; give them
            // a distinct exit code
            process::exit(if error.is_fatal() { 1 } else { 2 });
        }
    }
}

/// Show help information when no subcommand is provided
fn show_help_and_commands() {
    println!("Incident Processor - Geolocated Incident Data Pipeline");
    println!("======================================================");
    println!();
    println!("Ingest a directory of incident CSV files, filter and normalize every");
    println!("record, and write a full CSV export plus 24 per-hour partitions.");
    println!();
    println!("USAGE:");
    println!("    incident-processor <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    process     Ingest incident CSVs and write partitioned exports");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("EXAMPLES:");
    println!("    # Process ./crime_data into ./results with the default weight table:");
    println!("    incident-processor process");
    println!();
    println!("    # Custom locations and a fixed worker count:");
    println!("    incident-processor process --input /data/incidents --output /data/results \\");
    println!("                               --weights categories.json --workers 8");
    println!();
    println!("For detailed help on any command, use:");
    println!("    incident-processor <COMMAND> --help");
}
