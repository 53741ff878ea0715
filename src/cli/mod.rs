use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

#[derive(Parser)]
#[command(name = "ingest-admin")]
#[command(about = "Lock inbound ingestion directories for processing")]
#[command(long_about = "ingest-admin atomically renames ROOT/in to ROOT/locked, the signal downstream \
                       ingestion waits on. The outcome is persisted in ROOT/ingest.state.json so an \
                       interrupted or failed transition can be resumed with --resume.")]
pub struct Cli {
    /// Additional configuration file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rename ROOT/in to ROOT/locked
    Lock {
        /// Root directory to administer (defaults to admin.root from configuration)
        root: Option<PathBuf>,
        /// Retry after a pending or failed attempt
        #[arg(long, help = "Retry a transition whose previous attempt is pending or failed")]
        resume: bool,
    },
    /// Show the recorded and observed state of a root
    Status {
        /// Root directory to inspect (defaults to admin.root from configuration)
        root: Option<PathBuf>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
        /// Exit non-zero unless the root is ready for ingestion
        #[arg(long, help = "Exit with status 1 unless ROOT/locked is ready for ingestion")]
        check_ready: bool,
    },
    /// Print the effective configuration
    Config,
}
