//! CLI type definitions
//!
//! Clap structures that define the command-line interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "objective-sync")]
#[command(about = "Keep live objective instances in sync with a remote progress service", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Load configuration from this YAML file instead of .objective-sync/
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full sync and completion poll until interrupted
    Run {
        /// Override the completion poll period (milliseconds)
        #[arg(long)]
        poll_interval_ms: Option<u64>,

        /// Override the live instance capacity
        #[arg(long)]
        capacity: Option<usize>,
    },

    /// List every objective with its progress
    Status,

    /// Mark an objective completed
    Complete {
        /// Objective name (case-sensitive)
        name: String,
    },

    /// Mark an objective not completed
    Reset {
        /// Objective name (case-sensitive)
        name: String,
    },

    /// List names of completed objectives
    Completed,

    /// List names of objectives not yet completed
    Pending,
}
