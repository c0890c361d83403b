//! Command line interface for mutant-scan.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::types::config::CONFIG_FILE;

/// mutant-scan - detects mutant DNA and keeps a verdict tally.
#[derive(Parser, Debug)]
#[command(name = "mutant-scan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file.
    #[arg(short, long, default_value = CONFIG_FILE)]
    pub config: PathBuf,

    /// Verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Errors only.
    #[arg(short, long)]
    pub quiet: bool,

    /// Command to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Writes a default configuration and data directory.
    Init {
        /// Target directory (default: current directory).
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Analyzes one DNA grid.
    Analyze {
        /// Grid rows, e.g. `AAAA CCCC TTAT AGAC`.
        #[arg(required_unless_present = "file", conflicts_with = "file")]
        rows: Vec<String>,

        /// JSON file holding `["ROW", ...]` or `{"dna": ["ROW", ...]}`.
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Prints the mutant/human tally as JSON.
    Stats,

    /// Serves line-delimited JSON requests on stdin/stdout.
    Serve,

    /// Shows the record store status.
    Status,

    /// Shows the version.
    Version,
}
