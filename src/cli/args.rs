//! CLI argument definitions using clap
//!
//! Commands:
//! - statgate serve --config <path> --data-dir <path> [--port <port>]
//! - statgate ingest --config <path> --data-dir <path> --sport ... --file <records.json>
//! - statgate status --config <path> --data-dir <path> --sport ...

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// statgate - Atomic dataset commit & serve pipeline for sports data
#[derive(Parser, Debug)]
#[command(name = "statgate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Identity tuple flags shared by ingest and status
#[derive(Args, Debug, Clone)]
pub struct IdentityArgs {
    /// Sport, e.g. "baseball"
    #[arg(long)]
    pub sport: String,

    /// Competition level, e.g. "mlb"
    #[arg(long)]
    pub level: String,

    /// Season label, e.g. "2026"
    #[arg(long)]
    pub season: String,

    /// Dataset type, e.g. "rankings"
    #[arg(long = "dataset-type")]
    pub dataset_type: String,

    /// Optional qualifier, e.g. a division
    #[arg(long)]
    pub qualifier: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./statgate.json")]
        config: PathBuf,

        /// Object-store root directory
        #[arg(long, default_value = "./statgate-data")]
        data_dir: PathBuf,

        /// Port override
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run one ingestion from a JSON records file and exit
    Ingest {
        /// Path to configuration file
        #[arg(long, default_value = "./statgate.json")]
        config: PathBuf,

        /// Object-store root directory
        #[arg(long, default_value = "./statgate-data")]
        data_dir: PathBuf,

        #[command(flatten)]
        identity: IdentityArgs,

        /// JSON file holding the record array
        #[arg(long)]
        file: PathBuf,

        /// Schema version the records claim to conform to
        #[arg(long)]
        schema_version: Option<String>,

        /// Source tag recorded on the commit row
        #[arg(long, default_value = "cli")]
        source: String,
    },

    /// Print pipeline state for a dataset and exit
    Status {
        /// Path to configuration file
        #[arg(long, default_value = "./statgate.json")]
        config: PathBuf,

        /// Object-store root directory
        #[arg(long, default_value = "./statgate-data")]
        data_dir: PathBuf,

        #[command(flatten)]
        identity: IdentityArgs,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
