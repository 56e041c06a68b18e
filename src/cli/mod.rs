//! Command-line interface
//!
//! `statgate serve` runs the HTTP server; `statgate ingest` pushes one
//! fixture batch through the pipeline; `statgate status` prints what the
//! pipeline knows about a dataset.

pub mod args;
pub mod commands;
pub mod errors;

pub use args::{Cli, Command};
pub use commands::run_command;
pub use errors::{CliError, CliResult};
