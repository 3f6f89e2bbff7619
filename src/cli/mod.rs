//! CLI module
//!
//! Command-line interface for running the tap.
//!
//! # Commands
//!
//! - `spec` - Show the configuration specification
//! - `check` - Test connection to the API
//! - `discover` - Print the Singer catalog
//! - `read` - Extract records from streams
//! - `streams` - List stream names (lightweight)

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
