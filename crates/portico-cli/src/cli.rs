//! CLI command definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Portico - Manifest-driven adapter wiring
#[derive(Parser)]
#[command(name = "portico")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Validate a manifest file
    Validate {
        /// Manifest file (.yaml, .yml or .json)
        path: PathBuf,

        /// Also resolve every enabled port against the reference modules
        #[arg(short, long)]
        resolve: bool,
    },

    /// Print the manifest schema as JSON
    Schema {
        /// Print the per-adapter entry schema instead
        #[arg(short, long)]
        adapter: bool,
    },

    /// List ports and the callbacks their adapters must export
    Ports {
        /// Print as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}
