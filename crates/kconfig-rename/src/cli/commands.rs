//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Arguments shared by commands that operate on a source tree.
#[derive(Debug, Clone, Args)]
pub struct TreeArgs {
    /// Root directory to search
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub root_dir: PathBuf,

    /// Output the report as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Rename command arguments.
#[derive(Debug, Args)]
pub struct RenameCommand {
    /// Original symbol name (e.g. ADXL362)
    pub symbol: String,

    /// New symbol name (e.g. ADI_ADXL362)
    pub new_symbol: String,

    /// Show what would be done without making changes
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub tree: TreeArgs,
}

/// Apply command arguments.
#[derive(Debug, Args)]
pub struct ApplyCommand {
    /// File with one "OLD -> NEW" mapping per line
    #[arg(value_name = "MAPPING_FILE")]
    pub mapping_file: PathBuf,

    /// Show what would be done without making changes
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub tree: TreeArgs,
}

/// Scan command arguments.
#[derive(Debug, Args)]
pub struct ScanCommand {
    /// Symbol whose family to list
    pub symbol: String,

    #[command(flatten)]
    pub tree: TreeArgs,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
