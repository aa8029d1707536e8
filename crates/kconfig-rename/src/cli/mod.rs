//! Command-line interface for kconfig-rename.
//!
//! This module provides the CLI structure for the `kcrename` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{ApplyCommand, ConfigCommand, RenameCommand, ScanCommand, TreeArgs};

/// kcrename - Rename Kconfig symbols across a source tree
///
/// Renames a symbol and every sub-symbol sharing its prefix in Kconfig
/// files, and rewrites the matching CONFIG_ references in C sources,
/// headers, CMakeLists.txt and .conf files.
#[derive(Debug, Parser)]
#[command(name = "kcrename")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = "Examples:
  kcrename rename ADXL362 ADI_ADXL362
  kcrename apply mappings.txt --dry-run
  kcrename --log-file changes.log rename ADXL362 ADI_ADXL362 -r zephyr

Mapping file format (one per line):
  ADXL362 -> ADI_ADXL362
  BME280 -> BOSCH_BME280
  # Comments are supported")]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Also write log output to this file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Rename a symbol and its sub-symbols
    Rename(RenameCommand),

    /// Rename every symbol listed in a mapping file
    Apply(ApplyCommand),

    /// List the symbols a rename would touch
    Scan(ScanCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }

    /// The configuration file in effect: `--config` if given, otherwise
    /// the default location.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(crate::config::Config::default_config_path)
    }
}
