//! `kconfig-rename` - Rename Kconfig symbols across a source tree
//!
//! This library finds a Kconfig symbol and its sub-symbols, derives their
//! new names from a replacement prefix, and rewrites every reference in
//! Kconfig files and in `CONFIG_` references of C, CMake and `.conf` files.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod logging;
pub mod mapping;
pub mod renamer;
pub mod rewrite;
pub mod symbol;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use mapping::MappingFile;
pub use renamer::{BatchReport, RenameReport, Renamer, ScanReport};
pub use symbol::{Symbol, SymbolMap};
