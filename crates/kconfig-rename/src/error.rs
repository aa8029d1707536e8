//! Error types for kconfig-rename.
//!
//! This module defines all error types used throughout the crate. Errors
//! that concern a single file carry its path so the report and the log
//! can point at it directly.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for kconfig-rename operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Symbol Errors ===
    /// A symbol name failed validation.
    #[error("invalid symbol '{symbol}': {reason}")]
    InvalidSymbol {
        /// The rejected input.
        symbol: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    // === Tree Errors ===
    /// The root directory does not exist.
    #[error("root directory not found: {path}")]
    RootNotFound {
        /// The requested root.
        path: PathBuf,
    },

    /// The root path exists but is not a directory.
    #[error("root is not a directory: {path}")]
    RootNotDirectory {
        /// The requested root.
        path: PathBuf,
    },

    /// Failed to read a file.
    #[error("failed to read {path}: {source}")]
    FileRead {
        /// Path of the file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to list a directory.
    #[error("failed to list directory {path}: {source}")]
    DirRead {
        /// Path of the directory.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file.
    #[error("failed to write {path}: {source}")]
    FileWrite {
        /// Path of the file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A Kconfig file is not valid UTF-8.
    #[error("{path} is not valid UTF-8")]
    NotUtf8 {
        /// Path of the file.
        path: PathBuf,
    },

    // === Mapping File Errors ===
    /// The mapping file could not be read.
    #[error("could not read mapping file {path}: {source}")]
    MappingFileRead {
        /// Path of the mapping file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Logging Errors ===
    /// The log file could not be opened.
    #[error("could not open log file {path}: {source}")]
    LogFile {
        /// Path of the log file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// A specialized Result type for kconfig-rename operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create an invalid symbol error.
    #[must_use]
    pub fn invalid_symbol(symbol: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidSymbol {
            symbol: symbol.into(),
            reason,
        }
    }

    /// Create a configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Check if this error is a symbol validation failure.
    #[must_use]
    pub fn is_invalid_symbol(&self) -> bool {
        matches!(self, Self::InvalidSymbol { .. })
    }
}
