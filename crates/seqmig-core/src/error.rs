//! Error types for seqmig-core

use thiserror::Error;

/// Core error type for seqmig
#[derive(Error, Debug)]
pub enum CoreError {
    /// V001: File in the migration directory does not match `<digits>_<label>.sql`
    #[error("[V001] Invalid migration file format: {filename}")]
    InvalidFilenameFormat { filename: String },

    /// V002: Migration directory contains no migration files
    #[error("[V002] No valid SQL migration files found in {path}")]
    NoMigrationsFound { path: String },

    /// V003: Sorted sequence numbers are not exactly 0..N-1
    #[error("[V003] Migration sequence is broken: expected {expected} but got {actual}")]
    SequenceBroken { expected: u64, actual: u64 },

    /// V004: Migration directory missing or unreadable
    #[error("[V004] Cannot read migration directory {path}: {source}")]
    DirectoryUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Failed to parse configuration file
    #[error("[E002] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// E003: Invalid configuration value
    #[error("[E003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
