//! Error types for the migration runner.

use seqmig_core::{CoreError, MigrationId};
use seqmig_db::DbError;
use thiserror::Error;

/// Migration run errors. Every variant is fatal for the run.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Pre-flight naming/sequence validation failed; the database was not contacted.
    #[error(transparent)]
    Validation(#[from] CoreError),

    /// Backend unreachable or rejected credentials (R001).
    #[error("[R001] {0}")]
    Connection(#[source] DbError),

    /// Tracking table could not be created (R002).
    #[error("[R002] Failed to create tracking table {table}: {source}")]
    StoreInit {
        table: String,
        #[source]
        source: DbError,
    },

    /// Applied set could not be read (R003).
    #[error("[R003] Failed to read applied migrations from {table}: {source}")]
    Query {
        table: String,
        #[source]
        source: DbError,
    },

    /// Migration directory could not be listed (R004).
    #[error("[R004] Failed to read migrations directory {path}: {source}")]
    ListDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A migration file could not be read (R005).
    #[error("[R005] Failed to read migration {filename}: {source}")]
    ReadFile {
        filename: String,
        #[source]
        source: std::io::Error,
    },

    /// A migration body failed to execute (R006).
    #[error("[R006] Failed to apply migration {filename}: {source}")]
    Execution {
        filename: String,
        #[source]
        source: DbError,
    },

    /// Recording the applied identifier failed (R007).
    #[error("[R007] Failed to record migration {filename}: {source}")]
    Record {
        filename: String,
        #[source]
        source: DbError,
    },

    /// The identifier is already present in the applied set (R008).
    #[error("[R008] Migration {id} is already recorded as applied")]
    DuplicateRecord { id: MigrationId },

    /// BEGIN or COMMIT around a migration failed (R009).
    #[error("[R009] Transaction for migration {filename} failed: {source}")]
    Transaction {
        filename: String,
        #[source]
        source: DbError,
    },
}

/// Result type alias for [`MigrateError`].
pub type MigrateResult<T> = Result<T, MigrateError>;

impl MigrateError {
    /// The migration file this failure is attributed to, if any
    pub fn filename(&self) -> Option<&str> {
        match self {
            MigrateError::ReadFile { filename, .. }
            | MigrateError::Execution { filename, .. }
            | MigrateError::Record { filename, .. }
            | MigrateError::Transaction { filename, .. } => Some(filename.as_str()),
            MigrateError::DuplicateRecord { id } => Some(id.as_str()),
            MigrateError::Validation(CoreError::InvalidFilenameFormat { filename }) => {
                Some(filename.as_str())
            }
            _ => None,
        }
    }
}
