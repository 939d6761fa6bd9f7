//! seqmig-runner - Applies numbered SQL migrations exactly once
//!
//! This crate ties the pieces together: it validates a migration
//! directory, opens one database connection, and applies every file that
//! is not yet in the applied set, recording each one as it goes.

pub mod error;
pub mod runner;
pub mod status;
pub mod tracker;

pub use error::{MigrateError, MigrateResult};
pub use runner::{
    first_order_mismatch, list_candidates, pending_queue, sort_candidates, MigrationEvent,
    MigrationRunner, RunSummary,
};
pub use status::{StatusEntry, StatusReport};
pub use tracker::AppliedSetTracker;

use seqmig_core::{validate_migration_dir, MigrateConfig};

/// Validate, connect, apply, release.
///
/// Validation happens before any connection is attempted, so a badly named
/// or out-of-sequence directory never touches the database. The connection
/// is dropped when this returns, on success or failure.
pub async fn migrate<F>(config: &MigrateConfig, observer: F) -> MigrateResult<RunSummary>
where
    F: FnMut(MigrationEvent<'_>),
{
    let set = validate_migration_dir(&config.migration_dir)?;
    log::debug!(
        "Validated {} migrations in {}",
        set.len(),
        config.migration_dir.display()
    );

    let db = seqmig_db::connect(&config.database)
        .await
        .map_err(MigrateError::Connection)?;
    log::debug!("Connected to {}", config.database.describe());

    let runner = MigrationRunner::new(db.as_ref(), config);
    let summary = runner.run(observer).await?;
    Ok(summary)
}

/// Report which files are applied and which are pending, without applying any.
pub async fn status(config: &MigrateConfig) -> MigrateResult<StatusReport> {
    let db = seqmig_db::connect(&config.database)
        .await
        .map_err(MigrateError::Connection)?;
    let runner = MigrationRunner::new(db.as_ref(), config);
    let report = runner.status().await?;
    Ok(report)
}
