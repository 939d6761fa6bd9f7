//! Migration runner.
//!
//! A run is strictly linear: ensure the tracking table, load the applied
//! set, list candidate files, then for each file either skip it (already
//! recorded) or apply it and record it. The first failure ends the run;
//! nothing is retried and earlier migrations are left in place.

use crate::error::{MigrateError, MigrateResult};
use crate::tracker::AppliedSetTracker;
use seqmig_core::{ApplyOrder, MigrateConfig, MigrationFile, MigrationId};
use seqmig_db::Database;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

/// Progress notification emitted while a run is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationEvent<'a> {
    /// Already in the applied set; not executed
    Skipped(&'a str),
    /// About to execute
    Applying(&'a str),
    /// Executed and recorded
    Applied(&'a str),
    /// Another process recorded it first; this run rolled back its attempt
    AppliedElsewhere(&'a str),
}

/// Outcome of a completed run, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub applied: Vec<MigrationId>,
    pub skipped: Vec<MigrationId>,
    pub applied_elsewhere: Vec<MigrationId>,
}

enum ApplyOutcome {
    Applied,
    AppliedElsewhere,
}

/// Applies pending migrations from `config.migration_dir` through `db`.
pub struct MigrationRunner<'a> {
    db: &'a dyn Database,
    config: &'a MigrateConfig,
    tracker: AppliedSetTracker<'a>,
}

impl<'a> MigrationRunner<'a> {
    pub fn new(db: &'a dyn Database, config: &'a MigrateConfig) -> Self {
        Self {
            db,
            config,
            tracker: AppliedSetTracker::new(db, &config.tracking_table),
        }
    }

    /// The applied-set tracker this runner records through
    pub fn tracker(&self) -> &AppliedSetTracker<'a> {
        &self.tracker
    }

    pub fn config(&self) -> &'a MigrateConfig {
        self.config
    }

    /// Apply every pending migration once, in order, halting on the first failure.
    pub async fn run<F>(&self, mut observer: F) -> MigrateResult<RunSummary>
    where
        F: FnMut(MigrationEvent<'_>),
    {
        self.tracker.ensure_store().await?;
        let applied = self.tracker.load_applied().await?;
        let candidates = list_candidates(&self.config.migration_dir, self.config.order)?;
        log::debug!(
            "{} candidate files, {} recorded, order={}, transactional={}",
            candidates.len(),
            applied.len(),
            self.config.order,
            self.config.transactional
        );

        let mut summary = RunSummary::default();
        for id in candidates {
            if applied.contains(&id) {
                log::debug!("Skipping already applied migration {}", id);
                observer(MigrationEvent::Skipped(&id));
                summary.skipped.push(id);
                continue;
            }

            observer(MigrationEvent::Applying(&id));
            let sql = self.read_migration(&id)?;

            let outcome = if self.config.transactional {
                self.apply_in_transaction(&id, &sql).await?
            } else {
                self.apply_then_record(&id, &sql).await?
            };

            match outcome {
                ApplyOutcome::Applied => {
                    log::info!("Applied migration {}", id);
                    observer(MigrationEvent::Applied(&id));
                    summary.applied.push(id);
                }
                ApplyOutcome::AppliedElsewhere => {
                    log::warn!("Migration {} was recorded by another process; skipped", id);
                    observer(MigrationEvent::AppliedElsewhere(&id));
                    summary.applied_elsewhere.push(id);
                }
            }
        }

        Ok(summary)
    }

    fn read_migration(&self, id: &MigrationId) -> MigrateResult<String> {
        let path = self.config.migration_dir.join(id.as_str());
        std::fs::read_to_string(&path).map_err(|source| MigrateError::ReadFile {
            filename: id.to_string(),
            source,
        })
    }

    /// Claim the identifier, run the body, commit, all in one transaction.
    ///
    /// The record row is inserted first so that a concurrent runner blocks
    /// on the primary key and then sees a duplicate instead of re-running
    /// the body. Any failure rolls back both the body and the record.
    async fn apply_in_transaction(
        &self,
        id: &MigrationId,
        sql: &str,
    ) -> MigrateResult<ApplyOutcome> {
        self.db
            .begin()
            .await
            .map_err(|source| MigrateError::Transaction {
                filename: id.to_string(),
                source,
            })?;

        match self.tracker.record_applied(id).await {
            Ok(()) => {}
            Err(MigrateError::DuplicateRecord { .. }) => {
                self.rollback_quietly(id).await;
                return Ok(ApplyOutcome::AppliedElsewhere);
            }
            Err(err) => {
                self.rollback_quietly(id).await;
                return Err(err);
            }
        }

        if let Err(source) = self.db.execute_batch(sql).await {
            self.rollback_quietly(id).await;
            return Err(MigrateError::Execution {
                filename: id.to_string(),
                source,
            });
        }

        if let Err(source) = self.db.commit().await {
            self.rollback_quietly(id).await;
            return Err(MigrateError::Transaction {
                filename: id.to_string(),
                source,
            });
        }
        Ok(ApplyOutcome::Applied)
    }

    /// Run the body, then record it, as two independent steps.
    ///
    /// A record failure leaves the body applied but unrecorded; the next run
    /// will attempt it again.
    async fn apply_then_record(&self, id: &MigrationId, sql: &str) -> MigrateResult<ApplyOutcome> {
        self.db
            .execute_batch(sql)
            .await
            .map_err(|source| MigrateError::Execution {
                filename: id.to_string(),
                source,
            })?;
        self.tracker.record_applied(id).await?;
        Ok(ApplyOutcome::Applied)
    }

    async fn rollback_quietly(&self, id: &MigrationId) {
        if let Err(e) = self.db.rollback().await {
            log::warn!("Rollback after {} failed: {}", id, e);
        }
    }
}

/// List `.sql` files directly inside `dir` (no recursion), ordered for application.
pub fn list_candidates(dir: &Path, order: ApplyOrder) -> MigrateResult<Vec<MigrationId>> {
    let list_err = |source| MigrateError::ListDir {
        path: dir.display().to_string(),
        source,
    };

    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(list_err)? {
        let entry = entry.map_err(list_err)?;
        let path = entry.path();
        if !path.is_file() || !path.extension().is_some_and(|e| e == "sql") {
            continue;
        }
        if let Some(id) = MigrationId::try_new(entry.file_name().to_string_lossy()) {
            names.push(id);
        }
    }

    sort_candidates(&mut names, order);
    if order == ApplyOrder::Lexicographic {
        if let Some((earlier, later)) = first_order_mismatch(&names) {
            log::warn!(
                "{} will be applied before {} (filename order differs from sequence order)",
                earlier,
                later
            );
        }
    }
    Ok(names)
}

/// Sort filenames in place according to `order`.
///
/// Under [`ApplyOrder::Sequence`], names without a parseable sequence number
/// go last, in filename order.
pub fn sort_candidates(names: &mut [MigrationId], order: ApplyOrder) {
    match order {
        ApplyOrder::Lexicographic => names.sort(),
        ApplyOrder::Sequence => names.sort_by(|a, b| {
            let key = |id: &MigrationId| MigrationFile::parse(id).map(|f| f.sequence).ok();
            match (key(a), key(b)) {
                (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => a.cmp(b),
            }
        }),
    }
}

/// First adjacent pair whose order contradicts their sequence numbers.
pub fn first_order_mismatch(names: &[MigrationId]) -> Option<(&MigrationId, &MigrationId)> {
    names.windows(2).find_map(|pair| {
        let a = MigrationFile::parse(&pair[0]).ok()?;
        let b = MigrationFile::parse(&pair[1]).ok()?;
        (a.sequence > b.sequence).then_some((&pair[0], &pair[1]))
    })
}

/// Candidates not yet in `applied`, keeping candidate order.
pub fn pending_queue<'c>(
    candidates: &'c [MigrationId],
    applied: &HashSet<MigrationId>,
) -> Vec<&'c MigrationId> {
    candidates
        .iter()
        .filter(|id| !applied.contains(*id))
        .collect()
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
