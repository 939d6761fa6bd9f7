//! Applied/pending report for a migration directory.

use crate::error::MigrateResult;
use crate::runner::{list_candidates, MigrationRunner};
use seqmig_core::MigrationId;
use serde::Serialize;
use std::collections::HashSet;

/// One candidate file and whether it has been applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusEntry {
    pub id: MigrationId,
    pub applied: bool,
}

/// Candidate files in apply order, plus recorded identifiers with no file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub entries: Vec<StatusEntry>,
    /// Recorded as applied but no longer present on disk, sorted
    pub missing: Vec<MigrationId>,
}

impl StatusReport {
    /// Files the next run would attempt, in order
    pub fn pending(&self) -> impl Iterator<Item = &MigrationId> {
        self.entries.iter().filter(|e| !e.applied).map(|e| &e.id)
    }

    pub fn applied_count(&self) -> usize {
        self.entries.iter().filter(|e| e.applied).count()
    }

    pub fn pending_count(&self) -> usize {
        self.entries.len() - self.applied_count()
    }

    fn build(candidates: Vec<MigrationId>, mut applied: HashSet<MigrationId>) -> Self {
        let entries = candidates
            .into_iter()
            .map(|id| StatusEntry {
                applied: applied.remove(&id),
                id,
            })
            .collect();
        let mut missing: Vec<MigrationId> = applied.into_iter().collect();
        missing.sort();
        Self { entries, missing }
    }
}

impl MigrationRunner<'_> {
    /// Compare the directory listing with the applied set without applying anything.
    ///
    /// Creates the tracking table if it does not exist yet.
    pub async fn status(&self) -> MigrateResult<StatusReport> {
        self.tracker().ensure_store().await?;
        let applied = self.tracker().load_applied().await?;
        let config = self.config();
        let candidates = list_candidates(&config.migration_dir, config.order)?;
        Ok(StatusReport::build(candidates, applied))
    }
}
