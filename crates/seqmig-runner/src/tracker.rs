//! Applied-set tracker.
//!
//! Persists the identifiers of applied migrations in a one-column table
//! keyed by identifier. Rows are only ever inserted; nothing here updates
//! or deletes them.

use crate::error::{MigrateError, MigrateResult};
use seqmig_core::sql_utils::{quote_ident, quote_table, table_schema};
use seqmig_core::{MigrationId, TableName};
use seqmig_db::{Database, DbError};
use std::collections::HashSet;

/// Column holding the applied identifier
pub const VERSION_COLUMN: &str = "version";

/// Reads and writes the applied set through a [`Database`].
pub struct AppliedSetTracker<'a> {
    db: &'a dyn Database,
    table: &'a TableName,
}

impl<'a> AppliedSetTracker<'a> {
    pub fn new(db: &'a dyn Database, table: &'a TableName) -> Self {
        Self { db, table }
    }

    /// Create the tracking table (and its schema, when qualified) if absent.
    ///
    /// Safe to call on every run.
    pub async fn ensure_store(&self) -> MigrateResult<()> {
        let mut ddl = String::new();
        if let Some(schema) = table_schema(self.table) {
            ddl.push_str(&format!("CREATE SCHEMA IF NOT EXISTS {};\n", quote_ident(schema)));
        }
        ddl.push_str(&format!(
            "CREATE TABLE IF NOT EXISTS {} ({} VARCHAR(255) PRIMARY KEY);",
            quote_table(self.table),
            quote_ident(VERSION_COLUMN)
        ));

        self.db
            .execute_batch(&ddl)
            .await
            .map_err(|source| MigrateError::StoreInit {
                table: self.table.to_string(),
                source,
            })
    }

    /// Every identifier recorded so far. Membership only; no ordering.
    pub async fn load_applied(&self) -> MigrateResult<HashSet<MigrationId>> {
        let sql = format!(
            "SELECT {} FROM {}",
            quote_ident(VERSION_COLUMN),
            quote_table(self.table)
        );
        let rows = self
            .db
            .query_column(&sql)
            .await
            .map_err(|source| MigrateError::Query {
                table: self.table.to_string(),
                source,
            })?;

        let applied: HashSet<MigrationId> = rows
            .into_iter()
            .filter_map(|row| {
                let id = MigrationId::try_new(row);
                if id.is_none() {
                    log::warn!("Ignoring empty identifier in {}", self.table);
                }
                id
            })
            .collect();
        log::debug!("{} migrations recorded in {}", applied.len(), self.table);
        Ok(applied)
    }

    /// Insert exactly one record for `id`.
    ///
    /// An identifier that is already recorded is an error
    /// ([`MigrateError::DuplicateRecord`]), never silently accepted.
    pub async fn record_applied(&self, id: &MigrationId) -> MigrateResult<()> {
        self.db
            .insert_key(&quote_table(self.table), &quote_ident(VERSION_COLUMN), id)
            .await
            .map_err(|source| match source {
                DbError::UniqueViolation(_) => MigrateError::DuplicateRecord { id: id.clone() },
                source => MigrateError::Record {
                    filename: id.to_string(),
                    source,
                },
            })
    }
}

#[cfg(test)]
#[path = "tracker_test.rs"]
mod tests;
