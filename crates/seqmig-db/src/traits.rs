//! Database trait definition

use crate::error::DbResult;
use async_trait::async_trait;

/// SQL backend consumed by the migration runner.
///
/// One implementation holds exactly one connection; calls are issued
/// strictly one after another. `table` and `column` arguments are SQL
/// fragments that the caller has already quoted.
#[async_trait]
pub trait Database: Send + Sync {
    /// Execute a block of SQL text (possibly several statements) as one unit
    async fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Run a query and return the first column of every row as text
    async fn query_column(&self, sql: &str) -> DbResult<Vec<String>>;

    /// Insert one row carrying a single string key.
    ///
    /// A duplicate key must surface as [`DbError::UniqueViolation`](crate::DbError::UniqueViolation).
    async fn insert_key(&self, table: &str, column: &str, key: &str) -> DbResult<()>;

    /// Open a transaction on the held connection
    async fn begin(&self) -> DbResult<()>;

    /// Commit the open transaction
    async fn commit(&self) -> DbResult<()>;

    /// Roll back the open transaction
    async fn rollback(&self) -> DbResult<()>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}
