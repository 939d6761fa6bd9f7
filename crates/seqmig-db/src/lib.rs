//! seqmig-db - Database abstraction layer for seqmig
//!
//! This crate provides the `Database` trait the migration runner talks to,
//! with a PostgreSQL implementation for real deployments and a DuckDB
//! implementation for embedded databases and tests.

pub mod duckdb;
pub mod error;
pub mod postgres;
pub mod traits;

pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use postgres::PostgresBackend;
pub use traits::Database;

use seqmig_core::{DatabaseConfig, DbType};

/// Open the single connection a run holds, choosing the backend from config.
pub async fn connect(config: &DatabaseConfig) -> DbResult<Box<dyn Database>> {
    let db: Box<dyn Database> = match config.db_type {
        DbType::Postgres => Box::new(PostgresBackend::connect(config).await?),
        DbType::DuckDb => Box::new(DuckDbBackend::new(&config.path)?),
    };
    Ok(db)
}
