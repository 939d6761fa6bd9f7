//! seqmig-core - Core library for seqmig
//!
//! This crate provides migration file naming, the pre-flight directory
//! validator, configuration parsing, and shared identifier types used by
//! the runner and the CLI. Nothing in here touches a database.

pub mod config;
pub mod error;
pub mod migration_file;
pub mod migration_id;
mod newtype_string;
pub mod sql_utils;
pub mod table_name;
pub mod validator;

pub use config::{ApplyOrder, DatabaseConfig, DbType, MigrateConfig, SslMode};
pub use error::{CoreError, CoreResult};
pub use migration_file::{MigrationFile, MigrationSet};
pub use migration_id::MigrationId;
pub use table_name::TableName;
pub use validator::{check_sequence, validate_migration_dir};
