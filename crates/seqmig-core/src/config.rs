//! Configuration types and parsing for seqmig.yml
//!
//! A [`MigrateConfig`] is built once at startup (file values, then command-line
//! overrides) and passed by reference to everything that needs it.

use crate::error::{CoreError, CoreResult};
use crate::table_name::TableName;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Default config file name looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "seqmig.yml";

/// Resolved migration configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrateConfig {
    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Directory holding `<digits>_<label>.sql` files
    #[serde(default = "default_migration_dir")]
    pub migration_dir: PathBuf,

    /// Table that records applied migrations
    #[serde(default)]
    pub tracking_table: TableName,

    /// Order in which pending files are applied
    #[serde(default)]
    pub order: ApplyOrder,

    /// Apply each migration and its record inside one transaction
    #[serde(default = "default_true")]
    pub transactional: bool,
}

impl Default for MigrateConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            migration_dir: default_migration_dir(),
            tracking_table: TableName::default(),
            order: ApplyOrder::default(),
            transactional: true,
        }
    }
}

impl MigrateConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load `seqmig.yml` from `dir` if present, otherwise return defaults
    pub fn load_from_dir_or_default(dir: &Path) -> CoreResult<Self> {
        let path = dir.join(DEFAULT_CONFIG_FILE);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from YAML text and validate it
    pub fn from_yaml_str(content: &str) -> CoreResult<Self> {
        let config: Self =
            serde_yaml::from_str(content).map_err(|e| CoreError::ConfigParseError {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints serde cannot express
    pub fn validate(&self) -> CoreResult<()> {
        if self.migration_dir.as_os_str().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "migration_dir must not be empty".to_string(),
            });
        }
        match self.database.db_type {
            DbType::Postgres => {
                if self.database.host.is_empty() {
                    return Err(CoreError::ConfigInvalid {
                        message: "database.host must not be empty".to_string(),
                    });
                }
                if self.database.port == 0 {
                    return Err(CoreError::ConfigInvalid {
                        message: "database.port must be between 1 and 65535".to_string(),
                    });
                }
            }
            DbType::DuckDb => {
                if self.database.path.is_empty() {
                    return Err(CoreError::ConfigInvalid {
                        message: "database.path is required for duckdb".to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Database backend selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
    /// PostgreSQL (default)
    #[default]
    Postgres,
    /// DuckDB, file-based or `:memory:`
    DuckDb,
}

impl fmt::Display for DbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbType::Postgres => write!(f, "postgres"),
            DbType::DuckDb => write!(f, "duckdb"),
        }
    }
}

/// TLS negotiation mode, named after libpq's `sslmode`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SslMode {
    #[default]
    Disable,
    Allow,
    Prefer,
    Require,
    VerifyCa,
    VerifyFull,
}

impl fmt::Display for SslMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SslMode::Disable => "disable",
            SslMode::Allow => "allow",
            SslMode::Prefer => "prefer",
            SslMode::Require => "require",
            SslMode::VerifyCa => "verify-ca",
            SslMode::VerifyFull => "verify-full",
        };
        f.write_str(s)
    }
}

/// Order in which candidate files are applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApplyOrder {
    /// Byte-wise filename order: `10_b.sql` sorts before `9_a.sql`
    #[default]
    Lexicographic,
    /// Parsed sequence number: `9_a.sql` before `10_b.sql`
    Sequence,
}

impl fmt::Display for ApplyOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplyOrder::Lexicographic => write!(f, "lexicographic"),
            ApplyOrder::Sequence => write!(f, "sequence"),
        }
    }
}

/// Database connection configuration
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Backend type (postgres or duckdb)
    #[serde(rename = "type", default)]
    pub db_type: DbType,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default = "default_password")]
    pub password: String,

    /// Database name
    #[serde(default = "default_db_name")]
    pub name: String,

    #[serde(default)]
    pub ssl_mode: SslMode,

    /// DuckDB database file (or `:memory:`); ignored for postgres
    #[serde(default = "default_duckdb_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: DbType::default(),
            host: default_host(),
            port: default_port(),
            user: default_user(),
            password: default_password(),
            name: default_db_name(),
            ssl_mode: SslMode::default(),
            path: default_duckdb_path(),
        }
    }
}

impl DatabaseConfig {
    /// Human-readable target description with the password left out
    pub fn describe(&self) -> String {
        match self.db_type {
            DbType::Postgres => format!(
                "postgres://{}@{}:{}/{} (sslmode={})",
                self.user, self.host, self.port, self.name, self.ssl_mode
            ),
            DbType::DuckDb => format!("duckdb:{}", self.path),
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("db_type", &self.db_type)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .field("ssl_mode", &self.ssl_mode)
            .field("path", &self.path)
            .finish()
    }
}

fn default_migration_dir() -> PathBuf {
    PathBuf::from("migrations")
}

fn default_true() -> bool {
    true
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_user() -> String {
    "postgres".to_string()
}

fn default_password() -> String {
    "password".to_string()
}

fn default_db_name() -> String {
    "postgres".to_string()
}

fn default_duckdb_path() -> String {
    "seqmig.duckdb".to_string()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
