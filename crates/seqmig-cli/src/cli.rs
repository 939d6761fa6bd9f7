//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use seqmig_core::{ApplyOrder, DbType, SslMode, TableName};
use std::path::PathBuf;

/// seqmig - Apply numbered SQL migrations exactly once, in order
#[derive(Parser, Debug)]
#[command(name = "seqmig")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute (default: up)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Global arguments available to all commands.
///
/// Every connection flag overrides the matching value from the config file.
/// The camelCase aliases keep older invocation scripts working.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (default: ./seqmig.yml if present)
    #[arg(short, long, global = true, env = "SEQMIG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the migration files
    #[arg(long, global = true, alias = "migrationDir", env = "SEQMIG_MIGRATION_DIR")]
    pub migration_dir: Option<PathBuf>,

    /// Database backend
    #[arg(long, global = true, value_enum, env = "SEQMIG_DB_TYPE")]
    pub db_type: Option<DbKind>,

    /// Database host
    #[arg(long, global = true, alias = "dbHost", env = "SEQMIG_DB_HOST")]
    pub db_host: Option<String>,

    /// Database port
    #[arg(long, global = true, alias = "dbPort", env = "SEQMIG_DB_PORT")]
    pub db_port: Option<u16>,

    /// Database user
    #[arg(long, global = true, alias = "dbUser", env = "SEQMIG_DB_USER")]
    pub db_user: Option<String>,

    /// Database password
    #[arg(
        long,
        global = true,
        alias = "dbPassword",
        env = "SEQMIG_DB_PASSWORD",
        hide_env_values = true
    )]
    pub db_password: Option<String>,

    /// Database name
    #[arg(long, global = true, alias = "dbName", env = "SEQMIG_DB_NAME")]
    pub db_name: Option<String>,

    /// TLS mode for PostgreSQL connections
    #[arg(long, global = true, value_enum, alias = "sslMode", env = "SEQMIG_SSL_MODE")]
    pub ssl_mode: Option<SslModeArg>,

    /// DuckDB database file (or :memory:)
    #[arg(long, global = true, env = "SEQMIG_DB_PATH")]
    pub db_path: Option<String>,

    /// Table recording applied migrations, optionally schema-qualified
    #[arg(long, global = true, value_parser = parse_table_name, env = "SEQMIG_TRACKING_TABLE")]
    pub tracking_table: Option<TableName>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate, then apply every pending migration
    Up(UpArgs),

    /// Check migration filenames and numbering without touching the database
    Validate(ValidateArgs),

    /// Show which migrations are applied and which are pending
    Status(StatusArgs),
}

/// Arguments for the up command
#[derive(Args, Debug, Default)]
pub struct UpArgs {
    /// Order in which pending files are applied (default: from config)
    #[arg(long, value_enum)]
    pub order: Option<OrderArg>,

    /// Apply each file and its record as separate steps
    #[arg(long)]
    pub no_transaction: bool,
}

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Print every validated file
    #[arg(short, long)]
    pub list: bool,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: StatusOutput,
}

/// Status output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutput {
    /// One line per file
    Table,
    /// JSON report
    Json,
}

/// Database backend selector
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbKind {
    Postgres,
    Duckdb,
}

impl From<DbKind> for DbType {
    fn from(kind: DbKind) -> Self {
        match kind {
            DbKind::Postgres => DbType::Postgres,
            DbKind::Duckdb => DbType::DuckDb,
        }
    }
}

/// PostgreSQL TLS modes
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SslModeArg {
    Disable,
    Allow,
    Prefer,
    Require,
    VerifyCa,
    VerifyFull,
}

impl From<SslModeArg> for SslMode {
    fn from(arg: SslModeArg) -> Self {
        match arg {
            SslModeArg::Disable => SslMode::Disable,
            SslModeArg::Allow => SslMode::Allow,
            SslModeArg::Prefer => SslMode::Prefer,
            SslModeArg::Require => SslMode::Require,
            SslModeArg::VerifyCa => SslMode::VerifyCa,
            SslModeArg::VerifyFull => SslMode::VerifyFull,
        }
    }
}

/// Apply order
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderArg {
    /// Filename order (10_x.sql before 9_x.sql)
    Lexicographic,
    /// Sequence-number order
    Sequence,
}

impl From<OrderArg> for ApplyOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::Lexicographic => ApplyOrder::Lexicographic,
            OrderArg::Sequence => ApplyOrder::Sequence,
        }
    }
}

fn parse_table_name(s: &str) -> Result<TableName, String> {
    TableName::try_new(s).ok_or_else(|| {
        format!("invalid table name '{s}': expected `table` or `schema.table` of [A-Za-z0-9_]")
    })
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
