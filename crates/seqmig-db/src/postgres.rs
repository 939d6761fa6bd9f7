//! PostgreSQL database backend implementation
//!
//! Holds a single `sqlx` connection for the whole run. Migration bodies go
//! through the simple query protocol so one file may contain many statements.

use crate::error::{DbError, DbResult};
use crate::traits::Database;
use async_trait::async_trait;
use seqmig_core::{DatabaseConfig, SslMode};
use sqlx::postgres::{PgConnectOptions, PgConnection, PgSslMode};
use sqlx::ConnectOptions;
use tokio::sync::Mutex;

/// PostgreSQL database backend
pub struct PostgresBackend {
    conn: Mutex<PgConnection>,
}

impl PostgresBackend {
    /// Open one connection described by `config`
    pub async fn connect(config: &DatabaseConfig) -> DbResult<Self> {
        let conn = connect_options(config)
            .connect()
            .await
            .map_err(|e| DbError::ConnectionError(format!("{}: {}", config.describe(), e)))?;
        log::debug!("Connected to {}", config.describe());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    async fn transaction_control(&self, statement: &str) -> DbResult<()> {
        let mut conn = self.conn.lock().await;
        simple_query(&mut conn, statement)
            .await
            .map_err(|e| DbError::TransactionError(format!("{} failed: {}", statement, e)))?;
        Ok(())
    }
}

/// Run SQL text with no bind arguments over the simple query protocol.
///
/// Concrete over `&mut PgConnection`; a generic `Executor<'e>` call inside the
/// boxed trait futures fails the higher-ranked `Send` check.
async fn simple_query(conn: &mut PgConnection, sql: &str) -> Result<(), sqlx::Error> {
    sqlx::Executor::execute(conn, sql).await?;
    Ok(())
}

/// Translate the resolved config into driver connect options
pub fn connect_options(config: &DatabaseConfig) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.name)
        .ssl_mode(pg_ssl_mode(config.ssl_mode))
        .application_name("seqmig")
}

fn pg_ssl_mode(mode: SslMode) -> PgSslMode {
    match mode {
        SslMode::Disable => PgSslMode::Disable,
        SslMode::Allow => PgSslMode::Allow,
        SslMode::Prefer => PgSslMode::Prefer,
        SslMode::Require => PgSslMode::Require,
        SslMode::VerifyCa => PgSslMode::VerifyCa,
        SslMode::VerifyFull => PgSslMode::VerifyFull,
    }
}

#[async_trait]
impl Database for PostgresBackend {
    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        let mut conn = self.conn.lock().await;
        simple_query(&mut conn, sql).await?;
        Ok(())
    }

    async fn query_column(&self, sql: &str) -> DbResult<Vec<String>> {
        let mut conn = self.conn.lock().await;
        sqlx::query_scalar::<_, String>(sql)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))
    }

    async fn insert_key(&self, table: &str, column: &str, key: &str) -> DbResult<()> {
        let sql = format!("INSERT INTO {} ({}) VALUES ($1)", table, column);
        let mut conn = self.conn.lock().await;
        sqlx::query(&sql).bind(key).execute(&mut *conn).await?;
        Ok(())
    }

    async fn begin(&self) -> DbResult<()> {
        self.transaction_control("BEGIN").await
    }

    async fn commit(&self) -> DbResult<()> {
        self.transaction_control("COMMIT").await
    }

    async fn rollback(&self) -> DbResult<()> {
        self.transaction_control("ROLLBACK").await
    }

    fn db_type(&self) -> &'static str {
        "postgres"
    }
}
