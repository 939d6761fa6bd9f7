use super::*;
use async_trait::async_trait;
use seqmig_db::{DbResult, DuckDbBackend};
use std::fs;
use tempfile::TempDir;

fn id(name: &str) -> MigrationId {
    MigrationId::try_new(name).unwrap()
}

fn ids(names: &[&str]) -> Vec<MigrationId> {
    names.iter().map(|n| id(n)).collect()
}

fn migrations(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, sql) in files {
        fs::write(dir.path().join(name), sql).unwrap();
    }
    dir
}

fn config_for(dir: &TempDir, order: ApplyOrder, transactional: bool) -> MigrateConfig {
    MigrateConfig {
        migration_dir: dir.path().to_path_buf(),
        order,
        transactional,
        ..MigrateConfig::default()
    }
}

fn event_name(event: MigrationEvent<'_>) -> String {
    match event {
        MigrationEvent::Skipped(f) => format!("skip {f}"),
        MigrationEvent::Applying(f) => format!("applying {f}"),
        MigrationEvent::Applied(f) => format!("applied {f}"),
        MigrationEvent::AppliedElsewhere(f) => format!("elsewhere {f}"),
    }
}

async fn recorded(db: &dyn Database) -> Vec<String> {
    let mut rows = db
        .query_column("SELECT version FROM schema_migrations")
        .await
        .unwrap();
    rows.sort();
    rows
}

async fn table_exists(db: &dyn Database, name: &str) -> bool {
    let sql = format!(
        "SELECT table_name FROM information_schema.tables WHERE table_name = '{}'",
        name
    );
    !db.query_column(&sql).await.unwrap().is_empty()
}

/// Hides every recorded row, as if another process recorded them after
/// this run loaded its applied set.
struct StaleReadDb {
    inner: DuckDbBackend,
}

#[async_trait]
impl Database for StaleReadDb {
    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.inner.execute_batch(sql).await
    }
    async fn query_column(&self, _sql: &str) -> DbResult<Vec<String>> {
        Ok(Vec::new())
    }
    async fn insert_key(&self, table: &str, column: &str, key: &str) -> DbResult<()> {
        self.inner.insert_key(table, column, key).await
    }
    async fn begin(&self) -> DbResult<()> {
        self.inner.begin().await
    }
    async fn commit(&self) -> DbResult<()> {
        self.inner.commit().await
    }
    async fn rollback(&self) -> DbResult<()> {
        self.inner.rollback().await
    }
    fn db_type(&self) -> &'static str {
        "stale"
    }
}

// Eleven files 0..=10 whose 10th step depends on the 9th.
fn users_after_nine() -> TempDir {
    let mut files: Vec<(String, String)> = (0..9)
        .map(|n| (format!("{n}_step.sql"), format!("CREATE TABLE t{n} (x INTEGER);")))
        .collect();
    files.push((
        "9_create_users.sql".to_string(),
        "CREATE TABLE users (id INTEGER);".to_string(),
    ));
    files.push((
        "10_seed_users.sql".to_string(),
        "INSERT INTO users VALUES (1);".to_string(),
    ));
    let refs: Vec<(&str, &str)> = files
        .iter()
        .map(|(n, s)| (n.as_str(), s.as_str()))
        .collect();
    migrations(&refs)
}

#[tokio::test]
async fn test_run_applies_in_order_and_records() {
    let dir = migrations(&[
        ("0_init.sql", "CREATE TABLE users (id INTEGER);"),
        ("1_add.sql", "ALTER TABLE users ADD COLUMN email VARCHAR;"),
    ]);
    let config = config_for(&dir, ApplyOrder::Lexicographic, true);
    let db = DuckDbBackend::in_memory().unwrap();
    let runner = MigrationRunner::new(&db, &config);

    let mut events = Vec::new();
    let summary = runner.run(|e| events.push(event_name(e))).await.unwrap();

    assert_eq!(summary.applied, ids(&["0_init.sql", "1_add.sql"]));
    assert!(summary.skipped.is_empty());
    assert_eq!(
        events,
        vec![
            "applying 0_init.sql",
            "applied 0_init.sql",
            "applying 1_add.sql",
            "applied 1_add.sql",
        ]
    );
    assert_eq!(recorded(&db).await, vec!["0_init.sql", "1_add.sql"]);
}

#[tokio::test]
async fn test_second_run_applies_nothing() {
    let dir = migrations(&[
        ("0_init.sql", "CREATE TABLE users (id INTEGER);"),
        ("1_seed.sql", "INSERT INTO users VALUES (1);"),
    ]);
    let config = config_for(&dir, ApplyOrder::Lexicographic, true);
    let db = DuckDbBackend::in_memory().unwrap();
    let runner = MigrationRunner::new(&db, &config);

    runner.run(|_| {}).await.unwrap();
    let mut events = Vec::new();
    let summary = runner.run(|e| events.push(event_name(e))).await.unwrap();

    assert!(summary.applied.is_empty());
    assert_eq!(summary.skipped, ids(&["0_init.sql", "1_seed.sql"]));
    assert_eq!(events, vec!["skip 0_init.sql", "skip 1_seed.sql"]);
    // The seed row was inserted exactly once.
    let rows = db.query_column("SELECT CAST(id AS VARCHAR) FROM users").await.unwrap();
    assert_eq!(rows, vec!["1"]);
}

#[tokio::test]
async fn test_only_unrecorded_files_are_applied() {
    let dir = migrations(&[
        ("0_init.sql", "CREATE TABLE never_created (x INTEGER);"),
        ("1_add.sql", "CREATE TABLE accounts (id INTEGER);"),
    ]);
    let config = config_for(&dir, ApplyOrder::Lexicographic, false);
    let db = DuckDbBackend::in_memory().unwrap();
    let runner = MigrationRunner::new(&db, &config);
    runner.tracker().ensure_store().await.unwrap();
    runner.tracker().record_applied(&id("0_init.sql")).await.unwrap();

    let summary = runner.run(|_| {}).await.unwrap();

    assert_eq!(summary.skipped, ids(&["0_init.sql"]));
    assert_eq!(summary.applied, ids(&["1_add.sql"]));
    assert!(!table_exists(&db, "never_created").await);
    assert!(table_exists(&db, "accounts").await);
}

#[tokio::test]
async fn test_empty_directory_is_a_successful_noop() {
    let dir = migrations(&[]);
    let config = config_for(&dir, ApplyOrder::Lexicographic, true);
    let db = DuckDbBackend::in_memory().unwrap();

    let summary = MigrationRunner::new(&db, &config).run(|_| {}).await.unwrap();
    assert_eq!(summary, RunSummary::default());
    // The tracking table exists even when nothing ran.
    assert!(recorded(&db).await.is_empty());
}

#[tokio::test]
async fn test_lexicographic_order_runs_ten_before_nine() {
    let dir = users_after_nine();
    let config = config_for(&dir, ApplyOrder::Lexicographic, true);
    let db = DuckDbBackend::in_memory().unwrap();

    let err = MigrationRunner::new(&db, &config)
        .run(|_| {})
        .await
        .unwrap_err();

    assert!(matches!(err, MigrateError::Execution { .. }));
    assert_eq!(err.filename(), Some("10_seed_users.sql"));
    assert_eq!(recorded(&db).await, vec!["0_step.sql"]);
}

#[tokio::test]
async fn test_sequence_order_runs_nine_before_ten() {
    let dir = users_after_nine();
    let config = config_for(&dir, ApplyOrder::Sequence, true);
    let db = DuckDbBackend::in_memory().unwrap();

    let summary = MigrationRunner::new(&db, &config).run(|_| {}).await.unwrap();

    assert_eq!(summary.applied.len(), 11);
    assert_eq!(summary.applied[9], "9_create_users.sql");
    assert_eq!(summary.applied[10], "10_seed_users.sql");
}

async fn assert_halts_at_failure(transactional: bool) {
    let dir = migrations(&[
        ("0_a.sql", "CREATE TABLE a (x INTEGER);"),
        ("1_b.sql", "CREATE TABLE b (x INTEGER);"),
        ("2_broken.sql", "CREATE TABLE c (x INTEGER); INSERT INTO missing VALUES (1);"),
        ("3_d.sql", "CREATE TABLE d (x INTEGER);"),
    ]);
    let config = config_for(&dir, ApplyOrder::Lexicographic, transactional);
    let db = DuckDbBackend::in_memory().unwrap();

    let mut events = Vec::new();
    let err = MigrationRunner::new(&db, &config)
        .run(|e| events.push(event_name(e)))
        .await
        .unwrap_err();

    assert!(matches!(err, MigrateError::Execution { .. }));
    assert_eq!(err.filename(), Some("2_broken.sql"));
    assert_eq!(recorded(&db).await, vec!["0_a.sql", "1_b.sql"]);
    assert!(table_exists(&db, "a").await);
    assert!(table_exists(&db, "b").await);
    assert!(!table_exists(&db, "d").await);
    assert_eq!(events.last().map(String::as_str), Some("applying 2_broken.sql"));
}

#[tokio::test]
async fn test_failure_halts_run_in_transaction() {
    assert_halts_at_failure(true).await;
}

#[tokio::test]
async fn test_failure_halts_run_without_transaction() {
    assert_halts_at_failure(false).await;
}

#[tokio::test]
async fn test_transactional_failure_leaves_no_partial_effects() {
    let dir = migrations(&[(
        "0_partial.sql",
        "CREATE TABLE half (x INTEGER); INSERT INTO missing VALUES (1);",
    )]);
    let config = config_for(&dir, ApplyOrder::Lexicographic, true);
    let db = DuckDbBackend::in_memory().unwrap();

    MigrationRunner::new(&db, &config)
        .run(|_| {})
        .await
        .unwrap_err();

    assert!(!table_exists(&db, "half").await);
    assert!(recorded(&db).await.is_empty());
}

#[tokio::test]
async fn test_failed_file_is_retried_on_next_run() {
    let dir = migrations(&[("0_init.sql", "INSERT INTO later VALUES (1);")]);
    let config = config_for(&dir, ApplyOrder::Lexicographic, true);
    let db = DuckDbBackend::in_memory().unwrap();
    let runner = MigrationRunner::new(&db, &config);

    runner.run(|_| {}).await.unwrap_err();
    db.execute_batch("CREATE TABLE later (x INTEGER);").await.unwrap();
    let summary = runner.run(|_| {}).await.unwrap();

    assert_eq!(summary.applied, ids(&["0_init.sql"]));
}

#[tokio::test]
async fn test_concurrent_record_is_skipped_in_transaction() {
    let dir = migrations(&[
        ("0_init.sql", "CREATE TABLE should_not_exist (x INTEGER);"),
        ("1_add.sql", "CREATE TABLE accounts (id INTEGER);"),
    ]);
    let config = config_for(&dir, ApplyOrder::Lexicographic, true);
    let db = StaleReadDb {
        inner: DuckDbBackend::in_memory().unwrap(),
    };
    let runner = MigrationRunner::new(&db, &config);
    runner.tracker().ensure_store().await.unwrap();
    runner.tracker().record_applied(&id("0_init.sql")).await.unwrap();

    let mut events = Vec::new();
    let summary = runner.run(|e| events.push(event_name(e))).await.unwrap();

    assert_eq!(summary.applied_elsewhere, ids(&["0_init.sql"]));
    assert_eq!(summary.applied, ids(&["1_add.sql"]));
    assert!(events.contains(&"elsewhere 0_init.sql".to_string()));
    assert!(!table_exists(&db.inner, "should_not_exist").await);
    assert!(table_exists(&db.inner, "accounts").await);
}

#[tokio::test]
async fn test_concurrent_record_is_fatal_without_transaction() {
    let dir = migrations(&[
        ("0_init.sql", "CREATE TABLE IF NOT EXISTS harmless (x INTEGER);"),
        ("1_add.sql", "CREATE TABLE accounts (id INTEGER);"),
    ]);
    let config = config_for(&dir, ApplyOrder::Lexicographic, false);
    let db = StaleReadDb {
        inner: DuckDbBackend::in_memory().unwrap(),
    };
    let runner = MigrationRunner::new(&db, &config);
    runner.tracker().ensure_store().await.unwrap();
    runner.tracker().record_applied(&id("0_init.sql")).await.unwrap();

    let err = runner.run(|_| {}).await.unwrap_err();

    match err {
        MigrateError::DuplicateRecord { id } => assert_eq!(id, "0_init.sql"),
        other => panic!("expected DuplicateRecord, got {other:?}"),
    }
    assert!(!table_exists(&db.inner, "accounts").await);
}

#[tokio::test]
async fn test_record_failure_halts_without_transaction() {
    let dir = migrations(&[
        (
            "0_a.sql",
            "CREATE TABLE a (x INTEGER); DROP TABLE schema_migrations;",
        ),
        ("1_b.sql", "CREATE TABLE b (x INTEGER);"),
    ]);
    let config = config_for(&dir, ApplyOrder::Lexicographic, false);
    let db = DuckDbBackend::in_memory().unwrap();

    let err = MigrationRunner::new(&db, &config)
        .run(|_| {})
        .await
        .unwrap_err();

    match &err {
        MigrateError::Record { filename, .. } => assert_eq!(filename, "0_a.sql"),
        other => panic!("expected Record, got {other:?}"),
    }
    assert!(err.to_string().starts_with("[R007] Failed to record migration 0_a.sql"));
    // The body stays applied even though it could not be recorded.
    assert!(table_exists(&db, "a").await);
    assert!(!table_exists(&db, "b").await);
}

#[tokio::test]
async fn test_non_sql_entries_are_ignored() {
    let dir = migrations(&[
        ("0_init.sql", "CREATE TABLE a (x INTEGER);"),
        ("README.md", "not sql"),
        ("1_draft.sql.bak", "not sql either"),
    ]);
    fs::create_dir(dir.path().join("2_nested.sql")).unwrap();
    fs::create_dir(dir.path().join("archive")).unwrap();
    fs::write(
        dir.path().join("archive").join("5_old.sql"),
        "CREATE TABLE old (x INTEGER);",
    )
    .unwrap();

    let candidates = list_candidates(dir.path(), ApplyOrder::Lexicographic).unwrap();
    assert_eq!(candidates, ids(&["0_init.sql"]));
}

#[test]
fn test_list_candidates_missing_dir() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope");
    match list_candidates(&missing, ApplyOrder::Lexicographic) {
        Err(MigrateError::ListDir { path, .. }) => assert!(path.ends_with("nope")),
        other => panic!("expected ListDir, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_dir_fails_after_store_init() {
    let dir = TempDir::new().unwrap();
    let mut config = config_for(&dir, ApplyOrder::Lexicographic, true);
    config.migration_dir = dir.path().join("gone");
    let db = DuckDbBackend::in_memory().unwrap();

    let err = MigrationRunner::new(&db, &config)
        .run(|_| {})
        .await
        .unwrap_err();
    assert!(matches!(err, MigrateError::ListDir { .. }));
}

#[test]
fn test_lexicographic_listing_puts_ten_before_one() {
    let dir = TempDir::new().unwrap();
    for n in 0..=10 {
        fs::write(dir.path().join(format!("{n}_step.sql")), "SELECT 1;").unwrap();
    }

    let lex = list_candidates(dir.path(), ApplyOrder::Lexicographic).unwrap();
    // '0' sorts before '_', so "10_" precedes "1_".
    assert_eq!(lex[0], "0_step.sql");
    assert_eq!(lex[1], "10_step.sql");
    assert_eq!(lex[2], "1_step.sql");
    assert_eq!(lex[10], "9_step.sql");

    let seq = list_candidates(dir.path(), ApplyOrder::Sequence).unwrap();
    let expected: Vec<String> = (0..=10).map(|n| format!("{n}_step.sql")).collect();
    assert_eq!(
        seq.iter().map(|id| id.as_str()).collect::<Vec<_>>(),
        expected.iter().map(String::as_str).collect::<Vec<_>>()
    );
}

#[test]
fn test_sort_candidates_sequence_puts_unparsed_last() {
    let mut names = ids(&["draft.sql", "2_b.sql", "10_c.sql", "1_a.sql", "a_notes.sql"]);
    sort_candidates(&mut names, ApplyOrder::Sequence);
    assert_eq!(
        names,
        ids(&["1_a.sql", "2_b.sql", "10_c.sql", "a_notes.sql", "draft.sql"])
    );
}

#[test]
fn test_first_order_mismatch() {
    let sorted = ids(&["0_a.sql", "1_b.sql", "2_c.sql"]);
    assert_eq!(first_order_mismatch(&sorted), None);

    let mut names = ids(&["0_a.sql", "1_b.sql", "10_k.sql", "2_c.sql"]);
    sort_candidates(&mut names, ApplyOrder::Lexicographic);
    let (earlier, later) = first_order_mismatch(&names).unwrap();
    assert_eq!(earlier, "10_k.sql");
    assert_eq!(later, "1_b.sql");
}

#[test]
fn test_pending_queue_keeps_candidate_order() {
    let candidates = ids(&["0_a.sql", "1_b.sql", "2_c.sql", "3_d.sql"]);
    let applied: HashSet<MigrationId> = ids(&["1_b.sql", "0_a.sql", "9_gone.sql"])
        .into_iter()
        .collect();

    let pending = pending_queue(&candidates, &applied);
    assert_eq!(pending, vec![&candidates[2], &candidates[3]]);

    assert!(pending_queue(&candidates, &candidates.iter().cloned().collect()).is_empty());
}
