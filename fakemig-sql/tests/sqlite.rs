use fakemig_core::{ConnectionDefaults, Ledger};
use sqlx::{sqlite::SqliteConnectOptions, Connection, SqliteConnection};
use sqlx_migrator::{Migrate, Plan};
use tempfile::TempDir;

mod common;

#[tokio::test]
async fn sqlite_fake_migration_idempotent() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let database = create_ledger_database(&dir, "pro").await?;
    let target = common::target(&ConnectionDefaults::default(), "root", &database)?;

    common::fake_migration_idempotent(&fakemig_sql::Sqlite::new(), &target).await
}

#[tokio::test]
async fn sqlite_fake_revert_idempotent() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let database = create_ledger_database(&dir, "pro").await?;
    let target = common::target(&ConnectionDefaults::default(), "root", &database)?;

    common::fake_revert_idempotent(&fakemig_sql::Sqlite::new(), &target).await
}

#[tokio::test]
async fn sqlite_scheduler_migration_scenario() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let database = create_ledger_database(&dir, "pro").await?;
    let target = common::target(&ConnectionDefaults::default(), "root", &database)?;
    let ledger = fakemig_sql::Sqlite::new();
    let key = common::scheduler_key()?;

    assert!(ledger.fake_migration(&target, &key).await?);

    let rows = read_rows(&database).await?;
    assert_eq!(
        rows,
        vec![(
            "20171018082229".to_owned(),
            "scheduler_migrations".to_owned(),
            true
        )]
    );

    assert!(!ledger.fake_migration(&target, &key).await?);
    assert_eq!(read_rows(&database).await?, rows);

    Ok(())
}

#[tokio::test]
async fn sqlite_revert_keeps_other_rows() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let database = create_ledger_database(&dir, "pro").await?;
    let target = common::target(&ConnectionDefaults::default(), "root", &database)?;

    let mut conn = connect(&database).await?;
    sqlx::query("INSERT INTO migration_log (version, name) VALUES ('20170101000000', 'init')")
        .execute(&mut conn)
        .await?;
    conn.close().await?;

    let before = read_rows(&database).await?;
    let ledger = fakemig_sql::Sqlite::new();
    let key = common::scheduler_key()?;

    assert!(ledger.fake_migration(&target, &key).await?);
    assert_eq!(read_rows(&database).await?.len(), 2);
    assert!(ledger.fake_revert(&target, &key).await?);

    let after = read_rows(&database).await?;
    assert_eq!(after, before);
    assert!(!after[0].2);

    Ok(())
}

#[tokio::test]
async fn sqlite_ledger_table_missing() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let database = create_empty_database(&dir, "fresh").await?;
    let target = common::target(&ConnectionDefaults::default(), "root", &database)?;

    common::ledger_table_missing(&fakemig_sql::Sqlite::new(), &target).await
}

#[tokio::test]
async fn sqlite_connection_failure() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let database = dir.path().join("missing.db").display().to_string();
    let target = common::target(&ConnectionDefaults::default(), "root", &database)?;

    common::connection_failure(&fakemig_sql::Sqlite::new(), &target).await?;

    assert!(!dir.path().join("missing.db").exists());

    Ok(())
}

#[tokio::test]
async fn sqlite_batch_partial_failure() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let t1 = create_ledger_database(&dir, "t1").await?;
    let t2 = dir.path().join("t2.db").display().to_string();

    let targets = common::tenants(
        &ConnectionDefaults::default(),
        "root",
        &[("T1", t1.as_str()), ("T2", t2.as_str())],
    )?;

    common::batch_partial_failure(&fakemig_sql::Sqlite::new(), targets).await?;

    assert_eq!(read_rows(&t1).await?.len(), 1);

    Ok(())
}

async fn connect(database: &str) -> anyhow::Result<SqliteConnection> {
    let options = SqliteConnectOptions::new()
        .filename(database)
        .create_if_missing(true);

    Ok(SqliteConnection::connect_with(&options).await?)
}

async fn create_empty_database(dir: &TempDir, key: &str) -> anyhow::Result<String> {
    let database = dir.path().join(format!("{key}.db")).display().to_string();

    connect(&database).await?.close().await?;

    Ok(database)
}

async fn create_ledger_database(dir: &TempDir, key: &str) -> anyhow::Result<String> {
    let database = create_empty_database(dir, key).await?;

    let mut conn = connect(&database).await?;
    let migrator = fakemig_sql_migrator::new::<sqlx::Sqlite>()?;
    migrator.run(&mut conn, &Plan::apply_all()).await?;
    conn.close().await?;

    Ok(database)
}

async fn read_rows(database: &str) -> anyhow::Result<Vec<(String, String, bool)>> {
    let mut conn = connect(database).await?;

    let rows = sqlx::query_as::<_, (String, String, bool)>(
        "SELECT version, name, synthetic FROM migration_log ORDER BY version",
    )
    .fetch_all(&mut conn)
    .await?;

    conn.close().await?;

    Ok(rows)
}
