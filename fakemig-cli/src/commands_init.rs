//! `fakemig init` - create the ledger table on the selected databases.

use std::process::ExitCode;

use colored::Colorize;
use fakemig::{migrator::InitMigration, sql::Backend, ConnectionDescriptor};
use sqlx::Connection;
use sqlx_migrator::{Migrate, Migration, Migrator, Plan};

use crate::{
    args::{ConnectionArgs, Driver, TargetArgs},
    prompt::TerminalPrompt,
};

pub(crate) async fn cmd_init(
    target: &TargetArgs,
    connection: &ConnectionArgs,
) -> anyhow::Result<ExitCode> {
    let selector = target.selector();

    if !selector.is_valid() {
        crate::usage_hint("init");
        return Ok(ExitCode::FAILURE);
    }

    let password = connection.credentials().resolve(&TerminalPrompt)?;
    let targets = crate::resolver()?.resolve(&selector, &connection.defaults(), &password)?;
    let mut failed = 0;

    for target in &targets {
        let res = match connection.driver {
            Driver::Mysql => create_ledger_table::<sqlx::MySql>(target).await,
            Driver::Postgres => create_ledger_table::<sqlx::Postgres>(target).await,
            Driver::Sqlite => create_ledger_table::<sqlx::Sqlite>(target).await,
        };

        match res {
            Ok(()) => println!("{} {}: ledger ready", "ok".green().bold(), target.to_string().bold()),
            Err(err) => {
                failed += 1;
                tracing::warn!(database = target.database_name(), "{err:#}");
                println!("{} {}: {err:#}", "FAIL".red().bold(), target.to_string().bold());
            }
        }
    }

    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn create_ledger_table<DB>(target: &ConnectionDescriptor) -> anyhow::Result<()>
where
    DB: Backend,
    InitMigration: Migration<DB>,
    Migrator<DB>: Migrate<DB>,
{
    let options = DB::connect_options(target);
    let mut connection = <DB::Connection as Connection>::connect_with(&options).await?;

    let res = match fakemig::migrator::new::<DB>() {
        Ok(migrator) => migrator.run(&mut connection, &Plan::apply_all()).await,
        Err(err) => Err(err),
    };

    if let Err(err) = connection.close().await {
        tracing::warn!("failed to close connection: {err}");
    }

    res?;

    tracing::info!(database = target.database_name(), "ledger table ready");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fakemig::{ConnectionDefaults, Password, Resolver, Selector};
    use sqlx::{sqlite::SqliteConnectOptions, SqliteConnection};
    use tempfile::TempDir;

    async fn sqlite_target(dir: &TempDir, setup: &str) -> anyhow::Result<ConnectionDescriptor> {
        let database = dir.path().join("pro.db").display().to_string();

        let options = SqliteConnectOptions::new()
            .filename(&database)
            .create_if_missing(true);
        let mut conn = SqliteConnection::connect_with(&options).await?;
        if !setup.is_empty() {
            sqlx::query(setup).execute(&mut conn).await?;
        }
        conn.close().await?;

        let mut targets = Resolver::new(None).resolve(
            &Selector::database(database),
            &ConnectionDefaults::default(),
            &Password::new("root"),
        )?;

        Ok(targets.remove(0))
    }

    #[tokio::test]
    async fn creates_ledger_table_once() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let target = sqlite_target(&dir, "").await?;

        create_ledger_table::<sqlx::Sqlite>(&target).await?;
        create_ledger_table::<sqlx::Sqlite>(&target).await?;

        let options = sqlx::Sqlite::connect_options(&target);
        let mut conn = SqliteConnection::connect_with(&options).await?;
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM migration_log")
            .fetch_one(&mut conn)
            .await?;
        conn.close().await?;

        assert_eq!(count.0, 0);

        Ok(())
    }

    #[tokio::test]
    async fn migrator_error_is_reported() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let target =
            sqlite_target(&dir, "CREATE TABLE _sqlx_migrator_migrations (id INTEGER)").await?;

        let err = create_ledger_table::<sqlx::Sqlite>(&target)
            .await
            .unwrap_err();

        assert!(
            err.downcast_ref::<sqlx_migrator::Error>().is_some(),
            "unexpected {err:?}"
        );
        assert!(format!("{err:#}").contains("no such column"), "unexpected {err:#}");

        Ok(())
    }
}
