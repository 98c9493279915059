//! SQL implementation of the migration ledger.

use std::marker::PhantomData;

#[cfg(feature = "mysql")]
use sea_query::MysqlQueryBuilder;
#[cfg(feature = "postgres")]
use sea_query::PostgresQueryBuilder;
#[cfg(feature = "sqlite")]
use sea_query::SqliteQueryBuilder;
use sea_query::{Expr, Iden, Query};
use sea_query_binder::{SqlxBinder, SqlxValues};
use sqlx::{Connection, Database};

use fakemig_core::{ConnectionDescriptor, Ledger, LedgerError, MigrationKey, LEDGER_TABLE};

/// Column identifiers for the `migration_log` table.
///
/// Used with sea-query for type-safe SQL query construction.
#[derive(Iden, Clone, Copy)]
pub enum MigrationLog {
    /// The table name: `migration_log`
    Table,
    /// Migration version (primary key)
    Version,
    /// Migration name
    Name,
    /// Insertion timestamp
    AppliedAt,
    /// Whether the row was written by fakemig
    Synthetic,
}

/// A database fakemig knows how to reach.
///
/// Maps a [`ConnectionDescriptor`] to driver connect options and picks the
/// sea-query dialect.
pub trait Backend: Database {
    fn connect_options(
        target: &ConnectionDescriptor,
    ) -> <Self::Connection as Connection>::Options;

    fn build_sqlx<S: SqlxBinder>(statement: &S) -> (String, SqlxValues);
}

#[cfg(feature = "sqlite")]
impl Backend for sqlx::Sqlite {
    /// The database name is the path of the database file. A missing file is
    /// a connection failure, it is never created.
    fn connect_options(target: &ConnectionDescriptor) -> sqlx::sqlite::SqliteConnectOptions {
        sqlx::sqlite::SqliteConnectOptions::new()
            .filename(target.database_name())
            .create_if_missing(false)
    }

    fn build_sqlx<S: SqlxBinder>(statement: &S) -> (String, SqlxValues) {
        statement.build_sqlx(SqliteQueryBuilder)
    }
}

#[cfg(feature = "mysql")]
impl Backend for sqlx::MySql {
    fn connect_options(target: &ConnectionDescriptor) -> sqlx::mysql::MySqlConnectOptions {
        let options = sqlx::mysql::MySqlConnectOptions::new()
            .host(target.host())
            .username(target.username())
            .password(target.password().expose())
            .database(target.database_name());

        match target.port() {
            Some(port) => options.port(port),
            None => options,
        }
    }

    fn build_sqlx<S: SqlxBinder>(statement: &S) -> (String, SqlxValues) {
        statement.build_sqlx(MysqlQueryBuilder)
    }
}

#[cfg(feature = "postgres")]
impl Backend for sqlx::Postgres {
    fn connect_options(target: &ConnectionDescriptor) -> sqlx::postgres::PgConnectOptions {
        let options = sqlx::postgres::PgConnectOptions::new()
            .host(target.host())
            .username(target.username())
            .password(target.password().expose())
            .database(target.database_name());

        match target.port() {
            Some(port) => options.port(port),
            None => options,
        }
    }

    fn build_sqlx<S: SqlxBinder>(statement: &S) -> (String, SqlxValues) {
        statement.build_sqlx(PostgresQueryBuilder)
    }
}

/// Type alias for the MySQL ledger.
#[cfg(feature = "mysql")]
pub type MySql = Sql<sqlx::MySql>;

/// Type alias for the PostgreSQL ledger.
#[cfg(feature = "postgres")]
pub type Postgres = Sql<sqlx::Postgres>;

/// Type alias for the SQLite ledger.
#[cfg(feature = "sqlite")]
pub type Sqlite = Sql<sqlx::Sqlite>;

/// SQL migration ledger.
///
/// Implements [`Ledger`] for any [`Backend`]. The ledger holds no connection:
/// each operation connects to its target, runs one existence check and at
/// most one insert or delete, then disconnects.
///
/// # Example
///
/// ```rust,ignore
/// use fakemig_sql::Sql;
///
/// let ledger: Sql<sqlx::Postgres> = Sql::new();
///
/// // Or use the type alias
/// let ledger = fakemig_sql::Postgres::new();
/// ```
pub struct Sql<DB: Database>(PhantomData<fn() -> DB>);

impl<DB: Database> Sql<DB> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<DB: Database> Default for Sql<DB> {
    fn default() -> Self {
        Self::new()
    }
}

impl<DB: Database> Clone for Sql<DB> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<DB> Sql<DB>
where
    DB: Backend,
    for<'c> &'c mut DB::Connection: sqlx::Executor<'c, Database = DB>,
    SqlxValues: for<'q> sqlx::IntoArguments<'q, DB>,
    String: for<'r> sqlx::Decode<'r, DB> + sqlx::Type<DB>,
    usize: sqlx::ColumnIndex<DB::Row>,
{
    async fn connect(target: &ConnectionDescriptor) -> Result<DB::Connection, LedgerError> {
        tracing::debug!(
            driver = DB::NAME,
            host = target.host(),
            database = target.database_name(),
            "connecting"
        );

        let options = DB::connect_options(target);

        <DB::Connection as Connection>::connect_with(&options)
            .await
            .map_err(|err| LedgerError::Connection(err.into()))
    }

    async fn close(connection: DB::Connection) {
        if let Err(err) = connection.close().await {
            tracing::warn!("failed to close connection: {err}");
        }
    }

    async fn exists(connection: &mut DB::Connection, version: &str) -> Result<bool, LedgerError> {
        let statement = Query::select()
            .column(MigrationLog::Version)
            .from(MigrationLog::Table)
            .and_where(Expr::col(MigrationLog::Version).eq(version))
            .limit(1)
            .to_owned();

        let (sql, values) = DB::build_sqlx(&statement);

        let row = sqlx::query_as_with::<DB, (String,), _>(&sql, values)
            .fetch_optional(&mut *connection)
            .await
            .map_err(classify)?;

        Ok(row.is_some())
    }

    async fn insert(connection: &mut DB::Connection, key: &MigrationKey) -> Result<bool, LedgerError> {
        if Self::exists(connection, key.version()).await? {
            return Ok(false);
        }

        let statement = Query::insert()
            .into_table(MigrationLog::Table)
            .columns([
                MigrationLog::Version,
                MigrationLog::Name,
                MigrationLog::AppliedAt,
                MigrationLog::Synthetic,
            ])
            .values_panic([
                key.version().into(),
                key.name().into(),
                Expr::current_timestamp().into(),
                key.is_synthetic().into(),
            ])
            .to_owned();

        let (sql, values) = DB::build_sqlx(&statement);

        sqlx::query_with::<DB, _>(&sql, values)
            .execute(&mut *connection)
            .await
            .map_err(classify)?;

        Ok(true)
    }

    async fn delete(connection: &mut DB::Connection, key: &MigrationKey) -> Result<bool, LedgerError> {
        if !Self::exists(connection, key.version()).await? {
            return Ok(false);
        }

        let statement = Query::delete()
            .from_table(MigrationLog::Table)
            .and_where(Expr::col(MigrationLog::Version).eq(key.version()))
            .to_owned();

        let (sql, values) = DB::build_sqlx(&statement);

        sqlx::query_with::<DB, _>(&sql, values)
            .execute(&mut *connection)
            .await
            .map_err(classify)?;

        Ok(true)
    }
}

#[async_trait::async_trait]
impl<DB> Ledger for Sql<DB>
where
    DB: Backend,
    for<'c> &'c mut DB::Connection: sqlx::Executor<'c, Database = DB>,
    SqlxValues: for<'q> sqlx::IntoArguments<'q, DB>,
    String: for<'r> sqlx::Decode<'r, DB> + sqlx::Type<DB>,
    usize: sqlx::ColumnIndex<DB::Row>,
{
    async fn fake_migration(
        &self,
        target: &ConnectionDescriptor,
        key: &MigrationKey,
    ) -> Result<bool, LedgerError> {
        let mut connection = Self::connect(target).await?;
        let result = Self::insert(&mut connection, key).await;
        Self::close(connection).await;

        result
    }

    async fn fake_revert(
        &self,
        target: &ConnectionDescriptor,
        key: &MigrationKey,
    ) -> Result<bool, LedgerError> {
        let mut connection = Self::connect(target).await?;
        let result = Self::delete(&mut connection, key).await;
        Self::close(connection).await;

        result
    }
}

/// Maps a query failure onto the ledger error taxonomy.
///
/// PostgreSQL reports a missing table with SQLSTATE `42P01`, MySQL with
/// `42S02`; SQLite only says so in the message.
fn classify(err: sqlx::Error) -> LedgerError {
    if let sqlx::Error::Database(db) = &err {
        let missing = matches!(db.code().as_deref(), Some("42P01" | "42S02"))
            || db.message().contains("no such table");

        if missing {
            return LedgerError::LedgerTableMissing {
                table: LEDGER_TABLE.to_owned(),
            };
        }
    }

    if matches!(
        err,
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::Protocol(_)
    ) {
        return LedgerError::Connection(err.into());
    }

    LedgerError::Query(err.into())
}
