//! Ledger table migration.

mod create_table;

use sqlx_migrator::vec_box;

/// Creates the `migration_log` table:
/// - `version` - Migration version (primary key)
/// - `name` - Migration name
/// - `applied_at` - Defaults to the current timestamp
/// - `synthetic` - Defaults to false
pub struct InitMigration;

#[cfg(feature = "sqlite")]
sqlx_migrator::sqlite_migration!(
    InitMigration,
    "fakemig",
    "create_migration_log",
    vec_box![],
    vec_box![create_table::Operation]
);

#[cfg(feature = "mysql")]
sqlx_migrator::mysql_migration!(
    InitMigration,
    "fakemig",
    "create_migration_log",
    vec_box![],
    vec_box![create_table::Operation]
);

#[cfg(feature = "postgres")]
sqlx_migrator::postgres_migration!(
    InitMigration,
    "fakemig",
    "create_migration_log",
    vec_box![],
    vec_box![create_table::Operation]
);
