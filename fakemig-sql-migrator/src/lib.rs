//! SQL database migrations for the fakemig ledger table.
//!
//! fakemig refuses to write to a database whose ledger table does not exist.
//! This crate creates it, for SQLite, MySQL, and PostgreSQL through feature
//! flags.
//!
//! # Usage
//!
//! ```rust,ignore
//! use sqlx_migrator::{Migrate, Plan};
//!
//! let migrator = fakemig_sql_migrator::new::<sqlx::MySql>()?;
//! migrator.run(&mut conn, &Plan::apply_all()).await?;
//! ```
//!
//! # Migrations
//!
//! - [`InitMigration`] - Creates the `migration_log` table

use sqlx_migrator::{Info, Migrator};

mod m0001;

pub use m0001::InitMigration;

/// Creates a new [`Migrator`] instance with all fakemig migrations registered.
///
/// # Errors
///
/// Returns an error if migration registration fails.
pub fn new<DB: sqlx::Database>() -> Result<Migrator<DB>, sqlx_migrator::Error>
where
    InitMigration: sqlx_migrator::Migration<DB>,
{
    let mut migrator = Migrator::default();
    migrator.add_migration(Box::new(InitMigration))?;

    Ok(migrator)
}
