//! Mark schema migrations as applied or reverted without running them.
//!
//! This crate re-exports the fakemig building blocks behind feature flags:
//!
//! - **`memory`** - In-process ledger from `fakemig-core`
//! - **`sqlite`**, **`mysql`**, **`postgres`** - SQL ledgers and the ledger
//!   table migration
//! - **`full`** - Everything above
//!
//! # Example
//!
//! ```rust,ignore
//! use fakemig::{Action, Batch, MigrationKey, Resolver, Selector};
//!
//! let key = MigrationKey::parse("20171018082229_scheduler_migrations")?.synthetic();
//! let targets = Resolver::new(None).resolve(&Selector::database("pro"), &defaults, &password)?;
//! let report = Batch::new(&fakemig::sql::MySql::new(), &key, Action::Apply)
//!     .run(targets)
//!     .await;
//! ```

pub use fakemig_core::*;

#[cfg(any(feature = "sqlite", feature = "mysql", feature = "postgres"))]
pub use fakemig_sql as sql;

#[cfg(any(feature = "sqlite", feature = "mysql", feature = "postgres"))]
pub use fakemig_sql_migrator as migrator;
