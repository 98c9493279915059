//! Core types and traits for fakemig.
//!
//! fakemig marks a schema migration as applied (or not applied) in the
//! migration ledger of one or many databases without running the migration
//! itself. This crate holds everything that decides *where* and *what* to
//! write; the SQL drivers live in `fakemig-sql`.
//!
//! # Features
//!
//! - **`memory`** (default) - In-process [`MemoryLedger`] used by tests
//!
//! # Core Concepts
//!
//! ## Resolution
//!
//! A [`Selector`] (explicit database, single tenant or all tenants) is turned
//! into an ordered list of [`ConnectionDescriptor`] by the [`Resolver`], using a
//! [`TenantRegistry`] for the tenant paths.
//!
//! ## Ledger
//!
//! The [`Ledger`] trait abstracts one migration-tracking table. Both of its
//! operations are idempotent: running them twice never fails because of the
//! repetition, the second call just reports that nothing changed.
//!
//! ## Batch
//!
//! [`Batch`] drives a ledger over every resolved target in order and collects
//! one [`OperationOutcome`] per database into a [`Report`].
//!
//! # Example
//!
//! ```rust,ignore
//! use fakemig_core::{Action, Batch, Credentials, MigrationKey, Resolver, Selector};
//!
//! let key = MigrationKey::parse("20171018082229_scheduler_migrations")?.synthetic();
//! let password = Credentials::Default.resolve(&prompt)?;
//! let targets = Resolver::new(registry).resolve(&Selector::all(), &defaults, &password)?;
//!
//! let report = Batch::new(&ledger, &key, Action::Apply).run(targets).await;
//! assert!(report.is_success());
//! ```

mod batch;
mod config;
mod credentials;
mod descriptor;
mod key;
mod ledger;
#[cfg(feature = "memory")]
mod memory;
mod registry;
mod resolver;

pub use batch::*;
pub use config::*;
pub use credentials::*;
pub use descriptor::*;
pub use key::*;
pub use ledger::*;
#[cfg(feature = "memory")]
pub use memory::*;
pub use registry::*;
pub use resolver::*;
