//! SQL migration ledger for fakemig.
//!
//! This crate implements the [`Ledger`](fakemig_core::Ledger) trait on top of
//! SQLx, supporting SQLite, MySQL, and PostgreSQL through feature flags.
//!
//! # Features
//!
//! - **`sqlite`** - Enables SQLite database support
//! - **`mysql`** - Enables MySQL database support
//! - **`postgres`** - Enables PostgreSQL database support
//!
//! All features are enabled by default. You can selectively enable only the databases you need:
//!
//! ```toml
//! [dependencies]
//! fakemig-sql = { version = "0.1", default-features = false, features = ["mysql"] }
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use fakemig_core::Ledger;
//!
//! let ledger = fakemig_sql::MySql::new();
//! let changed = ledger.fake_migration(&target, &key).await?;
//! ```
//!
//! Every call opens a dedicated connection to the target and closes it before
//! returning; nothing is pooled between databases.
//!
//! # Ledger Table
//!
//! | Column | Type | Description |
//! |--------|------|-------------|
//! | `version` | VARCHAR(64) | Migration version (primary key) |
//! | `name` | VARCHAR(255) | Migration name |
//! | `applied_at` | TIMESTAMP | When the row was written |
//! | `synthetic` | BOOLEAN | Written by fakemig rather than a real migration run |
//!
//! The table is created by `fakemig-sql-migrator`.

mod sql;

pub use sql::*;
