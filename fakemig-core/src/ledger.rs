//! Migration ledger abstraction.
//!
//! A ledger is the per-database table recording which migrations have been
//! applied. The [`Ledger`] trait only ever inserts or deletes one row keyed by
//! the migration version; it never touches application schema or data.

use chrono::{DateTime, Utc};
use dyn_clone::DynClone;

use crate::{ConnectionDescriptor, MigrationKey};

/// Name of the ledger table in every target database.
pub const LEDGER_TABLE: &str = "migration_log";

/// Per-database failure of a ledger operation.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The database could not be reached or rejected the credentials.
    #[error("connection failed: {0}")]
    Connection(#[source] anyhow::Error),

    /// The database was never initialized for migrations.
    #[error("ledger table `{table}` does not exist")]
    LedgerTableMissing { table: String },

    #[error("query failed: {0}")]
    Query(#[source] anyhow::Error),
}

impl LedgerError {
    /// Short machine-friendly label used in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connection(_) => "connection",
            Self::LedgerTableMissing { .. } => "ledger-table-missing",
            Self::Query(_) => "query",
        }
    }
}

/// One applied migration as stored in a ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRow {
    pub version: String,
    pub name: String,
    pub applied_at: DateTime<Utc>,
    pub synthetic: bool,
}

impl LedgerRow {
    pub fn from_key(key: &MigrationKey) -> Self {
        Self {
            version: key.version().to_owned(),
            name: key.name().to_owned(),
            applied_at: Utc::now(),
            synthetic: key.is_synthetic(),
        }
    }
}

/// Core trait for ledger backends.
///
/// Every call opens its own connection to `target` and releases it before
/// returning. Both operations converge: repeating them with the same key is
/// never an error, the repeated call just returns `false`.
///
/// The main implementation is `fakemig_sql::Sql`.
#[async_trait::async_trait]
pub trait Ledger: DynClone + Send + Sync {
    /// Marks `key` as applied. Returns `false` when the row already existed.
    async fn fake_migration(
        &self,
        target: &ConnectionDescriptor,
        key: &MigrationKey,
    ) -> Result<bool, LedgerError>;

    /// Removes the ledger row of `key`. Returns `false` when there was none.
    ///
    /// Schema changes made by the real migration stay in place.
    async fn fake_revert(
        &self,
        target: &ConnectionDescriptor,
        key: &MigrationKey,
    ) -> Result<bool, LedgerError>;
}

dyn_clone::clone_trait_object!(Ledger);
