use async_trait::async_trait;
use parking_lot::RwLock;
use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use crate::{ConnectionDescriptor, Ledger, LedgerError, LedgerRow, MigrationKey, LEDGER_TABLE};

type Rows = BTreeMap<String, LedgerRow>;

/// In-process ledger keyed by database name.
///
/// A database that was never created behaves like an unreachable server; a
/// database created with [`MemoryLedger::create_uninitialized`] has no ledger
/// table. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger(Arc<RwLock<HashMap<String, Option<Rows>>>>);

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a database with an empty ledger table.
    pub fn create_database(&self, name: impl Into<String>) -> &Self {
        self.0.write().insert(name.into(), Some(Rows::new()));
        self
    }

    /// Adds a database without ledger table.
    pub fn create_uninitialized(&self, name: impl Into<String>) -> &Self {
        self.0.write().insert(name.into(), None);
        self
    }

    /// Seeds a row as a real migration run would.
    pub fn insert(&self, database: &str, row: LedgerRow) -> Result<(), LedgerError> {
        let mut data = self.0.write();
        let rows = rows_mut(&mut data, database)?;
        rows.insert(row.version.to_owned(), row);

        Ok(())
    }

    /// Ledger rows of `database` ordered by version.
    pub fn rows(&self, database: &str) -> Vec<LedgerRow> {
        self.0
            .read()
            .get(database)
            .and_then(|rows| rows.as_ref())
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default()
    }
}

fn rows_mut<'a>(
    data: &'a mut HashMap<String, Option<Rows>>,
    database: &str,
) -> Result<&'a mut Rows, LedgerError> {
    let Some(rows) = data.get_mut(database) else {
        return Err(LedgerError::Connection(anyhow::anyhow!(
            "unknown database `{database}`"
        )));
    };

    rows.as_mut().ok_or_else(|| LedgerError::LedgerTableMissing {
        table: LEDGER_TABLE.to_owned(),
    })
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn fake_migration(
        &self,
        target: &ConnectionDescriptor,
        key: &MigrationKey,
    ) -> Result<bool, LedgerError> {
        let mut data = self.0.write();
        let rows = rows_mut(&mut data, target.database_name())?;

        if rows.contains_key(key.version()) {
            return Ok(false);
        }

        rows.insert(key.version().to_owned(), LedgerRow::from_key(key));

        Ok(true)
    }

    async fn fake_revert(
        &self,
        target: &ConnectionDescriptor,
        key: &MigrationKey,
    ) -> Result<bool, LedgerError> {
        let mut data = self.0.write();
        let rows = rows_mut(&mut data, target.database_name())?;

        Ok(rows.remove(key.version()).is_some())
    }
}
