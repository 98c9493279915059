//! Sequential execution of a ledger operation over resolved targets.

use std::fmt;
use tracing::Instrument;

use crate::{ConnectionDescriptor, Ledger, LedgerError, MigrationKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Mark the migration as applied.
    Apply,
    /// Mark the migration as not applied.
    Revert,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Apply => f.write_str("apply"),
            Self::Revert => f.write_str("revert"),
        }
    }
}

/// What to do with the remaining targets once one of them failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BatchPolicy {
    /// Record the failure and move on to the next database.
    #[default]
    ContinueOnError,
    /// Stop at the first failure, the remaining databases are skipped.
    AbortOnError,
}

#[derive(Debug)]
pub enum OutcomeStatus {
    /// The ledger row was inserted (apply) or deleted (revert).
    Changed,
    /// The ledger was already in the requested state.
    Unchanged,
    Failed(LedgerError),
    /// Not attempted because an earlier database failed.
    Skipped,
}

/// Result of the operation on one database.
#[derive(Debug)]
pub struct OperationOutcome {
    pub database: String,
    pub tenant_code: Option<String>,
    pub status: OutcomeStatus,
}

impl OperationOutcome {
    fn new(target: &ConnectionDescriptor, status: OutcomeStatus) -> Self {
        Self {
            database: target.database_name().to_owned(),
            tenant_code: target.tenant_code().map(ToOwned::to_owned),
            status,
        }
    }

    pub fn changed(&self) -> bool {
        matches!(self.status, OutcomeStatus::Changed)
    }

    pub fn error(&self) -> Option<&LedgerError> {
        match &self.status {
            OutcomeStatus::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Every outcome of one batch, in target order.
#[derive(Debug, Default)]
pub struct Report {
    pub outcomes: Vec<OperationOutcome>,
}

impl Report {
    fn count(&self, f: impl Fn(&OutcomeStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| f(&o.status)).count()
    }

    pub fn changed(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Changed))
    }

    pub fn unchanged(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Unchanged))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Failed(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Skipped))
    }

    /// Outcomes that still need the operator's attention.
    pub fn failures(&self) -> impl Iterator<Item = &OperationOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, OutcomeStatus::Failed(_) | OutcomeStatus::Skipped))
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0 && self.skipped() == 0
    }
}

/// Runs one ledger operation over a list of targets.
///
/// Targets are processed one after the other, each with its own connection.
/// A failing database never affects the ledger of another one.
///
/// # Example
///
/// ```rust,ignore
/// let report = Batch::new(&ledger, &key, Action::Revert)
///     .policy(BatchPolicy::AbortOnError)
///     .on_outcome(|outcome| println!("{}", outcome.database))
///     .run(targets)
///     .await;
/// ```
pub struct Batch<'a> {
    ledger: &'a dyn Ledger,
    key: &'a MigrationKey,
    action: Action,
    policy: BatchPolicy,
    observer: Option<Box<dyn FnMut(&OperationOutcome) + Send + 'a>>,
}

impl<'a> Batch<'a> {
    pub fn new(ledger: &'a dyn Ledger, key: &'a MigrationKey, action: Action) -> Self {
        Self {
            ledger,
            key,
            action,
            policy: BatchPolicy::default(),
            observer: None,
        }
    }

    pub fn policy(mut self, policy: BatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Called after each database, in order, including skipped ones.
    pub fn on_outcome(mut self, observer: impl FnMut(&OperationOutcome) + Send + 'a) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub async fn run(mut self, targets: Vec<ConnectionDescriptor>) -> Report {
        let mut report = Report::default();
        let mut aborted = false;

        for target in targets {
            let status = if aborted {
                OutcomeStatus::Skipped
            } else {
                let span = tracing::info_span!(
                    "ledger",
                    database = target.database_name(),
                    tenant = target.tenant_code().unwrap_or_default(),
                    action = %self.action,
                );

                self.apply(&target).instrument(span).await
            };

            if let OutcomeStatus::Failed(_) = status {
                aborted = self.policy == BatchPolicy::AbortOnError;
            }

            let outcome = OperationOutcome::new(&target, status);

            if let Some(observer) = self.observer.as_mut() {
                observer(&outcome);
            }

            report.outcomes.push(outcome);
        }

        report
    }

    async fn apply(&self, target: &ConnectionDescriptor) -> OutcomeStatus {
        let result = match self.action {
            Action::Apply => self.ledger.fake_migration(target, self.key).await,
            Action::Revert => self.ledger.fake_revert(target, self.key).await,
        };

        match result {
            Ok(true) => {
                tracing::info!(version = self.key.version(), "ledger updated");
                OutcomeStatus::Changed
            }
            Ok(false) => {
                tracing::debug!(version = self.key.version(), "ledger already up to date");
                OutcomeStatus::Unchanged
            }
            Err(err) => {
                tracing::warn!(version = self.key.version(), "{err}");
                OutcomeStatus::Failed(err)
            }
        }
    }
}
