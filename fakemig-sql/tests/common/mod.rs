#![allow(dead_code)]

use fakemig_core::{
    Action, Batch, ConnectionDefaults, ConnectionDescriptor, Ledger, LedgerError, MigrationKey,
    Password, RegistryConfig, Resolver, Selector, StaticRegistry,
};

pub fn scheduler_key() -> anyhow::Result<MigrationKey> {
    Ok(MigrationKey::parse("20171018082229_scheduler_migrations")?.synthetic())
}

pub fn target(
    defaults: &ConnectionDefaults,
    password: &str,
    database: &str,
) -> anyhow::Result<ConnectionDescriptor> {
    let mut targets = Resolver::new(None).resolve(
        &Selector::database(database),
        defaults,
        &Password::new(password),
    )?;

    Ok(targets.remove(0))
}

pub fn tenants(
    defaults: &ConnectionDefaults,
    password: &str,
    tenants: &[(&str, &str)],
) -> anyhow::Result<Vec<ConnectionDescriptor>> {
    let config = tenants
        .iter()
        .fold(RegistryConfig::default(), |config, (code, database)| {
            config.with_tenant(*code, *database)
        });

    let resolver = Resolver::with_registry(StaticRegistry::from(config));

    Ok(resolver.resolve(&Selector::all(), defaults, &Password::new(password))?)
}

pub async fn fake_migration_idempotent(
    ledger: &dyn Ledger,
    target: &ConnectionDescriptor,
) -> anyhow::Result<()> {
    let key = scheduler_key()?;

    assert!(ledger.fake_migration(target, &key).await?);
    assert!(!ledger.fake_migration(target, &key).await?);

    Ok(())
}

pub async fn fake_revert_idempotent(
    ledger: &dyn Ledger,
    target: &ConnectionDescriptor,
) -> anyhow::Result<()> {
    let key = scheduler_key()?;

    assert!(!ledger.fake_revert(target, &key).await?);
    assert!(ledger.fake_migration(target, &key).await?);
    assert!(ledger.fake_revert(target, &key).await?);
    assert!(!ledger.fake_revert(target, &key).await?);

    Ok(())
}

pub async fn ledger_table_missing(
    ledger: &dyn Ledger,
    target: &ConnectionDescriptor,
) -> anyhow::Result<()> {
    let key = scheduler_key()?;

    let err = ledger.fake_migration(target, &key).await.unwrap_err();
    assert!(
        matches!(err, LedgerError::LedgerTableMissing { .. }),
        "unexpected {err:?}"
    );

    let err = ledger.fake_revert(target, &key).await.unwrap_err();
    assert!(
        matches!(err, LedgerError::LedgerTableMissing { .. }),
        "unexpected {err:?}"
    );

    Ok(())
}

pub async fn connection_failure(
    ledger: &dyn Ledger,
    target: &ConnectionDescriptor,
) -> anyhow::Result<()> {
    let err = ledger
        .fake_migration(target, &scheduler_key()?)
        .await
        .unwrap_err();

    assert!(
        matches!(err, LedgerError::Connection(_)),
        "unexpected {err:?}"
    );

    Ok(())
}

/// `targets[0]` is reachable, `targets[1]` is not.
pub async fn batch_partial_failure(
    ledger: &dyn Ledger,
    targets: Vec<ConnectionDescriptor>,
) -> anyhow::Result<()> {
    let key = scheduler_key()?;
    let report = Batch::new(ledger, &key, Action::Apply).run(targets).await;

    assert_eq!(report.outcomes.len(), 2);
    assert!(report.outcomes[0].changed());
    assert!(matches!(
        report.outcomes[1].error(),
        Some(LedgerError::Connection(_))
    ));
    assert_eq!(report.changed(), 1);
    assert_eq!(report.failed(), 1);

    Ok(())
}
