//! Turns a [`Selector`] into the databases to operate on.

use crate::{ConnectionDefaults, ConnectionDescriptor, Password, RegistryError, Tenant, TenantRegistry};

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("select a database, a tenant code or all tenants")]
    InvalidSelection,

    #[error("unknown tenant `{0}`")]
    UnknownTenant(String),

    #[error("no tenant registry configured, set the TENANT_DB_* environment variables")]
    RegistryUnavailable,

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Which databases an operation targets.
///
/// Empty strings count as absent. When several inputs are present the
/// explicit database wins, then `all`, then the tenant code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    pub database: Option<String>,
    pub tenant: Option<String>,
    pub all: bool,
}

impl Selector {
    pub fn database(name: impl Into<String>) -> Self {
        Self {
            database: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn tenant(code: impl Into<String>) -> Self {
        Self {
            tenant: Some(code.into()),
            ..Default::default()
        }
    }

    pub fn all() -> Self {
        Self {
            all: true,
            ..Default::default()
        }
    }

    /// Whether at least one selection path is set.
    pub fn is_valid(&self) -> bool {
        self.database_override().is_some() || self.all || self.tenant_code().is_some()
    }

    fn database_override(&self) -> Option<&str> {
        self.database.as_deref().filter(|v| !v.is_empty())
    }

    fn tenant_code(&self) -> Option<&str> {
        self.tenant.as_deref().filter(|v| !v.is_empty())
    }
}

pub struct Resolver {
    registry: Option<Box<dyn TenantRegistry>>,
}

impl Resolver {
    /// `None` means no registry is configured; only explicit databases resolve.
    pub fn new(registry: Option<Box<dyn TenantRegistry>>) -> Self {
        Self { registry }
    }

    pub fn with_registry<R: TenantRegistry + 'static>(registry: R) -> Self {
        Self::new(Some(Box::new(registry)))
    }

    /// Resolves `selector` into connection descriptors, in registry order for
    /// the all-tenants path. Never opens a connection.
    pub fn resolve(
        &self,
        selector: &Selector,
        defaults: &ConnectionDefaults,
        password: &Password,
    ) -> Result<Vec<ConnectionDescriptor>, ResolveError> {
        if let Some(database) = selector.database_override() {
            tracing::debug!(database, "resolved explicit database");

            return Ok(vec![ConnectionDescriptor::new(
                defaults.host.as_str(),
                defaults.port,
                defaults.username.as_str(),
                password.clone(),
                database,
            )]);
        }

        if selector.all {
            let tenants = self.registry()?.tenants()?;
            tracing::debug!(count = tenants.len(), "resolved all tenants");

            return tenants
                .into_iter()
                .map(|tenant| describe(tenant, defaults, password))
                .collect();
        }

        if let Some(code) = selector.tenant_code() {
            let Some(tenant) = self.registry()?.tenant(code)? else {
                return Err(ResolveError::UnknownTenant(code.to_owned()));
            };

            tracing::debug!(code, database = %tenant.database, "resolved tenant");

            return Ok(vec![describe(tenant, defaults, password)?]);
        }

        Err(ResolveError::InvalidSelection)
    }

    fn registry(&self) -> Result<&dyn TenantRegistry, ResolveError> {
        self.registry
            .as_deref()
            .ok_or(ResolveError::RegistryUnavailable)
    }
}

fn describe(
    tenant: Tenant,
    defaults: &ConnectionDefaults,
    password: &Password,
) -> Result<ConnectionDescriptor, ResolveError> {
    if tenant.database.is_empty() {
        return Err(RegistryError::Unknown(anyhow::anyhow!(
            "tenant `{}` has no database",
            tenant.code
        ))
        .into());
    }

    let password = tenant
        .password
        .filter(|value| !value.is_empty())
        .map(Password::new)
        .unwrap_or_else(|| password.clone());

    Ok(ConnectionDescriptor::new(
        tenant.host.unwrap_or_else(|| defaults.host.to_owned()),
        tenant.port.or(defaults.port),
        tenant.username.unwrap_or_else(|| defaults.username.to_owned()),
        password,
        tenant.database,
    )
    .with_tenant_code(tenant.code))
}
