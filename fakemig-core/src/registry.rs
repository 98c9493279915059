use crate::{RegistryConfig, SharedConnection};

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("tenant registry: {0}")]
    Unknown(#[from] anyhow::Error),
}

/// A tenant known to the registry and how to reach its database.
///
/// Connection fields left to `None` fall back to the operator's values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tenant {
    pub code: String,
    pub database: String,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Tenant {
    pub fn new(code: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            database: database.into(),
            host: None,
            port: None,
            username: None,
            password: None,
        }
    }

    fn with_connection(mut self, connection: &SharedConnection) -> Self {
        self.host = connection.host.clone();
        self.port = connection.port;
        self.username = connection.username.clone();
        self.password = connection.password.clone();
        self
    }
}

/// Directory of tenant code to database mappings.
///
/// Read-only from fakemig's point of view.
pub trait TenantRegistry: Send + Sync {
    /// Every registered tenant, in registry order.
    fn tenants(&self) -> Result<Vec<Tenant>, RegistryError>;

    fn tenant(&self, code: &str) -> Result<Option<Tenant>, RegistryError> {
        Ok(self.tenants()?.into_iter().find(|t| t.code == code))
    }
}

/// Registry backed by a fixed list, typically built from [`RegistryConfig`].
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry(Vec<Tenant>);

impl StaticRegistry {
    pub fn new(tenants: Vec<Tenant>) -> Self {
        Self(tenants)
    }
}

impl From<RegistryConfig> for StaticRegistry {
    fn from(config: RegistryConfig) -> Self {
        let tenants = config
            .tenants
            .into_iter()
            .map(|entry| Tenant::new(entry.code, entry.database).with_connection(&config.connection))
            .collect();

        Self(tenants)
    }
}

impl TenantRegistry for StaticRegistry {
    fn tenants(&self) -> Result<Vec<Tenant>, RegistryError> {
        Ok(self.0.clone())
    }

    fn tenant(&self, code: &str) -> Result<Option<Tenant>, RegistryError> {
        Ok(self.0.iter().find(|t| t.code == code).cloned())
    }
}
