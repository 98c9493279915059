//! Tenant registry configuration.
//!
//! The registry is read from `TENANT_DB_*` environment variables:
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `TENANT_DB_TENANTS` | `CODE:database` pairs separated by commas, in registry order |
//! | `TENANT_DB_HOST` | Host shared by every tenant database |
//! | `TENANT_DB_PORT` | Port shared by every tenant database |
//! | `TENANT_DB_USER` | Username shared by every tenant database |
//! | `TENANT_DB_PASSWORD` | Password shared by every tenant database |
//!
//! Without `TENANT_DB_TENANTS` no registry is configured at all.

use std::collections::HashSet;

pub const TENANTS_VAR: &str = "TENANT_DB_TENANTS";
pub const HOST_VAR: &str = "TENANT_DB_HOST";
pub const PORT_VAR: &str = "TENANT_DB_PORT";
pub const USER_VAR: &str = "TENANT_DB_USER";
pub const PASSWORD_VAR: &str = "TENANT_DB_PASSWORD";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}: invalid port `{value}`")]
    InvalidPort { var: &'static str, value: String },

    #[error("{var}: expected `CODE:database`, got `{value}`")]
    InvalidTenant { var: &'static str, value: String },

    #[error("{var}: duplicate tenant code `{code}`")]
    DuplicateTenant { var: &'static str, code: String },

    #[error("{var}: no tenant defined")]
    NoTenant { var: &'static str },
}

/// One `CODE:database` entry of the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantEntry {
    pub code: String,
    pub database: String,
}

/// Connection settings shared by every tenant database.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharedConnection {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Registry configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Tenants in registry order.
    pub tenants: Vec<TenantEntry>,

    /// Settings applied to every tenant.
    pub connection: SharedConnection,
}

impl RegistryConfig {
    /// Reads the configuration from the process environment.
    ///
    /// Returns `Ok(None)` when `TENANT_DB_TENANTS` is not set.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `var`, which maps a variable name to
    /// its value.
    pub fn from_vars<F>(var: F) -> Result<Option<Self>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| var(name).filter(|v| !v.trim().is_empty());

        let Some(tenants) = non_empty(TENANTS_VAR) else {
            return Ok(None);
        };

        let port = match non_empty(PORT_VAR) {
            Some(value) => Some(value.trim().parse::<u16>().map_err(|_| {
                ConfigError::InvalidPort {
                    var: PORT_VAR,
                    value: value.clone(),
                }
            })?),
            None => None,
        };

        let config = Self {
            tenants: parse_tenants(&tenants)?,
            connection: SharedConnection {
                host: non_empty(HOST_VAR),
                port,
                username: non_empty(USER_VAR),
                password: non_empty(PASSWORD_VAR),
            },
        };

        config.validate()?;

        Ok(Some(config))
    }

    pub fn with_tenant(mut self, code: impl Into<String>, database: impl Into<String>) -> Self {
        self.tenants.push(TenantEntry {
            code: code.into(),
            database: database.into(),
        });
        self
    }

    pub fn with_connection(mut self, connection: SharedConnection) -> Self {
        self.connection = connection;
        self
    }

    /// Validate the configuration.
    ///
    /// # Checks
    ///
    /// - At least one tenant
    /// - No empty code or database
    /// - No duplicate tenant code
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tenants.is_empty() {
            return Err(ConfigError::NoTenant { var: TENANTS_VAR });
        }

        let mut seen = HashSet::new();

        for tenant in &self.tenants {
            if tenant.code.is_empty() || tenant.database.is_empty() {
                return Err(ConfigError::InvalidTenant {
                    var: TENANTS_VAR,
                    value: format!("{}:{}", tenant.code, tenant.database),
                });
            }

            if !seen.insert(tenant.code.as_str()) {
                return Err(ConfigError::DuplicateTenant {
                    var: TENANTS_VAR,
                    code: tenant.code.to_owned(),
                });
            }
        }

        Ok(())
    }
}

fn parse_tenants(value: &str) -> Result<Vec<TenantEntry>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let Some((code, database)) = pair.split_once(':') else {
                return Err(ConfigError::InvalidTenant {
                    var: TENANTS_VAR,
                    value: pair.to_owned(),
                });
            };

            Ok(TenantEntry {
                code: code.trim().to_owned(),
                database: database.trim().to_owned(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn missing_tenants_means_no_registry() {
        let config = RegistryConfig::from_vars(vars(&[(HOST_VAR, "db.internal")])).unwrap();

        assert_eq!(config, None);
    }

    #[test]
    fn tenants_keep_declared_order() {
        let config = RegistryConfig::from_vars(vars(&[
            (TENANTS_VAR, "C:c_db, A:a_db,B:b_db"),
            (HOST_VAR, "db.internal"),
            (PORT_VAR, "3307"),
            (USER_VAR, "admin"),
            (PASSWORD_VAR, "secret"),
        ]))
        .unwrap()
        .unwrap();

        let codes: Vec<_> = config.tenants.iter().map(|t| t.code.as_str()).collect();
        assert_eq!(codes, ["C", "A", "B"]);
        assert_eq!(config.tenants[1].database, "a_db");
        assert_eq!(
            config.connection,
            SharedConnection {
                host: Some("db.internal".to_owned()),
                port: Some(3307),
                username: Some("admin".to_owned()),
                password: Some("secret".to_owned()),
            }
        );
    }

    #[test]
    fn empty_values_count_as_absent() {
        let config = RegistryConfig::from_vars(vars(&[
            (TENANTS_VAR, "A:a_db"),
            (HOST_VAR, ""),
            (USER_VAR, " "),
            (PASSWORD_VAR, ""),
        ]))
        .unwrap()
        .unwrap();

        assert_eq!(config.connection, SharedConnection::default());
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = RegistryConfig::from_vars(vars(&[(TENANTS_VAR, "A:a_db"), (PORT_VAR, "mysql")]))
            .unwrap_err();

        assert_eq!(
            err,
            ConfigError::InvalidPort {
                var: PORT_VAR,
                value: "mysql".to_owned()
            }
        );
    }

    #[test]
    fn malformed_pair_is_rejected() {
        let err = RegistryConfig::from_vars(vars(&[(TENANTS_VAR, "A:a_db,B")])).unwrap_err();

        assert!(matches!(err, ConfigError::InvalidTenant { .. }));

        let err = RegistryConfig::from_vars(vars(&[(TENANTS_VAR, "A:")])).unwrap_err();

        assert!(matches!(err, ConfigError::InvalidTenant { .. }));
    }

    #[test]
    fn duplicate_code_is_rejected() {
        let err =
            RegistryConfig::from_vars(vars(&[(TENANTS_VAR, "A:a_db,A:other_db")])).unwrap_err();

        assert_eq!(
            err,
            ConfigError::DuplicateTenant {
                var: TENANTS_VAR,
                code: "A".to_owned()
            }
        );
    }

    #[test]
    fn only_separators_is_rejected() {
        let err = RegistryConfig::from_vars(vars(&[(TENANTS_VAR, " , ")])).unwrap_err();

        assert_eq!(err, ConfigError::NoTenant { var: TENANTS_VAR });
    }
}
