use std::fmt;

/// A database password. `Debug` and `Display` never print the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

impl fmt::Display for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// Identifies one target database.
///
/// Built by the [`Resolver`](crate::Resolver) and consumed once per ledger call.
/// `database_name` is never empty and a password is always present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    host: String,
    port: Option<u16>,
    username: String,
    password: Password,
    database_name: String,
    tenant_code: Option<String>,
}

impl ConnectionDescriptor {
    pub(crate) fn new(
        host: impl Into<String>,
        port: Option<u16>,
        username: impl Into<String>,
        password: Password,
        database_name: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            password,
            database_name: database_name.into(),
            tenant_code: None,
        }
    }

    pub(crate) fn with_tenant_code(mut self, code: impl Into<String>) -> Self {
        self.tenant_code = Some(code.into());
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// `None` means the driver's default port.
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &Password {
        &self.password
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    pub fn tenant_code(&self) -> Option<&str> {
        self.tenant_code.as_deref()
    }
}

impl fmt::Display for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tenant_code {
            Some(code) => write!(f, "{} [{code}]", self.database_name),
            None => f.write_str(&self.database_name),
        }
    }
}

/// Connection parameters supplied by the operator, used for explicit
/// overrides and as fallback for tenants that do not define their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionDefaults {
    pub host: String,
    pub port: Option<u16>,
    pub username: String,
}

impl Default for ConnectionDefaults {
    fn default() -> Self {
        Self {
            host: "localhost".to_owned(),
            port: None,
            username: "root".to_owned(),
        }
    }
}

impl ConnectionDefaults {
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }
}
