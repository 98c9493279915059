use clap::{Args, ValueEnum};
use fakemig::{ConnectionDefaults, Credentials, Ledger, Selector};

/// Which databases to operate on.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Tenant code, as listed in TENANT_DB_TENANTS
    pub tenant: Option<String>,

    /// Every tenant of the registry
    #[arg(short, long)]
    pub all: bool,

    /// Explicit database name (a file path with the sqlite driver)
    #[arg(short, long = "db", value_name = "NAME")]
    pub database: Option<String>,
}

impl TargetArgs {
    pub fn selector(&self) -> Selector {
        Selector {
            database: self.database.clone(),
            tenant: self.tenant.clone(),
            all: self.all,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Driver {
    #[default]
    Mysql,
    Postgres,
    Sqlite,
}

impl Driver {
    pub fn ledger(self) -> Box<dyn Ledger> {
        match self {
            Self::Mysql => Box::new(fakemig::sql::MySql::new()),
            Self::Postgres => Box::new(fakemig::sql::Postgres::new()),
            Self::Sqlite => Box::new(fakemig::sql::Sqlite::new()),
        }
    }
}

/// How to reach the databases.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Database host, used by tenants without TENANT_DB_HOST [default: localhost]
    #[arg(long)]
    pub host: Option<String>,

    /// Database port, used by tenants without TENANT_DB_PORT [default: driver port]
    #[arg(long)]
    pub port: Option<u16>,

    /// Database user, used by tenants without TENANT_DB_USER [default: root]
    #[arg(short, long = "user", value_name = "USER")]
    pub username: Option<String>,

    /// Ask for the database password, ignored when a password is given
    #[arg(short = 'p', long = "pass")]
    pub prompt: bool,

    /// Database password, used by tenants without TENANT_DB_PASSWORD [default: root]
    #[arg(long, env = "FAKEMIG_DB_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Database driver
    #[arg(long, value_enum, default_value_t)]
    pub driver: Driver,
}

impl ConnectionArgs {
    pub fn defaults(&self) -> ConnectionDefaults {
        let mut defaults = ConnectionDefaults::default().with_port(self.port);

        if let Some(host) = &self.host {
            defaults = defaults.with_host(host);
        }

        if let Some(username) = &self.username {
            defaults = defaults.with_username(username);
        }

        defaults
    }

    pub fn credentials(&self) -> Credentials {
        match (&self.password, self.prompt) {
            (Some(value), _) => Credentials::Explicit(value.to_owned()),
            (None, true) => Credentials::Prompted,
            (None, false) => Credentials::Default,
        }
    }
}
