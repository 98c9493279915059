//! fakemig: mark schema migrations as applied or reverted without running them.

mod args;
mod commands_fake;
mod commands_init;
mod prompt;

use std::{process::ExitCode, str::FromStr};

use clap::{Parser, Subcommand};
use colored::Colorize;
use fakemig::{RegistryConfig, Resolver, StaticRegistry, TenantRegistry};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use args::{ConnectionArgs, TargetArgs};

#[derive(Parser)]
#[command(
    name = "fakemig",
    about = "Mark schema migrations as applied or reverted without running them"
)]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a migration in the ledger, or remove it with --revert
    Fake {
        /// Migration file name, `<version>_<name>`
        migration: String,

        #[command(flatten)]
        target: TargetArgs,

        /// Remove the ledger row instead of inserting it
        #[arg(short, long)]
        revert: bool,

        /// Stop at the first failing database
        #[arg(long)]
        abort_on_error: bool,

        #[command(flatten)]
        connection: ConnectionArgs,
    },

    /// Create the ledger table
    Init {
        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        connection: ConnectionArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::from_str("warn,fakemig=info")?,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fake {
            migration,
            target,
            revert,
            abort_on_error,
            connection,
        } => {
            commands_fake::cmd_fake(commands_fake::FakeArgs {
                migration: &migration,
                target: &target,
                connection: &connection,
                revert,
                abort_on_error,
            })
            .await
        }
        Commands::Init { target, connection } => {
            commands_init::cmd_init(&target, &connection).await
        }
    }
}

/// Builds the resolver from the `TENANT_DB_*` environment.
pub(crate) fn resolver() -> anyhow::Result<Resolver> {
    let registry = RegistryConfig::from_env()?
        .map(|config| Box::new(StaticRegistry::from(config)) as Box<dyn TenantRegistry>);

    Ok(Resolver::new(registry))
}

pub(crate) fn usage_hint(command: &str) {
    eprintln!(
        "{}: select a database with --db NAME, a TENANT code, or --all",
        "error".red().bold()
    );
    eprintln!("\nUsage: fakemig {command} [TENANT] [--all] [--db NAME]");
}

#[cfg(test)]
mod tests {
    use super::*;
    use args::Driver;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn fake_all_revert() {
        let cli = Cli::try_parse_from([
            "fakemig",
            "fake",
            "20171018082229_scheduler_migrations",
            "--all",
            "-r",
        ])
        .unwrap();

        let Commands::Fake {
            migration,
            target,
            revert,
            abort_on_error,
            connection,
        } = cli.command
        else {
            panic!("expected fake");
        };

        assert_eq!(migration, "20171018082229_scheduler_migrations");
        assert!(target.all);
        assert!(revert);
        assert!(!abort_on_error);
        assert_eq!(connection.driver, Driver::Mysql);
    }

    #[test]
    fn fake_tenant_with_connection() {
        let cli = Cli::try_parse_from([
            "fakemig",
            "fake",
            "20171018082229_scheduler_migrations",
            "ACME",
            "--host",
            "db.internal",
            "--port",
            "3307",
            "-u",
            "admin",
            "-p",
            "--driver",
            "postgres",
        ])
        .unwrap();

        let Commands::Fake {
            target, connection, ..
        } = cli.command
        else {
            panic!("expected fake");
        };

        assert_eq!(target.tenant.as_deref(), Some("ACME"));
        assert_eq!(connection.port, Some(3307));
        assert_eq!(connection.username.as_deref(), Some("admin"));
        assert!(connection.prompt);
        assert_eq!(connection.driver, Driver::Postgres);
    }

    #[test]
    fn init_explicit_database() {
        let cli = Cli::try_parse_from(["fakemig", "init", "--db", "pro", "--driver", "sqlite"])
            .unwrap();

        let Commands::Init { target, connection } = cli.command else {
            panic!("expected init");
        };

        assert_eq!(target.database.as_deref(), Some("pro"));
        assert_eq!(connection.driver, Driver::Sqlite);
    }

    #[test]
    fn invalid_port_is_rejected() {
        assert!(Cli::try_parse_from(["fakemig", "fake", "1_x", "--all", "--port", "nope"]).is_err());
    }
}
