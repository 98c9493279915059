//! `fakemig fake` - mark a migration as applied or reverted.

use std::process::ExitCode;

use colored::Colorize;
use fakemig::{
    Action, Batch, BatchPolicy, Ledger, MigrationKey, OperationOutcome, OutcomeStatus,
    PasswordPrompt, Report, Resolver,
};

use crate::{args::ConnectionArgs, args::TargetArgs, prompt::TerminalPrompt};

pub(crate) struct FakeArgs<'a> {
    pub migration: &'a str,
    pub target: &'a TargetArgs,
    pub connection: &'a ConnectionArgs,
    pub revert: bool,
    pub abort_on_error: bool,
}

pub(crate) async fn cmd_fake(args: FakeArgs<'_>) -> anyhow::Result<ExitCode> {
    let ledger = args.connection.driver.ledger();
    let status = fake(args, ledger.as_ref(), &TerminalPrompt, crate::resolver).await?;

    Ok(ExitCode::from(status))
}

/// Runs the command and returns the process exit status.
///
/// The selection is checked before the password is resolved and before the
/// tenant registry is loaded.
pub(crate) async fn fake(
    args: FakeArgs<'_>,
    ledger: &dyn Ledger,
    prompt: &dyn PasswordPrompt,
    resolver: impl FnOnce() -> anyhow::Result<Resolver>,
) -> anyhow::Result<u8> {
    let key = MigrationKey::parse(args.migration)?.synthetic();
    let selector = args.target.selector();

    if !selector.is_valid() {
        crate::usage_hint("fake <MIGRATION>");
        return Ok(1);
    }

    let password = args.connection.credentials().resolve(prompt)?;
    let targets = resolver()?.resolve(&selector, &args.connection.defaults(), &password)?;

    let action = if args.revert {
        Action::Revert
    } else {
        Action::Apply
    };
    let policy = if args.abort_on_error {
        BatchPolicy::AbortOnError
    } else {
        BatchPolicy::ContinueOnError
    };

    if action == Action::Revert {
        println!(
            "{}",
            format!("Only the ledger row of {key} is removed, its schema changes stay in place.")
                .yellow()
        );
    }

    let report = Batch::new(ledger, &key, action)
        .policy(policy)
        .on_outcome(|outcome| print_outcome(outcome, action))
        .run(targets)
        .await;

    print_summary(&report);

    Ok(exit_status(&report))
}

fn exit_status(report: &Report) -> u8 {
    if report.is_success() {
        0
    } else {
        1
    }
}

fn label(outcome: &OperationOutcome) -> String {
    match &outcome.tenant_code {
        Some(code) => format!("{} [{code}]", outcome.database),
        None => outcome.database.to_owned(),
    }
}

fn print_outcome(outcome: &OperationOutcome, action: Action) {
    println!("{}", outcome_line(outcome, action));
}

fn outcome_line(outcome: &OperationOutcome, action: Action) -> String {
    let label = label(outcome).bold();

    match (&outcome.status, action) {
        (OutcomeStatus::Changed, Action::Apply) => {
            format!("{} {label}: migrated", "ok".green().bold())
        }
        (OutcomeStatus::Changed, Action::Revert) => {
            format!("{} {label}: reverted", "ok".green().bold())
        }
        (OutcomeStatus::Unchanged, Action::Apply) => {
            format!("{} {label}: already migrated", "--".cyan())
        }
        (OutcomeStatus::Unchanged, Action::Revert) => {
            format!("{} {label}: already not migrated", "--".cyan())
        }
        (OutcomeStatus::Failed(err), _) => {
            format!("{} {label}: [{}] {err}", "FAIL".red().bold(), err.kind())
        }
        (OutcomeStatus::Skipped, _) => format!("{} {label}: skipped", "skip".dimmed()),
    }
}

fn print_summary(report: &Report) {
    let summary = format!(
        "{} changed, {} unchanged, {} failed, {} skipped",
        report.changed(),
        report.unchanged(),
        report.failed(),
        report.skipped()
    );

    if report.is_success() {
        println!("{}", summary.green());
    } else {
        println!("{}", summary.red().bold());
    }
}
