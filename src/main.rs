/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::{error::Error as _, path::PathBuf, process::ExitCode};

use clap::Parser;
use ews_delegation::{
    AddDelegateOptions, Config, DelegatePermissionLevel, DelegationReconciler, Error,
    MailboxIdentity, OperationOutcome, Transport,
};

/// Exit status when the configuration is incomplete or invalid.
const EXIT_CONFIG: u8 = 2;

/// Lists and reconciles the inbox delegates of an Exchange mailbox.
#[derive(Parser, Debug)]
#[command(name = "ews-delegation", version)]
struct CliArgs {
    /// TOML file holding the connection settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// URL of the EWS endpoint
    #[arg(long)]
    endpoint: Option<String>,

    /// Address of the mailbox whose delegates are managed
    #[arg(long)]
    owner: Option<String>,

    /// Login of the owner, either DOMAIN\user or user@domain
    #[arg(short, long)]
    username: Option<String>,

    #[arg(long, env = "EWS_DELEGATION_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Authentication scheme, either ntlm or basic
    #[arg(long)]
    auth: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long)]
    insecure: bool,

    /// Address of the delegate to add, update or ensure
    #[arg(short, long)]
    delegate: Option<String>,

    /// Inbox permission level set by --update
    #[arg(long, default_value = "Reviewer")]
    level: String,

    /// Do not list the delegates before making changes
    #[arg(long)]
    no_list_before: bool,

    /// Add the delegate with Reviewer access
    #[arg(long)]
    add: bool,

    /// Set the delegate's inbox permission level
    #[arg(long)]
    update: bool,

    /// Do not make sure the delegate is a Reviewer
    #[arg(long)]
    no_ensure: bool,

    /// Do not list the delegates after making changes
    #[arg(long)]
    no_list_after: bool,
}

/// One step of a harness run, in the order they are performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    ListBefore,
    Add,
    Update(DelegatePermissionLevel),
    EnsureReviewer,
    ListAfter,
}

impl Step {
    fn label(&self) -> String {
        match self {
            Step::ListBefore => "List delegates (before)".to_string(),
            Step::Add => "Add delegate as Reviewer (may fail if already exists)".to_string(),
            Step::Update(level) => format!("Update delegate to level: {level}"),
            Step::EnsureReviewer => "Ensure delegate is Reviewer (idempotent)".to_string(),
            Step::ListAfter => "List delegates (after)".to_string(),
        }
    }
}

impl CliArgs {
    fn needs_delegate(&self) -> bool {
        self.add || self.update || !self.no_ensure
    }

    /// The steps selected on the command line.
    fn steps(&self, level: DelegatePermissionLevel) -> Vec<Step> {
        [
            (!self.no_list_before).then_some(Step::ListBefore),
            self.add.then_some(Step::Add),
            self.update.then_some(Step::Update(level)),
            (!self.no_ensure).then_some(Step::EnsureReviewer),
            (!self.no_list_after).then_some(Step::ListAfter),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Loads the configuration file, if any, and applies the command line
    /// overrides on top of it.
    fn config(&self) -> Result<Config, Error> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        let overrides = [
            (&self.endpoint, &mut config.endpoint),
            (&self.owner, &mut config.owner),
            (&self.username, &mut config.username),
            (&self.password, &mut config.password),
        ];
        for (value, setting) in overrides {
            if let Some(value) = value {
                setting.clone_from(value);
            }
        }

        if let Some(auth) = &self.auth {
            config.auth = auth.parse()?;
        }

        if self.insecure {
            config.verify_tls = false;
        }

        Ok(config)
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CliArgs::parse();

    match run(&args) {
        Ok(code) => code,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &CliArgs) -> Result<ExitCode, Error> {
    let config = match args.config() {
        Ok(config) => config,
        Err(err @ Error::Config(_)) => {
            report(&err);
            return Ok(ExitCode::from(EXIT_CONFIG));
        }
        Err(err) => return Err(err),
    };

    let mut missing = config.missing_fields();
    if args.needs_delegate() && args.delegate.as_deref().map_or(true, |d| d.trim().is_empty()) {
        missing.push("delegate");
    }
    if !missing.is_empty() {
        eprintln!("Fill required configuration first: {}", missing.join(", "));
        return Ok(ExitCode::from(EXIT_CONFIG));
    }

    let level: DelegatePermissionLevel = match args.level.parse() {
        Ok(level) => level,
        Err(err) => {
            eprintln!("{err}");
            return Ok(ExitCode::from(EXIT_CONFIG));
        }
    };

    let delegate: Option<MailboxIdentity> = match args.delegate.as_deref() {
        Some(delegate) if args.needs_delegate() => match delegate.parse() {
            Ok(delegate) => Some(delegate),
            Err(err) => {
                report(&err);
                return Ok(ExitCode::from(EXIT_CONFIG));
            }
        },
        _ => None,
    };

    let reconciler = match DelegationReconciler::from_config(&config) {
        Ok(reconciler) => reconciler,
        Err(err @ (Error::Config(_) | Error::InvalidAddress(_) | Error::InvalidEndpoint(_))) => {
            report(&err);
            return Ok(ExitCode::from(EXIT_CONFIG));
        }
        Err(err) => return Err(err),
    };

    println!();
    println!("========== EWS Delegation Test Harness ==========");
    println!("Owner mailbox: {}", reconciler.owner());
    if let Some(delegate) = &delegate {
        println!("Delegate target: {delegate}");
    }
    println!("=================================================");
    println!();

    let mut succeeded = true;

    for step in args.steps(level) {
        println!("[STEP] {}", step.label());

        match run_step(&reconciler, step, delegate.as_ref()) {
            Ok(step_succeeded) => succeeded &= step_succeeded,
            Err(err) => {
                println!();
                println!("One or more steps failed; see logs above.");
                return Err(err);
            }
        }
    }

    println!();
    if succeeded {
        println!("All selected steps completed.");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("One or more steps failed; see logs above.");
        Ok(ExitCode::FAILURE)
    }
}

/// Performs a single step, returning whether it succeeded.
fn run_step<T>(
    reconciler: &DelegationReconciler<T>,
    step: Step,
    delegate: Option<&MailboxIdentity>,
) -> Result<bool, Error>
where
    T: Transport,
{
    let outcome = match (step, delegate) {
        (Step::ListBefore | Step::ListAfter, _) => {
            print_delegates(reconciler)?;
            return Ok(true);
        }
        (Step::Add, Some(delegate)) => {
            reconciler.add_delegate(delegate, &AddDelegateOptions::default())?
        }
        (Step::Update(level), Some(delegate)) => reconciler.update_delegate(delegate, level)?,
        (Step::EnsureReviewer, Some(delegate)) => reconciler.ensure_reviewer(delegate)?,
        (_, None) => return Ok(false),
    };

    Ok(print_outcome(&outcome))
}

fn print_delegates<T>(reconciler: &DelegationReconciler<T>) -> Result<(), Error>
where
    T: Transport,
{
    let mut found = false;

    for record in reconciler.list_delegates()? {
        found = true;
        let level = record
            .inbox_level
            .map_or("None", |level| level.as_str());

        println!("Delegate: {}, Permission Level: {level}", record.delegate);
    }

    if !found {
        println!("No delegates found for this mailbox.");
    }

    Ok(())
}

fn print_outcome(outcome: &OperationOutcome) -> bool {
    if outcome.success {
        println!("Operation Succeeded: {}", outcome.message);
    } else {
        println!("Operation Failed: {}", outcome.message);
    }

    outcome.success
}

/// Prints an error along with its chain of causes.
fn report(err: &Error) {
    eprintln!("Error: {err}");

    let mut source = err.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = cause.source();
    }
}
