//! Pagegate CLI
//!
//! Command-line interface for checking and linting wiki access policies.

#![warn(clippy::all)]
#![forbid(unsafe_code)]

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use pagegate_cli::Policy;
use pagegate_cli::commands::{self, CheckRequest};

/// Pagegate CLI - wiki page access control diagnostics
#[derive(Parser, Debug)]
#[command(name = "pagegate")]
#[command(author, version, about = "Wiki page access control diagnostics", long_about = None)]
struct Args {
    /// Policy file path
    #[arg(short, long, env = "PAGEGATE_POLICY")]
    policy: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decide a single request
    Check {
        /// Requesting user; anonymous when omitted
        #[arg(short, long)]
        user: Option<String>,
        /// Role held by the session (repeatable)
        #[arg(short, long = "role")]
        roles: Vec<String>,
        /// Page name
        #[arg(long)]
        page: String,
        /// Action list, e.g. `view` or `edit,upload`
        #[arg(short, long)]
        action: String,
        /// Print the verdict as JSON
        #[arg(long)]
        json: bool,
    },
    /// Report problems in the policy
    Lint,
    /// Print a page's rules
    Show {
        /// Page name
        #[arg(long)]
        page: String,
    },
}

fn init_logging(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "info,pagegate_acl=debug,pagegate_cli=debug",
        _ => "debug,pagegate_acl=trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose);

    let policy = Policy::load(&args.policy)
        .with_context(|| format!("loading policy {}", args.policy.display()))?;

    match args.command {
        Command::Check {
            user,
            roles,
            page,
            action,
            json,
        } => {
            let request = CheckRequest {
                user,
                roles,
                page,
                action,
                json,
            };
            println!("{}", commands::check(&policy, &request)?);
        }
        Command::Lint => {
            let report = commands::lint(&policy);
            print!("{}", report.text);
            if !report.is_clean() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Show { page } => {
            print!("{}", commands::show(&policy, &page)?);
        }
    }
    Ok(ExitCode::SUCCESS)
}
