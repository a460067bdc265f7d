//! # grc CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.
//! Uses clap derive macros; global flags cover verbosity, the acting
//! user, and the state root.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use grc_cli::chain::{run_chain, ChainArgs};
use grc_cli::entity::{run_entity, EntityArgs};
use grc_cli::review::{run_review, ReviewArgs};
use grc_core::UserId;

/// GRC Stack CLI
///
/// Operator front-end for the versioned entity lifecycle and approval
/// workflow engine. State is a JSON export of the store under
/// `.grc/state.json`.
#[derive(Parser, Debug)]
#[command(name = "grc", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Acting user id, recorded on every created record.
    #[arg(long, global = true, default_value_t = 1)]
    user: i64,

    /// State root directory. Defaults to the nearest ancestor holding a
    /// `.grc/` directory, else the current directory.
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Entity and version management (create, new-version, show, list).
    Entity(EntityArgs),

    /// Review workflow (submit, decide, resubmit, history, rejected).
    Review(ReviewArgs),

    /// Version chains (show, activate, deactivate, run-schedules).
    Chain(ChainArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let root = cli.root.clone().unwrap_or_else(|| {
        resolve_state_root()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    });
    tracing::debug!(root = %root.display(), "resolved state root");

    let user = UserId(cli.user);
    let result = match cli.command {
        Commands::Entity(args) => run_entity(&args, &root, user),
        Commands::Review(args) => run_review(&args, &root, user),
        Commands::Chain(args) => run_chain(&args, &root, user),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

/// Walk up from the current directory to the nearest directory holding
/// a `.grc/` state directory.
fn resolve_state_root() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    let mut dir = cwd.as_path();
    loop {
        if dir.join(".grc").is_dir() {
            return Some(dir.to_path_buf());
        }
        dir = dir.parent()?;
    }
}
