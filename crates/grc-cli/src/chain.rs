//! # Chain Subcommand
//!
//! Version-chain inspection and activation switching. A chain is the set
//! of entities connected through previous-version links; at most one
//! member is active at a time, and activating one deactivates the rest.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Subcommand};

use grc_core::{EntityId, UserId};
use grc_workflow::ApprovalWorkflow;

use crate::{load_store, save_store};

/// Arguments for the `grc chain` subcommand.
#[derive(Args, Debug)]
pub struct ChainArgs {
    #[command(subcommand)]
    pub command: ChainCommand,
}

/// Chain subcommands.
#[derive(Subcommand, Debug)]
pub enum ChainCommand {
    /// Show every member of an entity's version chain.
    Show {
        /// Entity id of any chain member.
        #[arg(long)]
        id: String,
    },

    /// Activate an entity, deactivating the rest of its chain.
    Activate {
        /// Entity id.
        #[arg(long)]
        id: String,
    },

    /// Deactivate an entity.
    Deactivate {
        /// Entity id.
        #[arg(long)]
        id: String,
        /// Also deactivate everything the entity structurally owns.
        #[arg(long)]
        cascade: bool,
    },

    /// Apply scheduled activations whose start date has arrived.
    RunSchedules {
        /// Treat this date as today (YYYY-MM-DD). Defaults to the
        /// current UTC date.
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

/// Execute the chain subcommand.
pub fn run_chain(args: &ChainArgs, root: &Path, user: UserId) -> Result<u8> {
    match &args.command {
        ChainCommand::Show { id } => cmd_show(root, id),
        ChainCommand::Activate { id } => cmd_activate(root, user, id),
        ChainCommand::Deactivate { id, cascade } => cmd_deactivate(root, user, id, *cascade),
        ChainCommand::RunSchedules { today } => cmd_run_schedules(root, user, *today),
    }
}

/// List the chain's members, oldest label first.
fn cmd_show(root: &Path, id: &str) -> Result<u8> {
    let store = load_store(root)?;
    let wf = ApprovalWorkflow::permissive(store);

    let entity_id = EntityId::parse(id)?;
    let members = wf
        .get_chain(entity_id)
        .context("failed to resolve version chain")?;

    let mut rows = Vec::with_capacity(members.len());
    for member in members {
        rows.push(wf.store().get_entity(member)?);
    }
    rows.sort_by_key(|e| e.current_label);

    println!("Version chain ({} members):", rows.len());
    for e in &rows {
        let marker = if e.id == entity_id { "*" } else { " " };
        println!(
            " {marker} {} {} {}/{} {}",
            e.identifier, e.current_label, e.status, e.activation, e.id
        );
    }
    Ok(0)
}

/// Activate one chain member, or schedule it if its start date is ahead.
fn cmd_activate(root: &Path, user: UserId, id: &str) -> Result<u8> {
    let store = load_store(root)?;
    let wf = ApprovalWorkflow::permissive(store);

    let entity_id = EntityId::parse(id)?;
    let outcome = wf
        .activate(user, entity_id)
        .context("failed to activate")?;
    save_store(root, wf.store())?;

    let entity = wf.store().get_entity(outcome.activated)?;
    if outcome.scheduled {
        match entity.start_date {
            Some(start) => println!(
                "OK: scheduled {} {} for {start}",
                entity.identifier, entity.current_label
            ),
            None => println!(
                "OK: scheduled {} {}",
                entity.identifier, entity.current_label
            ),
        }
    } else {
        println!(
            "OK: activated {} {}",
            entity.identifier, entity.current_label
        );
        for peer in &outcome.deactivated {
            println!("  deactivated {peer}");
        }
    }
    Ok(0)
}

/// Deactivate one entity, optionally cascading through ownership.
fn cmd_deactivate(root: &Path, user: UserId, id: &str, cascade: bool) -> Result<u8> {
    let store = load_store(root)?;
    let wf = ApprovalWorkflow::permissive(store);

    let entity_id = EntityId::parse(id)?;
    let outcome = wf
        .deactivate(user, entity_id, cascade)
        .context("failed to deactivate")?;
    save_store(root, wf.store())?;

    let entity = wf.store().get_entity(outcome.deactivated)?;
    println!(
        "OK: deactivated {} {}",
        entity.identifier, entity.current_label
    );
    if cascade {
        println!("  owned entities affected: {}", outcome.children_affected);
    }
    Ok(0)
}

/// Promote every scheduled activation whose start date has arrived.
fn cmd_run_schedules(root: &Path, user: UserId, today: Option<NaiveDate>) -> Result<u8> {
    let store = load_store(root)?;
    let wf = ApprovalWorkflow::permissive(store);

    let today = today.unwrap_or_else(|| chrono::Utc::now().date_naive());
    let promoted = wf
        .apply_due_schedules(user, today)
        .context("failed to apply scheduled activations")?;
    save_store(root, wf.store())?;

    if promoted.is_empty() {
        println!("OK: no scheduled activations due on {today}");
        return Ok(0);
    }

    println!("OK: applied {} scheduled activation(s):", promoted.len());
    for entity_id in &promoted {
        let entity = wf.store().get_entity(*entity_id)?;
        println!("  {} {} is now active", entity.identifier, entity.current_label);
    }
    Ok(0)
}
