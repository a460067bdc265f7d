//! # Entity Subcommand
//!
//! Entity and version management. Creating an entity always creates its
//! first version record; `new-version` chains a successor onto an
//! existing version record and bumps the structural label.
//!
//! ## Subcommands
//!
//! - `create` — New root entity with its `1.0` version.
//! - `new-version` — Successor version of an existing record.
//! - `show` — One entity row in full.
//! - `list` — All entities, optionally filtered by kind.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Subcommand};

use grc_core::{EntityId, EntityIdentifier, EntityKind, UserId, VersionId};
use grc_workflow::{ApprovalWorkflow, CreateVersionRequest, LabelBump};

use crate::{load_store, save_store};

/// Arguments for the `grc entity` subcommand.
#[derive(Args, Debug)]
pub struct EntityArgs {
    #[command(subcommand)]
    pub command: EntityCommand,
}

/// Entity subcommands.
#[derive(Subcommand, Debug)]
pub enum EntityCommand {
    /// Create a new root entity with its first version (label 1.0).
    Create {
        /// Entity kind: framework, policy, subpolicy, risk-mitigation.
        #[arg(long)]
        kind: EntityKind,
        /// Stable business identifier (e.g. "FW-ISO27001").
        #[arg(long)]
        identifier: String,
        /// Display name.
        #[arg(long)]
        name: String,
        /// Assigned reviewer user id.
        #[arg(long)]
        reviewer: Option<i64>,
        /// Structural owner entity id (a policy's framework, a
        /// subpolicy's policy).
        #[arg(long)]
        owner: Option<String>,
        /// Activation start date (YYYY-MM-DD). A future date schedules
        /// activation instead of applying it.
        #[arg(long)]
        start_date: Option<NaiveDate>,
        /// Activation end date (YYYY-MM-DD).
        #[arg(long)]
        end_date: Option<NaiveDate>,
    },

    /// Create a successor version chained to an existing version record.
    NewVersion {
        /// The version record being superseded.
        #[arg(long)]
        previous: String,
        /// Display name of the new version.
        #[arg(long)]
        name: String,
        /// Bump the minor label component instead of the major one.
        #[arg(long)]
        minor: bool,
        /// Override the inherited reviewer.
        #[arg(long)]
        reviewer: Option<i64>,
        /// Activation start date (YYYY-MM-DD).
        #[arg(long)]
        start_date: Option<NaiveDate>,
        /// Activation end date (YYYY-MM-DD).
        #[arg(long)]
        end_date: Option<NaiveDate>,
    },

    /// Show one entity row.
    Show {
        /// Entity id.
        #[arg(long)]
        id: String,
    },

    /// List all entities.
    List {
        /// Restrict to one kind.
        #[arg(long)]
        kind: Option<EntityKind>,
    },
}

/// Execute the entity subcommand.
pub fn run_entity(args: &EntityArgs, root: &Path, user: UserId) -> Result<u8> {
    match &args.command {
        EntityCommand::Create {
            kind,
            identifier,
            name,
            reviewer,
            owner,
            start_date,
            end_date,
        } => {
            let request = CreateVersionRequest::Root {
                kind: *kind,
                identifier: EntityIdentifier::new(identifier.clone())?,
                name: name.clone(),
                reviewer: reviewer.map(UserId),
                owner: owner.as_deref().map(EntityId::parse).transpose()?,
                start_date: *start_date,
                end_date: *end_date,
            };
            cmd_create_version(root, user, request)
        }

        EntityCommand::NewVersion {
            previous,
            name,
            minor,
            reviewer,
            start_date,
            end_date,
        } => {
            let request = CreateVersionRequest::Successor {
                previous: VersionId::parse(previous)?,
                name: name.clone(),
                bump: if *minor {
                    LabelBump::Minor
                } else {
                    LabelBump::Major
                },
                reviewer: reviewer.map(UserId),
                start_date: *start_date,
                end_date: *end_date,
            };
            cmd_create_version(root, user, request)
        }

        EntityCommand::Show { id } => cmd_show(root, id),

        EntityCommand::List { kind } => cmd_list(root, *kind),
    }
}

/// Create a root or successor version and persist the store.
fn cmd_create_version(root: &Path, user: UserId, request: CreateVersionRequest) -> Result<u8> {
    let store = load_store(root)?;
    let wf = ApprovalWorkflow::permissive(store);

    let outcome = wf
        .create_version(user, request)
        .context("failed to create version")?;
    save_store(root, wf.store())?;

    let entity = wf.store().get_entity(outcome.entity_id)?;
    let version = wf.store().get_version(outcome.version_id)?;
    println!(
        "OK: created {} {} labeled {}",
        entity.kind, entity.identifier, outcome.label
    );
    println!("  entity id:  {}", outcome.entity_id);
    println!("  version id: {}", outcome.version_id);
    if let Some(previous) = version.previous {
        println!("  supersedes: {previous}");
    }
    Ok(0)
}

/// Show one entity row in full.
fn cmd_show(root: &Path, id: &str) -> Result<u8> {
    let store = load_store(root)?;
    let entity = store.get_entity(EntityId::parse(id)?)?;

    println!("Entity: {}", entity.id);
    println!("  Kind: {}", entity.kind);
    println!("  Identifier: {}", entity.identifier);
    println!("  Name: {}", entity.name);
    println!("  Label: {}", entity.current_label);
    println!("  Status: {}", entity.status);
    println!("  Activation: {}", entity.activation);
    println!("  Review cycles: {}", entity.review_cycles);
    match entity.reviewer {
        Some(reviewer) => println!("  Reviewer: {reviewer}"),
        None => println!("  Reviewer: (none)"),
    }
    if let Some(owner) = entity.owner {
        println!("  Owner: {owner}");
    }
    if let Some(start) = entity.start_date {
        println!("  Start date: {start}");
    }
    if let Some(end) = entity.end_date {
        println!("  End date: {end}");
    }
    println!("  Created: {} by {}", entity.created_at, entity.created_by);
    Ok(0)
}

/// List entities, sorted by identifier then label.
fn cmd_list(root: &Path, kind: Option<EntityKind>) -> Result<u8> {
    let store = load_store(root)?;
    let mut rows = store.read(|tables| {
        tables
            .entities()
            .filter(|e| kind.map_or(true, |k| e.kind == k))
            .cloned()
            .collect::<Vec<_>>()
    });
    rows.sort_by(|a, b| {
        a.identifier
            .cmp(&b.identifier)
            .then(a.current_label.cmp(&b.current_label))
    });

    if rows.is_empty() {
        println!("No entities found.");
        return Ok(0);
    }

    println!("Entities ({}):", rows.len());
    for e in &rows {
        println!(
            "  {} {} [{}] {}/{} {}",
            e.identifier, e.current_label, e.kind, e.status, e.activation, e.id
        );
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_create_and_show() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        let request = CreateVersionRequest::root(
            EntityKind::Framework,
            EntityIdentifier::new("FW-CLI").unwrap(),
            "cli framework",
        );
        assert_eq!(cmd_create_version(root, UserId(1), request).unwrap(), 0);

        let store = load_store(root).unwrap();
        let rows = store.read(|t| t.entities().cloned().collect::<Vec<_>>());
        assert_eq!(rows.len(), 1);
        assert_eq!(cmd_show(root, &rows[0].id.to_string()).unwrap(), 0);
    }

    #[test]
    fn entity_new_version_bumps_label() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        let request = CreateVersionRequest::root(
            EntityKind::Policy,
            EntityIdentifier::new("POL-CLI").unwrap(),
            "cli policy",
        );
        cmd_create_version(root, UserId(1), request).unwrap();

        let store = load_store(root).unwrap();
        let version_id = store.read(|t| t.versions().next().map(|v| v.id)).unwrap();

        let successor = CreateVersionRequest::successor(version_id, "cli policy v2");
        cmd_create_version(root, UserId(1), successor).unwrap();

        let store = load_store(root).unwrap();
        let labels: Vec<String> = {
            let mut rows = store.read(|t| t.entities().cloned().collect::<Vec<_>>());
            rows.sort_by_key(|e| e.current_label);
            rows.iter().map(|e| e.current_label.to_string()).collect()
        };
        assert_eq!(labels, vec!["1.0", "2.0"]);
    }

    #[test]
    fn entity_list_handles_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(cmd_list(dir.path(), None).unwrap(), 0);
    }
}
