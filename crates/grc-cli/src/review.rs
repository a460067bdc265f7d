//! # Review Subcommand
//!
//! The approval workflow from the command line: submit drafts for review,
//! record reviewer verdicts, resubmit after a rejection, and inspect the
//! append-only approval history.
//!
//! Submissions carry a snapshot of the entity under review. Pass one as a
//! JSON file with `--snapshot`, or omit it to submit a skeleton built
//! from the entity row. Subpolicies have no standalone snapshot; they are
//! reviewed inside their owning policy's document.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};

use grc_core::{ApprovalId, EntityId, EntityIdentifier, EntityKind, UserId};
use grc_snapshot::{
    FrameworkSnapshot, PolicySnapshot, ReviewMark, RiskMitigationSnapshot, Snapshot,
};
use grc_store::EntityRecord;
use grc_workflow::{ApprovalWorkflow, Verdict};

use crate::{load_store, save_store};

/// Arguments for the `grc review` subcommand.
#[derive(Args, Debug)]
pub struct ReviewArgs {
    #[command(subcommand)]
    pub command: ReviewCommand,
}

/// Review subcommands.
#[derive(Subcommand, Debug)]
pub enum ReviewCommand {
    /// Submit a draft entity for review.
    Submit {
        /// Entity id.
        #[arg(long)]
        id: String,
        /// JSON snapshot file to submit. Defaults to a skeleton built
        /// from the entity row.
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },

    /// Record a reviewer verdict on a pending submission.
    Decide {
        /// The approval record being decided.
        #[arg(long)]
        approval: String,
        /// The verdict: approve or reject.
        #[arg(long)]
        verdict: String,
        /// Reviewer remarks, usually required context on a rejection.
        #[arg(long)]
        remarks: Option<String>,
        /// JSON snapshot file with the reviewer's per-node marks.
        /// Defaults to the submission's snapshot.
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },

    /// Resubmit a rejected entity with a revised snapshot.
    Resubmit {
        /// Entity id.
        #[arg(long)]
        id: String,
        /// JSON snapshot file to resubmit. Defaults to a skeleton built
        /// from the entity row.
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },

    /// Show the approval history of a business identifier.
    History {
        /// Stable business identifier (e.g. "FW-ISO27001").
        #[arg(long)]
        identifier: String,
    },

    /// List rejected versions awaiting rework by the current user.
    Rejected,
}

/// Execute the review subcommand.
pub fn run_review(args: &ReviewArgs, root: &Path, user: UserId) -> Result<u8> {
    match &args.command {
        ReviewCommand::Submit { id, snapshot } => cmd_submit(root, user, id, snapshot.as_deref()),
        ReviewCommand::Decide {
            approval,
            verdict,
            remarks,
            snapshot,
        } => cmd_decide(
            root,
            user,
            approval,
            verdict,
            remarks.clone(),
            snapshot.as_deref(),
        ),
        ReviewCommand::Resubmit { id, snapshot } => {
            cmd_resubmit(root, user, id, snapshot.as_deref())
        }
        ReviewCommand::History { identifier } => cmd_history(root, identifier),
        ReviewCommand::Rejected => cmd_rejected(root, user),
    }
}

/// Submit a draft for review, allocating the next author tag.
fn cmd_submit(root: &Path, user: UserId, id: &str, snapshot: Option<&Path>) -> Result<u8> {
    let store = load_store(root)?;
    let wf = ApprovalWorkflow::permissive(store);

    let entity_id = EntityId::parse(id)?;
    let entity = wf.store().get_entity(entity_id)?;
    let snapshot = snapshot_or_default(&entity, snapshot)?;

    let approval_id = wf
        .submit_for_review(user, entity_id, snapshot)
        .context("failed to submit for review")?;
    save_store(root, wf.store())?;

    let record = wf.store().get_approval(approval_id)?;
    println!(
        "OK: submitted {} {} for review (tag {})",
        entity.kind, entity.identifier, record.tag
    );
    println!("  approval id: {approval_id}");
    match record.reviewer {
        Some(reviewer) => println!("  assigned reviewer: {reviewer}"),
        None => println!("  assigned reviewer: (none)"),
    }
    Ok(0)
}

/// Record a verdict and show where it left the entity.
fn cmd_decide(
    root: &Path,
    user: UserId,
    approval: &str,
    verdict: &str,
    remarks: Option<String>,
    snapshot: Option<&Path>,
) -> Result<u8> {
    let store = load_store(root)?;
    let wf = ApprovalWorkflow::permissive(store);

    let approval_id = ApprovalId::parse(approval)?;
    let verdict = parse_verdict(verdict)?;
    let reviewed = snapshot.map(load_snapshot).transpose()?;

    let verdict_id = wf
        .reviewer_decide(user, approval_id, verdict, remarks, reviewed)
        .context("failed to record verdict")?;
    save_store(root, wf.store())?;

    let record = wf.store().get_approval(verdict_id)?;
    let entity = wf.store().get_entity(record.entity_id)?;
    println!(
        "OK: recorded {} verdict on {} (tag {})",
        record.decision, entity.identifier, record.tag
    );
    println!(
        "  {} is now {} / {}",
        entity.id, entity.status, entity.activation
    );
    Ok(0)
}

/// Resubmit after a rejection, clearing the reviewer's marks.
fn cmd_resubmit(root: &Path, user: UserId, id: &str, snapshot: Option<&Path>) -> Result<u8> {
    let store = load_store(root)?;
    let wf = ApprovalWorkflow::permissive(store);

    let entity_id = EntityId::parse(id)?;
    let entity = wf.store().get_entity(entity_id)?;
    let snapshot = snapshot_or_default(&entity, snapshot)?;

    let approval_id = wf
        .resubmit(user, entity_id, snapshot)
        .context("failed to resubmit")?;
    save_store(root, wf.store())?;

    let record = wf.store().get_approval(approval_id)?;
    println!(
        "OK: resubmitted {} {} (tag {})",
        entity.kind, entity.identifier, record.tag
    );
    Ok(0)
}

/// Print the full approval history of one business identifier.
fn cmd_history(root: &Path, identifier: &str) -> Result<u8> {
    let store = load_store(root)?;
    let wf = ApprovalWorkflow::permissive(store);

    let identifier = EntityIdentifier::new(identifier)?;
    let records = wf.approval_history(&identifier);
    if records.is_empty() {
        println!("No approval records for {identifier}.");
        return Ok(0);
    }

    println!("Approval history for {identifier} ({} records):", records.len());
    for r in &records {
        match r.decided_at {
            Some(at) => println!("  {} {} by {} at {}", r.tag, r.decision, r.submitted_by, at),
            None => println!(
                "  {} {} submitted by {} at {}",
                r.tag, r.decision, r.submitted_by, r.created_at
            ),
        }
        if let Some(remarks) = &r.remarks {
            println!("      remarks: {remarks}");
        }
    }
    Ok(0)
}

/// List rejected versions awaiting rework by the invoking user.
fn cmd_rejected(root: &Path, user: UserId) -> Result<u8> {
    let store = load_store(root)?;
    let wf = ApprovalWorkflow::permissive(store);

    let inbox = wf.rejected_versions(user);
    if inbox.is_empty() {
        println!("No rejected versions for {user}.");
        return Ok(0);
    }

    println!("Rejected versions for {user} ({}):", inbox.len());
    for r in &inbox {
        println!(
            "  {} {:?} tag {} rejected by {}",
            r.identifier, r.name, r.tag, r.rejected_by
        );
        if let Some(remarks) = &r.remarks {
            println!("      remarks: {remarks}");
        }
        println!("      entity id: {}", r.entity_id);
    }
    Ok(0)
}

// ─── Snapshot plumbing ───────────────────────────────────────────────

fn parse_verdict(s: &str) -> Result<Verdict> {
    match s.to_ascii_lowercase().as_str() {
        "approve" | "approved" => Ok(Verdict::Approve),
        "reject" | "rejected" => Ok(Verdict::Reject),
        other => bail!("unknown verdict {other:?}; expected approve or reject"),
    }
}

fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("malformed snapshot file {}", path.display()))
}

fn snapshot_or_default(entity: &EntityRecord, path: Option<&Path>) -> Result<Snapshot> {
    match path {
        Some(p) => load_snapshot(p),
        None => default_snapshot(entity),
    }
}

/// A skeleton snapshot carrying the entity's name and identifier, for
/// submissions that do not supply a document file.
fn default_snapshot(entity: &EntityRecord) -> Result<Snapshot> {
    let snapshot = match entity.kind {
        EntityKind::Framework => Snapshot::Framework(FrameworkSnapshot {
            name: entity.name.clone(),
            identifier: entity.identifier.clone(),
            description: String::new(),
            category: String::new(),
            policies: Vec::new(),
            review: ReviewMark::pending(),
        }),
        EntityKind::Policy => Snapshot::Policy(PolicySnapshot {
            name: entity.name.clone(),
            identifier: entity.identifier.clone(),
            description: String::new(),
            department: String::new(),
            scope: String::new(),
            objective: String::new(),
            subpolicies: Vec::new(),
            review: ReviewMark::pending(),
        }),
        EntityKind::RiskMitigation => Snapshot::RiskMitigation(RiskMitigationSnapshot {
            title: entity.name.clone(),
            steps: BTreeMap::new(),
            review: ReviewMark::pending(),
        }),
        EntityKind::SubPolicy => {
            bail!("subpolicies are reviewed within their owning policy's snapshot; submit the policy instead")
        }
    };
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use grc_core::{ActivationState, LifecycleStatus, Timestamp, VersionLabel};
    use grc_workflow::CreateVersionRequest;

    use super::*;

    fn seed_draft(root: &Path, identifier: &str) -> EntityId {
        let wf = ApprovalWorkflow::permissive(grc_store::MemoryStore::new());
        let outcome = wf
            .create_version(
                UserId(1),
                CreateVersionRequest::root(
                    EntityKind::Framework,
                    EntityIdentifier::new(identifier).unwrap(),
                    "seeded framework",
                ),
            )
            .unwrap();
        save_store(root, wf.store()).unwrap();
        outcome.entity_id
    }

    #[test]
    fn review_submit_then_history() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let entity_id = seed_draft(root, "FW-SUBMIT");

        let code = cmd_submit(root, UserId(1), &entity_id.to_string(), None).unwrap();
        assert_eq!(code, 0);

        let store = load_store(root).unwrap();
        let entity = store.get_entity(entity_id).unwrap();
        assert_eq!(entity.status, LifecycleStatus::UnderReview);

        assert_eq!(cmd_history(root, "FW-SUBMIT").unwrap(), 0);
        assert_eq!(cmd_history(root, "FW-UNKNOWN").unwrap(), 0);
    }

    #[test]
    fn review_approve_activates() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let entity_id = seed_draft(root, "FW-APPROVE");
        cmd_submit(root, UserId(1), &entity_id.to_string(), None).unwrap();

        let store = load_store(root).unwrap();
        let approval_id = store
            .latest_approval(&EntityIdentifier::new("FW-APPROVE").unwrap(), None)
            .unwrap()
            .id;

        let code = cmd_decide(
            root,
            UserId(2),
            &approval_id.to_string(),
            "approve",
            None,
            None,
        )
        .unwrap();
        assert_eq!(code, 0);

        let entity = load_store(root).unwrap().get_entity(entity_id).unwrap();
        assert_eq!(entity.status, LifecycleStatus::Approved);
        assert_eq!(entity.activation, ActivationState::Active);
    }

    #[test]
    fn review_reject_then_resubmit() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let entity_id = seed_draft(root, "FW-REJECT");
        cmd_submit(root, UserId(1), &entity_id.to_string(), None).unwrap();

        let approval_id = load_store(root)
            .unwrap()
            .latest_approval(&EntityIdentifier::new("FW-REJECT").unwrap(), None)
            .unwrap()
            .id;
        cmd_decide(
            root,
            UserId(2),
            &approval_id.to_string(),
            "reject",
            Some("needs a category".to_string()),
            None,
        )
        .unwrap();

        assert_eq!(cmd_rejected(root, UserId(1)).unwrap(), 0);

        let code = cmd_resubmit(root, UserId(1), &entity_id.to_string(), None).unwrap();
        assert_eq!(code, 0);
        let entity = load_store(root).unwrap().get_entity(entity_id).unwrap();
        assert_eq!(entity.status, LifecycleStatus::UnderReview);
        assert_eq!(entity.review_cycles, 1);
    }

    #[test]
    fn review_snapshot_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let entity_id = seed_draft(root, "FW-FILE");

        let snapshot = Snapshot::Framework(FrameworkSnapshot {
            name: "from file".to_string(),
            identifier: EntityIdentifier::new("FW-FILE").unwrap(),
            description: "written by the test".to_string(),
            category: "Information Security".to_string(),
            policies: vec![],
            review: ReviewMark::pending(),
        });
        let path = root.join("snapshot.json");
        std::fs::write(&path, serde_json::to_string_pretty(&snapshot).unwrap()).unwrap();

        cmd_submit(root, UserId(1), &entity_id.to_string(), Some(&path)).unwrap();

        let store = load_store(root).unwrap();
        let record = store
            .latest_approval(&EntityIdentifier::new("FW-FILE").unwrap(), None)
            .unwrap();
        assert_eq!(record.snapshot, snapshot);
    }

    #[test]
    fn review_default_snapshot_refuses_subpolicy() {
        let entity = EntityRecord {
            id: EntityId::new(),
            kind: EntityKind::SubPolicy,
            identifier: EntityIdentifier::new("SUB-01").unwrap(),
            name: "a control".to_string(),
            status: LifecycleStatus::Draft,
            activation: ActivationState::Inactive,
            current_label: VersionLabel::initial(),
            review_cycles: 0,
            reviewer: None,
            owner: None,
            start_date: None,
            end_date: None,
            created_by: UserId(1),
            created_at: Timestamp::now(),
        };
        let err = default_snapshot(&entity).unwrap_err();
        assert!(err.to_string().contains("owning policy"));
    }

    #[test]
    fn review_verdict_parsing() {
        assert_eq!(parse_verdict("approve").unwrap(), Verdict::Approve);
        assert_eq!(parse_verdict("REJECTED").unwrap(), Verdict::Reject);
        assert!(parse_verdict("maybe").is_err());
    }
}
