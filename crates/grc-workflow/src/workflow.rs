//! # Approval Workflow Engine
//!
//! The state machine that moves a versioned entity from `Draft` through
//! `UnderReview` to `Approved` or `RevisionRequired`, recording every
//! step as an append-only approval record with an alternating tag:
//! author submissions take the `A` track, reviewer verdicts the `R`
//! track, each strictly increasing per entity identifier.
//!
//! Every operation runs inside one store transaction: the tag is
//! allocated, the record inserted, and the entity status flipped
//! together, or not at all. An approving verdict additionally runs the
//! activation coordinator, so "approved" and "live" land in the same
//! commit.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;

use grc_chain::{
    activate_in, deactivate_in, due_schedules, ActivationOutcome, ChainGraph, DeactivationOutcome,
};
use grc_core::{
    ActivationState, ApprovalId, Decision, EntityId, EntityIdentifier, EntityKind, GrcError,
    LifecycleStatus, Timestamp, Track, UserId, VersionId, VersionLabel, VersionTag,
};
use grc_snapshot::Snapshot;
use grc_store::{ApprovalRecord, EntityRecord, MemoryStore, Tables, VersionRecord};

use crate::config::WorkflowConfig;
use crate::gate::{check, Action, AllowAll, PermissionGate};

// ─── Requests and outcomes ───────────────────────────────────────────

/// How a successor version bumps the structural label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelBump {
    /// `2.3 → 3.0`. The default for a new version.
    #[default]
    Major,
    /// `2.3 → 2.4`. For editorial revisions.
    Minor,
}

/// Input to [`ApprovalWorkflow::create_version`].
#[derive(Debug, Clone)]
pub enum CreateVersionRequest {
    /// A brand-new logical entity with its first version record.
    Root {
        kind: EntityKind,
        identifier: EntityIdentifier,
        name: String,
        reviewer: Option<UserId>,
        owner: Option<EntityId>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    },
    /// A successor chained to an existing version record. Kind,
    /// identifier, and structural owner are inherited from the
    /// superseded version's entity.
    Successor {
        previous: VersionId,
        name: String,
        bump: LabelBump,
        /// Overrides the inherited reviewer when set.
        reviewer: Option<UserId>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    },
}

impl CreateVersionRequest {
    /// A root request with no reviewer, owner, or dates.
    pub fn root(kind: EntityKind, identifier: EntityIdentifier, name: impl Into<String>) -> Self {
        Self::Root {
            kind,
            identifier,
            name: name.into(),
            reviewer: None,
            owner: None,
            start_date: None,
            end_date: None,
        }
    }

    /// A successor request with the default major bump.
    pub fn successor(previous: VersionId, name: impl Into<String>) -> Self {
        Self::Successor {
            previous,
            name: name.into(),
            bump: LabelBump::Major,
            reviewer: None,
            start_date: None,
            end_date: None,
        }
    }
}

/// What [`ApprovalWorkflow::create_version`] produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionOutcome {
    /// The new entity row.
    pub entity_id: EntityId,
    /// Its version record.
    pub version_id: VersionId,
    /// The structural label assigned.
    pub label: VersionLabel,
}

/// A reviewer's verdict on a pending submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Approve,
    Reject,
}

impl Verdict {
    /// The decision recorded on the reviewer's approval record.
    fn decision(self) -> Decision {
        match self {
            Self::Approve => Decision::Approved,
            Self::Reject => Decision::Rejected,
        }
    }

    /// The entity status the verdict lands the entity in.
    fn status(self) -> LifecycleStatus {
        match self {
            Self::Approve => LifecycleStatus::Approved,
            Self::Reject => LifecycleStatus::RevisionRequired,
        }
    }
}

/// One entry in a submitter's rejected-versions inbox: the latest
/// rejected submission of an entity, with the reviewer's remarks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedVersion {
    pub entity_id: EntityId,
    pub identifier: EntityIdentifier,
    /// Entity display name.
    pub name: String,
    /// The author tag of the rejected submission.
    pub tag: VersionTag,
    /// Who rejected it.
    pub rejected_by: UserId,
    /// The reviewer's remarks, if any.
    pub remarks: Option<String>,
    /// When the verdict was recorded.
    pub decided_at: Option<Timestamp>,
}

// ─── ApprovalWorkflow ────────────────────────────────────────────────

/// The approval workflow engine.
///
/// Holds the store, the permission gate, and the workflow tunables.
/// Cheap to clone-share via the store's interior `Arc`; hosts construct
/// one per process and hand out references.
#[derive(Clone)]
pub struct ApprovalWorkflow {
    store: MemoryStore,
    gate: Arc<dyn PermissionGate>,
    config: WorkflowConfig,
}

impl ApprovalWorkflow {
    pub fn new(store: MemoryStore, gate: Arc<dyn PermissionGate>, config: WorkflowConfig) -> Self {
        Self {
            store,
            gate,
            config,
        }
    }

    /// A workflow that grants every action, with default tunables. For
    /// tests and the single-operator CLI.
    pub fn permissive(store: MemoryStore) -> Self {
        Self::new(store, Arc::new(AllowAll), WorkflowConfig::default())
    }

    /// The underlying store, for export and direct reads.
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Create a new entity version.
    ///
    /// A [`CreateVersionRequest::Root`] starts a fresh chain: the
    /// identifier must be unused, the optional owner must exist and be
    /// of the owning kind, and the version is labeled `1.0`. A
    /// [`CreateVersionRequest::Successor`] links a new entity to an
    /// existing version record and bumps its label. Either way the new
    /// entity starts `Draft` and `Inactive`.
    pub fn create_version(
        &self,
        user: UserId,
        request: CreateVersionRequest,
    ) -> Result<VersionOutcome, GrcError> {
        self.store.transaction(|tables| match request {
            CreateVersionRequest::Root {
                kind,
                identifier,
                name,
                reviewer,
                owner,
                start_date,
                end_date,
            } => {
                check(self.gate.as_ref(), user, kind, Action::CreateVersion)?;
                if !tables.entities_by_identifier(&identifier).is_empty() {
                    return Err(GrcError::Validation(format!(
                        "identifier {identifier} is already in use"
                    )));
                }
                if let Some(owner_id) = owner {
                    let parent = tables.entity(owner_id)?;
                    match kind.owner_kind() {
                        Some(expected) if parent.kind == expected => {}
                        Some(expected) => {
                            return Err(GrcError::Validation(format!(
                                "owner of a {kind} must be a {expected}, not a {}",
                                parent.kind
                            )));
                        }
                        None => {
                            return Err(GrcError::Validation(format!(
                                "a {kind} has no structural owner"
                            )));
                        }
                    }
                }
                let now = Timestamp::now();
                let entity = EntityRecord {
                    id: EntityId::new(),
                    kind,
                    identifier,
                    name,
                    status: LifecycleStatus::Draft,
                    activation: ActivationState::Inactive,
                    current_label: VersionLabel::initial(),
                    review_cycles: 0,
                    reviewer,
                    owner,
                    start_date,
                    end_date,
                    created_by: user,
                    created_at: now,
                };
                let version = VersionRecord {
                    id: VersionId::new(),
                    entity_id: entity.id,
                    label: entity.current_label,
                    created_by: user,
                    created_at: now,
                    previous: None,
                };
                let outcome = VersionOutcome {
                    entity_id: entity.id,
                    version_id: version.id,
                    label: version.label,
                };
                tables.insert_entity(entity);
                tables.insert_version(version);
                tracing::info!(entity = %outcome.entity_id, label = %outcome.label, "root version created");
                Ok(outcome)
            }
            CreateVersionRequest::Successor {
                previous,
                name,
                bump,
                reviewer,
                start_date,
                end_date,
            } => {
                let prev = tables.version(previous)?.clone();
                let prev_entity = tables.entity(prev.entity_id)?.clone();
                check(
                    self.gate.as_ref(),
                    user,
                    prev_entity.kind,
                    Action::CreateVersion,
                )?;
                let label = match bump {
                    LabelBump::Major => prev.label.next_major(),
                    LabelBump::Minor => prev.label.next_minor(),
                };
                let now = Timestamp::now();
                let entity = EntityRecord {
                    id: EntityId::new(),
                    kind: prev_entity.kind,
                    identifier: prev_entity.identifier.clone(),
                    name,
                    status: LifecycleStatus::Draft,
                    activation: ActivationState::Inactive,
                    current_label: label,
                    review_cycles: 0,
                    reviewer: reviewer.or(prev_entity.reviewer),
                    owner: prev_entity.owner,
                    start_date,
                    end_date,
                    created_by: user,
                    created_at: now,
                };
                let version = VersionRecord {
                    id: VersionId::new(),
                    entity_id: entity.id,
                    label,
                    created_by: user,
                    created_at: now,
                    previous: Some(prev.id),
                };
                let outcome = VersionOutcome {
                    entity_id: entity.id,
                    version_id: version.id,
                    label,
                };
                tables.insert_entity(entity);
                tables.insert_version(version);
                tracing::info!(
                    entity = %outcome.entity_id,
                    previous = %prev.id,
                    label = %label,
                    "successor version created"
                );
                Ok(outcome)
            }
        })
    }

    /// Submit an entity for review.
    ///
    /// Legal from `Draft` or `RevisionRequired`. Allocates the next
    /// author tag, writes a `Pending` approval record carrying the
    /// snapshot and the entity's assigned reviewer, and sets the status
    /// to `UnderReview` — all in one transaction.
    pub fn submit_for_review(
        &self,
        user: UserId,
        entity_id: EntityId,
        snapshot: Snapshot,
    ) -> Result<ApprovalId, GrcError> {
        self.with_retries(|| {
            self.store.transaction(|tables| {
                let entity = tables.entity(entity_id)?.clone();
                check(self.gate.as_ref(), user, entity.kind, Action::SubmitForReview)?;
                if !entity.status.can_transition(LifecycleStatus::UnderReview) {
                    return Err(GrcError::InvalidTransition {
                        from: entity.status.to_string(),
                        to: LifecycleStatus::UnderReview.to_string(),
                        reason: if entity.status == LifecycleStatus::UnderReview {
                            "a submission is already awaiting review".to_string()
                        } else {
                            "approved entities are revised via a new version".to_string()
                        },
                    });
                }
                append_submission(tables, user, &entity, snapshot.clone())
            })
        })
    }

    /// Record a reviewer verdict on a pending submission.
    ///
    /// Legal only while the referenced submission is the latest approval
    /// record for its identifier, still `Pending`, and the entity is
    /// `UnderReview`. Appends a new record on the reviewer track — the
    /// pending record is never mutated. `Approve` activates the entity
    /// (or schedules it, for a future start date) and sets the status to
    /// `Approved`; `Reject` sets `RevisionRequired` and counts a review
    /// cycle.
    ///
    /// `reviewed_snapshot` carries the reviewer's per-node marks; when
    /// `None` the submitted snapshot is recorded unchanged.
    pub fn reviewer_decide(
        &self,
        reviewer: UserId,
        approval_id: ApprovalId,
        verdict: Verdict,
        remarks: Option<String>,
        reviewed_snapshot: Option<Snapshot>,
    ) -> Result<ApprovalId, GrcError> {
        self.with_retries(|| {
            self.store.transaction(|tables| {
                let submission = tables.approval(approval_id)?.clone();
                let entity = tables.entity(submission.entity_id)?.clone();
                check(self.gate.as_ref(), reviewer, entity.kind, Action::Decide)?;

                if submission.decision.is_decided() {
                    return Err(GrcError::InvalidTransition {
                        from: entity.status.to_string(),
                        to: verdict.status().to_string(),
                        reason: format!("approval {approval_id} already carries a verdict"),
                    });
                }
                let is_latest = tables
                    .latest_approval(&submission.identifier, None)
                    .map(|latest| latest.id == approval_id)
                    .unwrap_or(false);
                if !is_latest {
                    return Err(GrcError::InvalidTransition {
                        from: entity.status.to_string(),
                        to: verdict.status().to_string(),
                        reason: format!("approval {approval_id} was superseded by a later record"),
                    });
                }
                if entity.status != LifecycleStatus::UnderReview {
                    return Err(GrcError::InvalidTransition {
                        from: entity.status.to_string(),
                        to: verdict.status().to_string(),
                        reason: "entity is not under review".to_string(),
                    });
                }

                let now = Timestamp::now();
                let tag = tables.next_tag(&submission.identifier, Track::Reviewer);
                let record = ApprovalRecord {
                    id: ApprovalId::new(),
                    entity_id: submission.entity_id,
                    identifier: submission.identifier.clone(),
                    tag,
                    snapshot: reviewed_snapshot
                        .clone()
                        .unwrap_or_else(|| submission.snapshot.clone()),
                    submitted_by: reviewer,
                    reviewer: Some(reviewer),
                    decision: verdict.decision(),
                    remarks: remarks.clone(),
                    decided_at: Some(now),
                    created_at: now,
                };
                let record_id = record.id;
                tables.insert_approval(record)?;

                match verdict {
                    Verdict::Approve => {
                        tables.entity_mut(entity.id)?.status = LifecycleStatus::Approved;
                        let outcome = activate_in(tables, entity.id, now.date())?;
                        tracing::info!(
                            entity = %entity.id,
                            %tag,
                            scheduled = outcome.scheduled,
                            "submission approved"
                        );
                    }
                    Verdict::Reject => {
                        let row = tables.entity_mut(entity.id)?;
                        row.status = LifecycleStatus::RevisionRequired;
                        row.review_cycles += 1;
                        tracing::info!(entity = %entity.id, %tag, "submission rejected");
                    }
                }
                Ok(record_id)
            })
        })
    }

    /// Resubmit a rejected entity.
    ///
    /// Legal from `RevisionRequired` only. Clears every review mark in
    /// the snapshot before recording it, so stale reviewer verdicts
    /// never leak into the fresh round.
    pub fn resubmit(
        &self,
        user: UserId,
        entity_id: EntityId,
        snapshot: Snapshot,
    ) -> Result<ApprovalId, GrcError> {
        self.with_retries(|| {
            self.store.transaction(|tables| {
                let entity = tables.entity(entity_id)?.clone();
                check(self.gate.as_ref(), user, entity.kind, Action::Resubmit)?;
                if entity.status != LifecycleStatus::RevisionRequired {
                    return Err(GrcError::InvalidTransition {
                        from: entity.status.to_string(),
                        to: LifecycleStatus::UnderReview.to_string(),
                        reason: "resubmission requires a prior rejection".to_string(),
                    });
                }
                let mut snapshot = snapshot.clone();
                snapshot.reset_review_fields();
                append_submission(tables, user, &entity, snapshot)
            })
        })
    }

    /// Activate an entity, deactivating the rest of its version chain.
    pub fn activate(
        &self,
        user: UserId,
        entity_id: EntityId,
    ) -> Result<ActivationOutcome, GrcError> {
        self.store.transaction(|tables| {
            let kind = tables.entity(entity_id)?.kind;
            check(self.gate.as_ref(), user, kind, Action::Activate)?;
            activate_in(tables, entity_id, Timestamp::now().date())
        })
    }

    /// Deactivate an entity, optionally cascading to its owned children.
    pub fn deactivate(
        &self,
        user: UserId,
        entity_id: EntityId,
        cascade_children: bool,
    ) -> Result<DeactivationOutcome, GrcError> {
        self.store.transaction(|tables| {
            let kind = tables.entity(entity_id)?.kind;
            check(self.gate.as_ref(), user, kind, Action::Deactivate)?;
            deactivate_in(tables, entity_id, cascade_children)
        })
    }

    /// Promote every scheduled entity whose start date has arrived.
    ///
    /// The acting user must hold `Activate` on each due entity's kind;
    /// one denial aborts the whole batch.
    pub fn apply_due_schedules(
        &self,
        user: UserId,
        today: NaiveDate,
    ) -> Result<Vec<EntityId>, GrcError> {
        self.store.transaction(|tables| {
            for entity_id in due_schedules(tables, today) {
                let kind = tables.entity(entity_id)?.kind;
                check(self.gate.as_ref(), user, kind, Action::Activate)?;
            }
            grc_chain::apply_due_schedules(tables, today)
        })
    }

    /// Read one entity row, gate-checked.
    pub fn view_entity(&self, user: UserId, entity_id: EntityId) -> Result<EntityRecord, GrcError> {
        self.store.read(|tables| {
            let entity = tables.entity(entity_id)?.clone();
            check(self.gate.as_ref(), user, entity.kind, Action::View)?;
            Ok(entity)
        })
    }

    /// Every entity in the target's version chain, itself included.
    ///
    /// Strict: a dangling previous-version link yields
    /// [`GrcError::DataIntegrity`] rather than a partial chain.
    pub fn get_chain(&self, entity_id: EntityId) -> Result<BTreeSet<EntityId>, GrcError> {
        self.store.read(|tables| {
            tables.entity(entity_id)?;
            let graph = ChainGraph::build(tables);
            let mut members = graph.resolve_entity(entity_id).into_entities()?;
            members.insert(entity_id);
            Ok(members)
        })
    }

    /// The full approval history for an identifier, in insertion order.
    pub fn approval_history(&self, identifier: &EntityIdentifier) -> Vec<ApprovalRecord> {
        self.store.read(|tables| {
            tables
                .approvals_for(identifier)
                .into_iter()
                .cloned()
                .collect()
        })
    }

    /// The submitter's rejected-versions inbox: for every entity still
    /// in `RevisionRequired` whose latest submission came from `user`,
    /// the rejected tag and the reviewer's remarks. Newest verdict
    /// first.
    pub fn rejected_versions(&self, user: UserId) -> Vec<RejectedVersion> {
        self.store.read(|tables| {
            let mut inbox = Vec::new();
            for entity in tables.entities() {
                if entity.status != LifecycleStatus::RevisionRequired {
                    continue;
                }
                let Some(latest) = tables.latest_approval(&entity.identifier, None) else {
                    continue;
                };
                if latest.decision != Decision::Rejected {
                    continue;
                }
                let Some(author) = tables.latest_approval(&entity.identifier, Some(Track::Author))
                else {
                    continue;
                };
                if author.entity_id != entity.id || author.submitted_by != user {
                    continue;
                }
                inbox.push(RejectedVersion {
                    entity_id: entity.id,
                    identifier: entity.identifier.clone(),
                    name: entity.name.clone(),
                    tag: author.tag,
                    rejected_by: latest.submitted_by,
                    remarks: latest.remarks.clone(),
                    decided_at: latest.decided_at,
                });
            }
            inbox.sort_by(|a, b| {
                b.decided_at
                    .cmp(&a.decided_at)
                    .then_with(|| a.identifier.cmp(&b.identifier))
            });
            inbox
        })
    }

    /// Re-run `op` on retryable errors, up to the configured budget.
    fn with_retries<R>(&self, mut op: impl FnMut() -> Result<R, GrcError>) -> Result<R, GrcError> {
        let mut attempts = 0;
        loop {
            match op() {
                Err(err) if err.is_retryable() && attempts < self.config.max_conflict_retries => {
                    attempts += 1;
                    tracing::debug!(attempts, error = %err, "retrying after version conflict");
                }
                other => return other,
            }
        }
    }
}

/// Allocate the next author tag, append the `Pending` record, and flip
/// the entity to `UnderReview`.
fn append_submission(
    tables: &mut Tables,
    user: UserId,
    entity: &EntityRecord,
    snapshot: Snapshot,
) -> Result<ApprovalId, GrcError> {
    if snapshot.kind() != entity.kind {
        return Err(GrcError::Validation(format!(
            "snapshot kind {} does not match entity kind {}",
            snapshot.kind(),
            entity.kind
        )));
    }
    let tag = tables.next_tag(&entity.identifier, Track::Author);
    let record = ApprovalRecord {
        id: ApprovalId::new(),
        entity_id: entity.id,
        identifier: entity.identifier.clone(),
        tag,
        snapshot,
        submitted_by: user,
        reviewer: entity.reviewer,
        decision: Decision::Pending,
        remarks: None,
        decided_at: None,
        created_at: Timestamp::now(),
    };
    let record_id = record.id;
    tables.insert_approval(record)?;
    tables.entity_mut(entity.id)?.status = LifecycleStatus::UnderReview;
    tracing::info!(entity = %entity.id, %tag, "submitted for review");
    Ok(record_id)
}

// ─── Tests ───────────────────────────────────────────────────────────
