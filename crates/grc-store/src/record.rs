//! # Record Types
//!
//! The three row types the engine persists. Version and approval records
//! are immutable once written; the entity row's `status`, `activation`,
//! and `review_cycles` fields are the only mutable state in the whole
//! store, and only the activation coordinator and the workflow touch
//! them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use grc_core::{
    ActivationState, ApprovalId, Decision, EntityId, EntityIdentifier, EntityKind,
    LifecycleStatus, Timestamp, UserId, VersionId, VersionLabel, VersionTag,
};
use grc_snapshot::Snapshot;

/// An immutable structural version record.
///
/// Created once when a new entity version is created, never mutated.
/// `previous` links successive versions into the chain the resolver
/// walks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    /// Row identity.
    pub id: VersionId,
    /// The entity this version belongs to.
    pub entity_id: EntityId,
    /// Structural `major.minor` label.
    pub label: VersionLabel,
    /// Who created the version.
    pub created_by: UserId,
    /// When it was created.
    pub created_at: Timestamp,
    /// The version this one supersedes, if any.
    pub previous: Option<VersionId>,
}

/// An immutable approval record.
///
/// Append-only: corrections append a new record, never update an
/// existing one. Author submissions carry `Decision::Pending`; reviewer
/// records carry the verdict, the remarks, and `decided_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRecord {
    /// Row identity.
    pub id: ApprovalId,
    /// The entity row the record concerns.
    pub entity_id: EntityId,
    /// The business identifier the tag sequence keys on. Shared by every
    /// version of the logical entity, unlike `entity_id`.
    pub identifier: EntityIdentifier,
    /// The dual-track tag allocated for this record.
    pub tag: VersionTag,
    /// The entity's state at submission or decision time.
    pub snapshot: Snapshot,
    /// Who wrote the record (author for submissions, reviewer for
    /// verdicts).
    pub submitted_by: UserId,
    /// The reviewer assigned at submission time.
    pub reviewer: Option<UserId>,
    /// The verdict. `Pending` on author records forever.
    pub decision: Decision,
    /// Reviewer remarks, present on rejections.
    pub remarks: Option<String>,
    /// When the verdict was recorded. `None` on author records.
    pub decided_at: Option<Timestamp>,
    /// When the record was created.
    pub created_at: Timestamp,
}

/// A versioned entity row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Row identity. Each structural version of a logical entity is its
    /// own row.
    pub id: EntityId,
    /// What kind of entity this is.
    pub kind: EntityKind,
    /// The stable business identifier shared across versions.
    pub identifier: EntityIdentifier,
    /// Display name.
    pub name: String,
    /// Approval-workflow status. Mutable.
    pub status: LifecycleStatus,
    /// Chain activation state. Mutable.
    pub activation: ActivationState,
    /// The structural label of this row's version record.
    pub current_label: VersionLabel,
    /// How many submit→reject rounds this row has been through. Mutable.
    pub review_cycles: u32,
    /// The reviewer assigned to this entity.
    pub reviewer: Option<UserId>,
    /// Structural parent (policy → framework, subpolicy → policy).
    pub owner: Option<EntityId>,
    /// When the entity should take effect. A future date at approval
    /// time schedules the activation instead of applying it.
    pub start_date: Option<NaiveDate>,
    /// When the entity lapses.
    pub end_date: Option<NaiveDate>,
    /// Who created the row.
    pub created_by: UserId,
    /// When the row was created.
    pub created_at: Timestamp,
}

impl EntityRecord {
    /// Whether this row is the live member of its chain.
    pub fn is_active(&self) -> bool {
        self.activation.is_active()
    }
}
