//! # Lifecycle Status, Decisions, and Activation
//!
//! The three mutable facets of a versioned entity, kept as separate enums
//! because they change for different reasons:
//!
//! - [`LifecycleStatus`] — where the entity stands in the approval state
//!   machine. Changed only by the workflow.
//! - [`Decision`] — the verdict recorded on an approval record.
//! - [`ActivationState`] — whether this entity is the live member of its
//!   version chain. Changed only by the activation coordinator.
//!
//! ## States
//!
//! ```text
//! Draft ──▶ UnderReview ──▶ Approved (terminal)
//!               │
//!               └──▶ RevisionRequired ──▶ UnderReview (resubmit)
//! ```
//!
//! `Approved` is terminal for the approval track: revision after approval
//! happens by creating a new entity version, not by leaving the state.

use serde::{Deserialize, Serialize};

// ─── LifecycleStatus ─────────────────────────────────────────────────

/// The approval-workflow status of a versioned entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleStatus {
    /// Newly created, not yet submitted.
    Draft,
    /// Submitted and awaiting a reviewer verdict.
    UnderReview,
    /// The reviewer approved the latest submission (terminal).
    Approved,
    /// The reviewer rejected the latest submission; the author must
    /// revise and resubmit.
    RevisionRequired,
}

impl LifecycleStatus {
    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved)
    }

    /// The statuses reachable from this one in a single transition.
    pub fn valid_transitions(&self) -> &'static [LifecycleStatus] {
        match self {
            Self::Draft => &[Self::UnderReview],
            Self::UnderReview => &[Self::Approved, Self::RevisionRequired],
            Self::Approved => &[],
            Self::RevisionRequired => &[Self::UnderReview],
        }
    }

    /// Whether a single transition to `to` is legal.
    pub fn can_transition(&self, to: LifecycleStatus) -> bool {
        self.valid_transitions().contains(&to)
    }
}

impl std::fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Draft => "DRAFT",
            Self::UnderReview => "UNDER_REVIEW",
            Self::Approved => "APPROVED",
            Self::RevisionRequired => "REVISION_REQUIRED",
        };
        f.write_str(s)
    }
}

// ─── Decision ────────────────────────────────────────────────────────

/// The verdict carried by an approval record.
///
/// Author submissions are written `Pending`; reviewer records carry the
/// actual verdict. A record's decision never changes after insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    /// Awaiting the reviewer.
    Pending,
    /// The reviewer accepted the submission.
    Approved,
    /// The reviewer sent the submission back for revision.
    Rejected,
}

impl Decision {
    /// Whether a verdict has been recorded.
    pub fn is_decided(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        };
        f.write_str(s)
    }
}

// ─── ActivationState ─────────────────────────────────────────────────

/// Whether an entity is the live member of its version chain.
///
/// At most one member of a chain is `Active` at any time. `Scheduled`
/// marks an approved version whose start date lies in the future; it
/// flips to `Active` when the date arrives, deactivating the rest of the
/// chain at that point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivationState {
    /// The live member of the chain.
    Active,
    /// Not live. Also the "deleted" state — entities are never removed.
    Inactive,
    /// Approved with a future start date; activates when it arrives.
    Scheduled,
}

impl ActivationState {
    /// Whether the entity is currently live.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl std::fmt::Display for ActivationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
            Self::Scheduled => "SCHEDULED",
        };
        f.write_str(s)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
