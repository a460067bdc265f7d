//! # The Snapshot Union
//!
//! One tagged union over the per-kind snapshot payloads. Approval records
//! store a `Snapshot`; the engine never needs to know which kind it holds
//! except to route the reset-on-resubmit pass and to sanity-check that a
//! submission matches its entity's kind.

use serde::{Deserialize, Serialize};

use grc_core::EntityKind;

use crate::framework::{FrameworkSnapshot, PolicySnapshot};
use crate::mitigation::RiskMitigationSnapshot;

/// The typed payload captured in an approval record.
///
/// Serialized with an internal `"kind"` tag so exported state files stay
/// self-describing. Subpolicies have no standalone variant — they travel
/// inside their owning policy's snapshot and are reviewed there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Snapshot {
    /// A framework document: the framework, its policies, their
    /// subpolicies.
    Framework(FrameworkSnapshot),
    /// A standalone policy document with its subpolicies.
    Policy(PolicySnapshot),
    /// A risk mitigation plan with numbered steps.
    RiskMitigation(RiskMitigationSnapshot),
}

impl Snapshot {
    /// The entity kind this snapshot belongs to.
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Framework(_) => EntityKind::Framework,
            Self::Policy(_) => EntityKind::Policy,
            Self::RiskMitigation(_) => EntityKind::RiskMitigation,
        }
    }

    /// Clear every review mark in the payload, recursively.
    ///
    /// Resubmission calls this so the reviewer starts the next round from
    /// a clean document.
    pub fn reset_review_fields(&mut self) {
        match self {
            Self::Framework(fw) => fw.reset_review_fields(),
            Self::Policy(p) => p.reset_review_fields(),
            Self::RiskMitigation(m) => m.reset_review_fields(),
        }
    }

    /// Whether any node in the payload carries a rejecting mark.
    pub fn has_rejected_node(&self) -> bool {
        match self {
            Self::Framework(fw) => fw.has_rejected_node(),
            Self::Policy(p) => p.has_rejected_node(),
            Self::RiskMitigation(m) => m.has_rejected_node(),
        }
    }
}
