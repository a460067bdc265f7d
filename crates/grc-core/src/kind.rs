//! # Entity Kinds
//!
//! The four versioned entity kinds the engine manages, plus the structural
//! ownership arrows between them. Ownership (framework owns policies,
//! policy owns subpolicies) drives the deactivation cascade and is
//! independent of version-chain membership.

use serde::{Deserialize, Serialize};

use crate::error::GrcError;

/// The kind of a versioned entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// A compliance framework (e.g. ISO 27001). Owns policies.
    Framework,
    /// A policy within a framework. Owns subpolicies.
    Policy,
    /// A subpolicy (control) within a policy.
    SubPolicy,
    /// A risk mitigation plan reviewed through the same workflow.
    RiskMitigation,
}

/// All entity kinds, in ownership order (parents before children).
pub const ENTITY_KINDS: [EntityKind; 4] = [
    EntityKind::Framework,
    EntityKind::Policy,
    EntityKind::SubPolicy,
    EntityKind::RiskMitigation,
];

impl EntityKind {
    /// The kind that structurally owns this one, if any.
    ///
    /// A deactivation cascade flows along these arrows, never along the
    /// version chain.
    pub fn owner_kind(&self) -> Option<EntityKind> {
        match self {
            Self::Framework => None,
            Self::Policy => Some(Self::Framework),
            Self::SubPolicy => Some(Self::Policy),
            Self::RiskMitigation => None,
        }
    }

    /// Whether entities of this kind may own children.
    pub fn has_children(&self) -> bool {
        matches!(self, Self::Framework | Self::Policy)
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Framework => "framework",
            Self::Policy => "policy",
            Self::SubPolicy => "subpolicy",
            Self::RiskMitigation => "risk-mitigation",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for EntityKind {
    type Err = GrcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "framework" => Ok(Self::Framework),
            "policy" => Ok(Self::Policy),
            "subpolicy" => Ok(Self::SubPolicy),
            "risk-mitigation" => Ok(Self::RiskMitigation),
            _ => Err(GrcError::Validation(format!("unknown entity kind: {s}"))),
        }
    }
}
