//! # Permission Gate
//!
//! The authorization seam between the workflow engine and whatever
//! access-control system hosts it. The engine asks one question —
//! may this user perform this action on this kind of entity — and the
//! answer decides whether the operation runs at all. A denial
//! short-circuits with [`GrcError::PermissionDenied`] before any store
//! write.
//!
//! Role storage, permission flags, and session handling all live on the
//! other side of this trait.

use std::collections::HashSet;
use std::fmt;

use grc_core::{EntityKind, GrcError, UserId};

/// The gated workflow actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Read an entity, its chain, or its approval history.
    View,
    /// Create a brand-new entity version.
    CreateVersion,
    /// Submit a draft for review.
    SubmitForReview,
    /// Record a reviewer verdict.
    Decide,
    /// Resubmit after a rejection.
    Resubmit,
    /// Activate a chain member.
    Activate,
    /// Deactivate an entity, possibly cascading.
    Deactivate,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::View => "view",
            Self::CreateVersion => "create-version",
            Self::SubmitForReview => "submit-for-review",
            Self::Decide => "decide",
            Self::Resubmit => "resubmit",
            Self::Activate => "activate",
            Self::Deactivate => "deactivate",
        };
        f.write_str(name)
    }
}

/// Authorization hook consulted before every mutating workflow
/// operation.
///
/// Implementations must be `Send + Sync` so they can be shared across
/// threads behind an `Arc`. The trait is object-safe to support runtime
/// selection (static grant table vs. an external RBAC lookup).
pub trait PermissionGate: Send + Sync {
    /// Whether `user` may perform `action` on entities of `kind`.
    fn has_permission(&self, user: UserId, kind: EntityKind, action: Action) -> bool;
}

/// Run the gate and convert a refusal into the error the workflow
/// surfaces.
pub(crate) fn check(
    gate: &dyn PermissionGate,
    user: UserId,
    kind: EntityKind,
    action: Action,
) -> Result<(), GrcError> {
    if gate.has_permission(user, kind, action) {
        return Ok(());
    }
    tracing::warn!(%user, %kind, %action, "permission denied");
    Err(GrcError::PermissionDenied {
        user: user.to_string(),
        action: format!("{action} {kind}"),
    })
}

/// Gate that grants everything. For tests and the single-operator CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl PermissionGate for AllowAll {
    fn has_permission(&self, _user: UserId, _kind: EntityKind, _action: Action) -> bool {
        true
    }
}

/// Gate backed by an explicit grant table.
///
/// Deny-by-default: a `(user, kind, action)` triple is allowed only if
/// it was granted. Build it up front; the table is immutable once the
/// workflow holds it.
#[derive(Debug, Clone, Default)]
pub struct StaticGate {
    grants: HashSet<(UserId, EntityKind, Action)>,
}

impl StaticGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant one `(user, kind, action)` triple.
    #[must_use]
    pub fn grant(mut self, user: UserId, kind: EntityKind, action: Action) -> Self {
        self.grants.insert((user, kind, action));
        self
    }

    /// Grant every action on `kind` to `user`.
    #[must_use]
    pub fn grant_all(mut self, user: UserId, kind: EntityKind) -> Self {
        for action in [
            Action::View,
            Action::CreateVersion,
            Action::SubmitForReview,
            Action::Decide,
            Action::Resubmit,
            Action::Activate,
            Action::Deactivate,
        ] {
            self.grants.insert((user, kind, action));
        }
        self
    }
}

impl PermissionGate for StaticGate {
    fn has_permission(&self, user: UserId, kind: EntityKind, action: Action) -> bool {
        self.grants.contains(&(user, kind, action))
    }
}
