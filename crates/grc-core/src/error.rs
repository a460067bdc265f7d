//! # Error Types — Workspace-Wide Taxonomy
//!
//! Defines [`GrcError`], the single error enum shared by every crate in
//! the workspace. All errors use `thiserror` for derive-based `Display`
//! and `Error` implementations.
//!
//! ## Design
//!
//! - Every variant aborts the enclosing store transaction; no partial
//!   writes are ever visible.
//! - [`GrcError::VersionConflict`] is the only retryable kind: it signals
//!   a benign tag-allocation race, not a logic error. Callers retry it a
//!   bounded number of times and surface everything else verbatim.
//! - Transition errors carry the current and attempted states plus the
//!   rejection reason, so the caller never has to re-query to explain a
//!   failure.

use thiserror::Error;

/// Top-level error type for the GRC Stack.
#[derive(Error, Debug)]
pub enum GrcError {
    /// An entity, version, or approval id was not found.
    #[error("{what} not found: {id}")]
    NotFound {
        /// What kind of record was looked up.
        what: &'static str,
        /// The id that missed, in display form.
        id: String,
    },

    /// The requested action is illegal for the entity's current status.
    #[error("invalid transition {from} -> {to}: {reason}")]
    InvalidTransition {
        /// Current status name.
        from: String,
        /// Attempted target status name.
        to: String,
        /// Why the transition was rejected.
        reason: String,
    },

    /// Two concurrent submissions computed the same next version tag.
    /// Retryable: the race is benign and the caller's next attempt will
    /// allocate a fresh tag.
    #[error("version tag conflict for {identifier}: tag {tag} already allocated")]
    VersionConflict {
        /// The entity identifier whose tag sequence collided.
        identifier: String,
        /// The colliding tag, in display form.
        tag: String,
    },

    /// The previous-version chain is broken (dangling pointer) or cyclic.
    #[error("version chain integrity violation: {0}")]
    DataIntegrity(String),

    /// The permission gate refused the acting user.
    #[error("permission denied: {user} may not {action}")]
    PermissionDenied {
        /// The refused user, in display form.
        user: String,
        /// The attempted action, in display form.
        action: String,
    },

    /// A child update inside a cascading deactivation failed.
    #[error("cascade failure: child {child} of {parent} could not be updated")]
    CascadeFailure {
        /// The parent entity, in display form.
        parent: String,
        /// The child that failed, in display form.
        child: String,
    },

    /// Malformed input: bad identifier, tag string, label, or timestamp.
    #[error("validation error: {0}")]
    Validation(String),
}

impl GrcError {
    /// Whether a caller should retry the failed operation.
    ///
    /// Only [`GrcError::VersionConflict`] qualifies; every other kind
    /// reports a state the retry would reproduce.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }

    /// Convenience constructor for [`GrcError::NotFound`].
    pub fn not_found(what: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            what,
            id: id.to_string(),
        }
    }
}
