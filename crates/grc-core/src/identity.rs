//! # Domain Identity Newtypes
//!
//! Newtype wrappers for all identifiers in the GRC Stack. These prevent
//! accidental identifier confusion — you cannot pass a `VersionId` where
//! an `ApprovalId` is expected, and you cannot feed a raw string where a
//! validated `EntityIdentifier` is required.
//!
//! ## Two identifier families
//!
//! Row identities (`EntityId`, `VersionId`, `ApprovalId`) are random UUIDs
//! naming one record. The business identity (`EntityIdentifier`) is the
//! stable code shared by *every* version of one logical entity — tag
//! sequences and approval history key on it, not on any row id.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GrcError;

/// Maximum length of an [`EntityIdentifier`].
pub const MAX_IDENTIFIER_LEN: usize = 45;

/// Unique identifier for one versioned entity row (framework, policy,
/// subpolicy, or risk mitigation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

/// Unique identifier for an immutable version record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VersionId(pub Uuid);

/// Unique identifier for an immutable approval record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ApprovalId(pub Uuid);

/// Identifier for an acting user (author or reviewer).
///
/// An integer rather than a UUID — user accounts live in an external
/// system that keys them numerically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl EntityId {
    /// Generate a new random entity identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Parse from a string, accepting both the bare UUID and the
    /// `entity:` display form.
    pub fn parse(s: &str) -> Result<Self, GrcError> {
        let raw = s.strip_prefix("entity:").unwrap_or(s);
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| GrcError::Validation(format!("invalid entity id: {s}")))
    }
}

impl VersionId {
    /// Generate a new random version identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Parse from a string, accepting both the bare UUID and the
    /// `version:` display form.
    pub fn parse(s: &str) -> Result<Self, GrcError> {
        let raw = s.strip_prefix("version:").unwrap_or(s);
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| GrcError::Validation(format!("invalid version id: {s}")))
    }
}

impl ApprovalId {
    /// Generate a new random approval identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Parse from a string, accepting both the bare UUID and the
    /// `approval:` display form.
    pub fn parse(s: &str) -> Result<Self, GrcError> {
        let raw = s.strip_prefix("approval:").unwrap_or(s);
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| GrcError::Validation(format!("invalid approval id: {s}")))
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for VersionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for ApprovalId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "entity:{}", self.0)
    }
}

impl std::fmt::Display for VersionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "version:{}", self.0)
    }
}

impl std::fmt::Display for ApprovalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "approval:{}", self.0)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "user:{}", self.0)
    }
}

/// The stable business identifier shared by all versions of one logical
/// entity (e.g. `"FW-ISO27001"`, `"POL-ACCESS-01"`).
///
/// Validated on construction: non-empty after trimming and at most
/// [`MAX_IDENTIFIER_LEN`] characters. Serializes as a plain string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityIdentifier(String);

impl EntityIdentifier {
    /// Create a validated entity identifier.
    ///
    /// # Errors
    ///
    /// Returns [`GrcError::Validation`] if the trimmed string is empty or
    /// exceeds [`MAX_IDENTIFIER_LEN`] characters.
    pub fn new(s: impl Into<String>) -> Result<Self, GrcError> {
        let s = s.into();
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(GrcError::Validation(
                "entity identifier must not be empty".to_string(),
            ));
        }
        if trimmed.len() > MAX_IDENTIFIER_LEN {
            return Err(GrcError::Validation(format!(
                "entity identifier must not exceed {MAX_IDENTIFIER_LEN} characters, got {}",
                trimmed.len()
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Return the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EntityIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for EntityIdentifier {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
