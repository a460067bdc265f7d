//! # Tables — Plain-Data Store Aggregate
//!
//! The whole store as one cloneable value: three row maps plus an
//! append-only approval log preserving insertion order. `Tables` has no
//! locking — [`crate::MemoryStore`] wraps it in a lock and clones it per
//! transaction, so every method here runs either on a read-locked
//! reference or on a private staged copy.
//!
//! The one invariant enforced at this layer is tag uniqueness:
//! [`Tables::insert_approval`] rejects a duplicate `(identifier, tag)`
//! pair with `VersionConflict`, so no caller — not even one that skips
//! [`Tables::next_tag`] — can break the strictly-increasing tag sequence.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use grc_core::{
    ApprovalId, EntityId, EntityIdentifier, GrcError, Track, VersionId, VersionTag,
};

use crate::record::{ApprovalRecord, EntityRecord, VersionRecord};

/// All rows in the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tables {
    /// Entity rows by id.
    entities: HashMap<EntityId, EntityRecord>,
    /// Version records by id.
    versions: HashMap<VersionId, VersionRecord>,
    /// Approval records by id.
    approvals: HashMap<ApprovalId, ApprovalRecord>,
    /// Approval ids in insertion order. "Latest" queries walk this
    /// backwards instead of comparing timestamps, which may tie at
    /// seconds precision.
    approval_log: Vec<ApprovalId>,
}

impl Tables {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // ── Entities ─────────────────────────────────────────────────────

    /// Insert an entity row.
    pub fn insert_entity(&mut self, record: EntityRecord) {
        self.entities.insert(record.id, record);
    }

    /// Look up an entity row.
    pub fn entity(&self, id: EntityId) -> Result<&EntityRecord, GrcError> {
        self.entities
            .get(&id)
            .ok_or_else(|| GrcError::not_found("entity", id))
    }

    /// Look up an entity row for mutation.
    pub fn entity_mut(&mut self, id: EntityId) -> Result<&mut EntityRecord, GrcError> {
        self.entities
            .get_mut(&id)
            .ok_or_else(|| GrcError::not_found("entity", id))
    }

    /// Whether an entity row exists.
    pub fn contains_entity(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// All entity rows, unordered.
    pub fn entities(&self) -> impl Iterator<Item = &EntityRecord> {
        self.entities.values()
    }

    /// All rows sharing a business identifier (the structural versions
    /// of one logical entity).
    pub fn entities_by_identifier(&self, identifier: &EntityIdentifier) -> Vec<&EntityRecord> {
        self.entities
            .values()
            .filter(|e| e.identifier == *identifier)
            .collect()
    }

    /// The entity rows structurally owned by `parent`.
    pub fn children_of(&self, parent: EntityId) -> Vec<&EntityRecord> {
        self.entities
            .values()
            .filter(|e| e.owner == Some(parent))
            .collect()
    }

    // ── Versions ─────────────────────────────────────────────────────

    /// Insert a version record.
    pub fn insert_version(&mut self, record: VersionRecord) {
        self.versions.insert(record.id, record);
    }

    /// Look up a version record.
    pub fn version(&self, id: VersionId) -> Result<&VersionRecord, GrcError> {
        self.versions
            .get(&id)
            .ok_or_else(|| GrcError::not_found("version", id))
    }

    /// Whether a version record exists.
    pub fn contains_version(&self, id: VersionId) -> bool {
        self.versions.contains_key(&id)
    }

    /// All version records, unordered.
    pub fn versions(&self) -> impl Iterator<Item = &VersionRecord> {
        self.versions.values()
    }

    /// The version records belonging to one entity row.
    pub fn versions_of(&self, entity_id: EntityId) -> Vec<&VersionRecord> {
        self.versions
            .values()
            .filter(|v| v.entity_id == entity_id)
            .collect()
    }

    /// The version records whose `previous` pointer references `id`.
    pub fn versions_referencing(&self, id: VersionId) -> Vec<&VersionRecord> {
        self.versions
            .values()
            .filter(|v| v.previous == Some(id))
            .collect()
    }

    // ── Approvals ────────────────────────────────────────────────────

    /// Insert an approval record, enforcing tag uniqueness.
    ///
    /// # Errors
    ///
    /// Returns [`GrcError::VersionConflict`] if a record with the same
    /// `(identifier, tag)` already exists. This is the storage-layer
    /// backstop for the strictly-increasing tag invariant.
    pub fn insert_approval(&mut self, record: ApprovalRecord) -> Result<(), GrcError> {
        let duplicate = self
            .approvals
            .values()
            .any(|a| a.identifier == record.identifier && a.tag == record.tag);
        if duplicate {
            return Err(GrcError::VersionConflict {
                identifier: record.identifier.to_string(),
                tag: record.tag.to_string(),
            });
        }
        self.approval_log.push(record.id);
        self.approvals.insert(record.id, record);
        Ok(())
    }

    /// Look up an approval record.
    pub fn approval(&self, id: ApprovalId) -> Result<&ApprovalRecord, GrcError> {
        self.approvals
            .get(&id)
            .ok_or_else(|| GrcError::not_found("approval", id))
    }

    /// All approval records for an identifier, in insertion order.
    pub fn approvals_for(&self, identifier: &EntityIdentifier) -> Vec<&ApprovalRecord> {
        self.approval_log
            .iter()
            .filter_map(|id| self.approvals.get(id))
            .filter(|a| a.identifier == *identifier)
            .collect()
    }

    /// The most recent approval record for an identifier, optionally
    /// restricted to one track.
    pub fn latest_approval(
        &self,
        identifier: &EntityIdentifier,
        track: Option<Track>,
    ) -> Option<&ApprovalRecord> {
        self.approval_log
            .iter()
            .rev()
            .filter_map(|id| self.approvals.get(id))
            .find(|a| {
                a.identifier == *identifier && track.map_or(true, |t| a.tag.track() == t)
            })
    }

    /// The next tag in a track's sequence for an identifier.
    ///
    /// Max existing tag number in the track plus one; the track's first
    /// tag when the sequence is empty.
    pub fn next_tag(&self, identifier: &EntityIdentifier, track: Track) -> VersionTag {
        let max = self
            .approvals
            .values()
            .filter(|a| a.identifier == *identifier && a.tag.track() == track)
            .map(|a| a.tag.number())
            .max();
        match max {
            Some(n) => match track {
                Track::Author => VersionTag::Author(n + 1),
                Track::Reviewer => VersionTag::Reviewer(n + 1),
            },
            None => VersionTag::first(track),
        }
    }

    /// Total number of approval records.
    pub fn approval_count(&self) -> usize {
        self.approval_log.len()
    }
}
