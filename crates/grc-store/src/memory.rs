//! # MemoryStore — Transactional In-Memory Store
//!
//! Thread-safe store wrapping [`Tables`] in a `parking_lot::RwLock`.
//!
//! ## Transaction discipline
//!
//! [`MemoryStore::transaction`] clones the tables, runs the closure on
//! the clone, and swaps the clone in only on `Ok`. A failed closure
//! leaves the store byte-for-byte untouched, so every error aborts
//! cleanly with no partial writes — a cascading deactivation that fails
//! halfway rolls back in full. The write lock spans the whole
//! clone-run-swap sequence, so transactions serialize: a tag allocated
//! inside a transaction cannot collide with a concurrent one.
//!
//! The lock is `parking_lot`, not `std::sync` — it never poisons, so a
//! panicking caller cannot wedge the store for everyone else.

use std::sync::Arc;

use parking_lot::RwLock;

use grc_core::{ApprovalId, EntityId, EntityIdentifier, GrcError, Track, VersionId};

use crate::record::{ApprovalRecord, EntityRecord, VersionRecord};
use crate::tables::Tables;

/// Thread-safe, cloneable handle to the store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Tables>>,
}

impl Clone for MemoryStore {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Tables::new())),
        }
    }

    /// Run a closure against a staged copy of the tables, committing on
    /// `Ok` and discarding on `Err`.
    ///
    /// All multi-row operations (tag allocation + approval insert, chain
    /// resolve + activation flips, cascading deactivation) go through
    /// here so they observe and produce consistent state.
    pub fn transaction<R>(
        &self,
        f: impl FnOnce(&mut Tables) -> Result<R, GrcError>,
    ) -> Result<R, GrcError> {
        let mut guard = self.inner.write();
        let mut staged = guard.clone();
        match f(&mut staged) {
            Ok(value) => {
                *guard = staged;
                Ok(value)
            }
            Err(e) => {
                tracing::debug!(error = %e, "transaction rolled back");
                Err(e)
            }
        }
    }

    /// Run a read-only closure under the shared lock.
    ///
    /// Chain resolution for display goes through here and re-resolves on
    /// every call; nothing is cached across calls.
    pub fn read<R>(&self, f: impl FnOnce(&Tables) -> R) -> R {
        f(&self.inner.read())
    }

    // ── Single-record convenience calls ──────────────────────────────

    /// Persist a version record.
    pub fn put_version(&self, record: VersionRecord) -> Result<VersionId, GrcError> {
        self.transaction(|tables| {
            let id = record.id;
            tables.insert_version(record);
            Ok(id)
        })
    }

    /// Fetch a version record by id.
    pub fn get_version(&self, id: VersionId) -> Result<VersionRecord, GrcError> {
        self.read(|tables| tables.version(id).cloned())
    }

    /// Persist an approval record, subject to the tag-uniqueness check.
    pub fn put_approval(&self, record: ApprovalRecord) -> Result<ApprovalId, GrcError> {
        self.transaction(|tables| {
            let id = record.id;
            tables.insert_approval(record)?;
            Ok(id)
        })
    }

    /// The most recent approval record for an identifier, optionally
    /// restricted to one track.
    pub fn latest_approval(
        &self,
        identifier: &EntityIdentifier,
        track: Option<Track>,
    ) -> Option<ApprovalRecord> {
        self.read(|tables| tables.latest_approval(identifier, track).cloned())
    }

    /// Fetch an approval record by id.
    pub fn get_approval(&self, id: ApprovalId) -> Result<ApprovalRecord, GrcError> {
        self.read(|tables| tables.approval(id).cloned())
    }

    /// Fetch an entity row by id.
    pub fn get_entity(&self, id: EntityId) -> Result<EntityRecord, GrcError> {
        self.read(|tables| tables.entity(id).cloned())
    }

    // ── Whole-store export (CLI state files) ─────────────────────────

    /// Clone the whole store out, for serialization.
    pub fn export(&self) -> Tables {
        self.inner.read().clone()
    }

    /// Replace the whole store, for loading a serialized state file.
    pub fn import(&self, tables: Tables) {
        *self.inner.write() = tables;
    }
}
