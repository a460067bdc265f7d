//! # grc-store — Persistence for Versions, Approvals, and Entities
//!
//! The storage layer of the GRC Stack. Three row types, one aggregate,
//! one transactional wrapper:
//!
//! - [`VersionRecord`] / [`ApprovalRecord`] — immutable once written.
//!   Approval history is append-only: corrections append, never update.
//! - [`EntityRecord`] — the one mutable row; only its `status`,
//!   `activation`, and `review_cycles` fields change after creation.
//! - [`Tables`] — the whole store as a plain cloneable value with typed
//!   accessors. Enforces tag uniqueness on approval insert.
//! - [`MemoryStore`] — `Arc<RwLock<Tables>>` with clone-and-swap
//!   transactions: commit on `Ok`, full rollback on `Err`.
//!
//! No business logic lives here. The chain resolver, activation rules,
//! and the approval state machine are layered on top in `grc-chain` and
//! `grc-workflow`; they compose their multi-row steps inside
//! [`MemoryStore::transaction`] closures.

pub mod memory;
pub mod record;
pub mod tables;

pub use memory::MemoryStore;
pub use record::{ApprovalRecord, EntityRecord, VersionRecord};
pub use tables::Tables;
