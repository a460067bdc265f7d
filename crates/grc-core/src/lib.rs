//! # grc-core — Foundational Types for the GRC Stack
//!
//! This crate is the bedrock of the GRC Stack. It defines the type-system
//! primitives the versioning and approval engine is built on. Every other
//! crate in the workspace depends on `grc-core`; it depends on nothing
//! internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `EntityId`, `VersionId`,
//!    `ApprovalId`, `UserId`, `EntityIdentifier` — all newtypes, the last
//!    with a validated constructor. No bare UUIDs or strings for
//!    identifiers.
//!
//! 2. **Typed version tags.** `VersionTag::Author(n)` / `::Reviewer(n)`
//!    instead of string-sliced `"u3"` / `"R1"` tags. Increment and
//!    comparison are total functions; legacy spellings are accepted on
//!    parse only.
//!
//! 3. **One transition table.** `LifecycleStatus::valid_transitions()` is
//!    the single source of truth for the approval state machine; the
//!    workflow crate consults it rather than re-encoding edges.
//!
//! 4. **UTC-only timestamps.** `Timestamp` enforces UTC with Z suffix and
//!    seconds precision, so audit-trail records render identically
//!    everywhere.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `grc-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement
//!   `Serialize`/`Deserialize`.

pub mod error;
pub mod identity;
pub mod kind;
pub mod status;
pub mod tag;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use error::GrcError;
pub use identity::{ApprovalId, EntityId, EntityIdentifier, UserId, VersionId};
pub use kind::{EntityKind, ENTITY_KINDS};
pub use status::{ActivationState, Decision, LifecycleStatus};
pub use tag::{Track, VersionLabel, VersionTag};
pub use temporal::Timestamp;
