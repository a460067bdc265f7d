//! # grc-snapshot — Typed Approval Snapshots
//!
//! The payloads captured in approval records: what the entity looked like
//! at submission or decision time. Each entity kind has an explicit record
//! type rather than a schema-less JSON blob, so a missing field is a
//! deserialization error instead of a silent default.
//!
//! ## Structure
//!
//! - [`Snapshot`] — the tagged union stored on approval records.
//! - [`FrameworkSnapshot`] / [`PolicySnapshot`] / [`SubPolicySnapshot`] —
//!   the nested framework document, mirroring structural ownership.
//! - [`RiskMitigationSnapshot`] / [`MitigationStep`] — numbered mitigation
//!   steps reviewed individually.
//! - [`ReviewMark`] — the per-node verdict a reviewer attaches; cleared
//!   recursively on resubmission.

pub mod framework;
pub mod mark;
pub mod mitigation;
pub mod snapshot;

pub use framework::{FrameworkSnapshot, PolicySnapshot, SubPolicySnapshot};
pub use mark::ReviewMark;
pub use mitigation::{MitigationStep, MitigationStepStatus, RiskMitigationSnapshot};
pub use snapshot::Snapshot;
