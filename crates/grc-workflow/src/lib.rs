//! # grc-workflow — The Approval Workflow Engine
//!
//! The public face of the engine: everything a host calls goes through
//! [`ApprovalWorkflow`], which composes the store, the chain machinery,
//! and the permission gate into gate-checked, transactional operations.
//!
//! ## The dual-track tag scheme
//!
//! Every submission and every verdict appends an approval record with a
//! tag: author submissions take `A1, A2, …`, reviewer verdicts
//! `R1, R2, …`, each strictly increasing per entity identifier. The two
//! tracks alternate through the review conversation and never overwrite
//! each other — history is the full transcript, in order.
//!
//! ## Authorization
//!
//! Every mutating operation consults the [`PermissionGate`] before any
//! write. Hosts plug in their own access control; [`AllowAll`] and
//! [`StaticGate`] cover tests and single-operator use.

pub mod config;
pub mod gate;
pub mod workflow;

pub use config::WorkflowConfig;
pub use gate::{Action, AllowAll, PermissionGate, StaticGate};
pub use workflow::{
    ApprovalWorkflow, CreateVersionRequest, LabelBump, RejectedVersion, Verdict, VersionOutcome,
};

// Outcome types returned by the activation wrappers.
pub use grc_chain::{ActivationOutcome, DeactivationOutcome};
