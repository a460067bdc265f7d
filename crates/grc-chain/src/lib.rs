//! # grc-chain — Version Chain Resolution and Activation
//!
//! Resolves which entities belong to the same version chain and keeps
//! exactly one of them active.
//!
//! A chain is the connected component over previous-version links,
//! reached by breadth-first walk in both directions: back along each
//! version's `previous` pointer and forward to every version that names
//! the current one as its predecessor. Membership is structural — it
//! does not depend on which record the walk starts from.
//!
//! - [`ChainGraph`] — an in-memory adjacency index built once per
//!   operation, so the walk is hash-map lookups instead of per-step
//!   store scans.
//! - [`ChainResolution`] — the resolved component, with any dangling
//!   links it crossed.
//! - [`activate_in`] / [`deactivate_in`] / [`apply_due_schedules`] —
//!   the activation coordinator. Operates on `&mut Tables` so callers
//!   compose it into a single store transaction.

pub mod activation;
pub mod resolver;

pub use activation::{
    activate_in, apply_due_schedules, deactivate_in, due_schedules, ActivationOutcome,
    DeactivationOutcome,
};
pub use resolver::{ChainGraph, ChainResolution};
