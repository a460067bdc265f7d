//! # Risk Mitigation Snapshots
//!
//! The payload captured when a risk mitigation plan is submitted for
//! review: an ordered map of numbered steps, each with its own completion
//! status and [`ReviewMark`]. The reviewer approves or rejects individual
//! steps; one rejected step sends the whole plan back.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::mark::ReviewMark;

/// Completion status of a single mitigation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MitigationStepStatus {
    /// Work has not begun.
    NotStarted,
    /// Work is underway.
    InProgress,
    /// The step is done and ready for review.
    Completed,
}

impl std::fmt::Display for MitigationStepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NotStarted => "NOT_STARTED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
        };
        f.write_str(s)
    }
}

/// One numbered step of a mitigation plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MitigationStep {
    /// What the step does.
    pub description: String,
    /// Completion status reported by the author.
    pub status: MitigationStepStatus,
    /// Author comments on the step.
    pub comments: Option<String>,
    /// The reviewer's verdict on this step.
    pub review: ReviewMark,
}

impl MitigationStep {
    /// A completed step awaiting review.
    pub fn completed(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            status: MitigationStepStatus::Completed,
            comments: None,
            review: ReviewMark::pending(),
        }
    }
}

/// Snapshot of a risk mitigation plan.
///
/// Steps are keyed by their 1-based position; a `BTreeMap` keeps them in
/// order through serialization, which a plain JSON object keyed by number
/// strings would not guarantee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskMitigationSnapshot {
    /// Title of the risk being mitigated.
    pub title: String,
    /// The numbered mitigation steps.
    pub steps: BTreeMap<u32, MitigationStep>,
    /// The reviewer's verdict on the plan as a whole.
    pub review: ReviewMark,
}

impl RiskMitigationSnapshot {
    /// Clear the plan-level mark and every step's mark.
    pub fn reset_review_fields(&mut self) {
        self.review.reset();
        for step in self.steps.values_mut() {
            step.review.reset();
        }
    }

    /// Whether the plan or any step carries a rejecting mark.
    pub fn has_rejected_node(&self) -> bool {
        self.review.approved == Some(false)
            || self
                .steps
                .values()
                .any(|s| s.review.approved == Some(false))
    }

    /// Whether every step reports `Completed`.
    pub fn all_steps_completed(&self) -> bool {
        self.steps
            .values()
            .all(|s| s.status == MitigationStepStatus::Completed)
    }
}
