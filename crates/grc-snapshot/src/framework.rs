//! # Framework, Policy, and SubPolicy Snapshots
//!
//! The nested payload captured when a framework (or a standalone policy)
//! is submitted for review: the framework node, its policies, and their
//! subpolicies, each carrying its own [`ReviewMark`]. The nesting mirrors
//! the structural ownership hierarchy — a framework submission is
//! reviewed as one document.

use serde::{Deserialize, Serialize};

use grc_core::EntityIdentifier;

use crate::mark::ReviewMark;

/// Snapshot of a framework and everything it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameworkSnapshot {
    /// Display name.
    pub name: String,
    /// Stable business identifier of the framework.
    pub identifier: EntityIdentifier,
    /// Free-text description.
    pub description: String,
    /// Framework category (e.g. "Information Security").
    pub category: String,
    /// Owned policies, in document order.
    pub policies: Vec<PolicySnapshot>,
    /// The reviewer's verdict on the framework node itself.
    pub review: ReviewMark,
}

/// Snapshot of a policy and its subpolicies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySnapshot {
    /// Display name.
    pub name: String,
    /// Stable business identifier of the policy.
    pub identifier: EntityIdentifier,
    /// Free-text description.
    pub description: String,
    /// Owning department.
    pub department: String,
    /// What the policy covers.
    pub scope: String,
    /// What the policy is meant to achieve.
    pub objective: String,
    /// Owned subpolicies, in document order.
    pub subpolicies: Vec<SubPolicySnapshot>,
    /// The reviewer's verdict on the policy node.
    pub review: ReviewMark,
}

/// Snapshot of a subpolicy (control).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubPolicySnapshot {
    /// Display name.
    pub name: String,
    /// Stable business identifier of the subpolicy.
    pub identifier: EntityIdentifier,
    /// Free-text description.
    pub description: String,
    /// The control statement under review.
    pub control: String,
    /// The reviewer's verdict on the subpolicy node.
    pub review: ReviewMark,
}

impl FrameworkSnapshot {
    /// Clear every review mark in the document, recursively.
    pub fn reset_review_fields(&mut self) {
        self.review.reset();
        for policy in &mut self.policies {
            policy.reset_review_fields();
        }
    }

    /// Whether any node in the document carries a rejecting mark.
    pub fn has_rejected_node(&self) -> bool {
        self.review.approved == Some(false)
            || self.policies.iter().any(PolicySnapshot::has_rejected_node)
    }
}

impl PolicySnapshot {
    /// Clear the policy's mark and those of its subpolicies.
    pub fn reset_review_fields(&mut self) {
        self.review.reset();
        for sub in &mut self.subpolicies {
            sub.review.reset();
        }
    }

    /// Whether this policy or any subpolicy carries a rejecting mark.
    pub fn has_rejected_node(&self) -> bool {
        self.review.approved == Some(false)
            || self
                .subpolicies
                .iter()
                .any(|s| s.review.approved == Some(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subpolicy(ident: &str) -> SubPolicySnapshot {
        SubPolicySnapshot {
            name: format!("Sub {ident}"),
            identifier: EntityIdentifier::new(ident).unwrap(),
            description: "control description".to_string(),
            control: "the control statement".to_string(),
            review: ReviewMark::pending(),
        }
    }

    fn policy(ident: &str, subs: Vec<SubPolicySnapshot>) -> PolicySnapshot {
        PolicySnapshot {
            name: format!("Policy {ident}"),
            identifier: EntityIdentifier::new(ident).unwrap(),
            description: "policy description".to_string(),
            department: "Security".to_string(),
            scope: "org-wide".to_string(),
            objective: "protect assets".to_string(),
            subpolicies: subs,
            review: ReviewMark::pending(),
        }
    }

    fn framework() -> FrameworkSnapshot {
        FrameworkSnapshot {
            name: "ISO 27001".to_string(),
            identifier: EntityIdentifier::new("FW-ISO27001").unwrap(),
            description: "information security".to_string(),
            category: "Information Security".to_string(),
            policies: vec![policy("POL-01", vec![subpolicy("SUB-01"), subpolicy("SUB-02")])],
            review: ReviewMark::pending(),
        }
    }

    #[test]
    fn test_reset_clears_all_levels() {
        let mut fw = framework();
        fw.review = ReviewMark::approved();
        fw.policies[0].review = ReviewMark::rejected("scope too narrow");
        fw.policies[0].subpolicies[1].review = ReviewMark::approved();

        fw.reset_review_fields();

        assert!(!fw.review.is_decided());
        assert!(!fw.policies[0].review.is_decided());
        assert!(fw.policies[0].subpolicies.iter().all(|s| !s.review.is_decided()));
    }

    #[test]
    fn test_rejected_node_detected_at_depth() {
        let mut fw = framework();
        assert!(!fw.has_rejected_node());

        fw.policies[0].subpolicies[0].review = ReviewMark::rejected("weak control");
        assert!(fw.has_rejected_node());
    }
}
