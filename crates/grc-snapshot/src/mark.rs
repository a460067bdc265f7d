//! # Review Marks
//!
//! The per-node verdict a reviewer attaches while working through a
//! snapshot. Every reviewable node (framework, policy, subpolicy,
//! mitigation step) carries one.

use serde::{Deserialize, Serialize};

/// A reviewer's verdict on one node of a snapshot.
///
/// `approved` is `None` until the reviewer has looked at the node.
/// Resubmission clears the mark so a stale verdict never carries into a
/// fresh review round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewMark {
    /// The verdict: `None` = not yet reviewed.
    pub approved: Option<bool>,
    /// Reviewer remarks, normally present when `approved == Some(false)`.
    pub remarks: Option<String>,
}

impl ReviewMark {
    /// A mark with no verdict recorded.
    pub fn pending() -> Self {
        Self::default()
    }

    /// An approving mark.
    pub fn approved() -> Self {
        Self {
            approved: Some(true),
            remarks: None,
        }
    }

    /// A rejecting mark with remarks.
    pub fn rejected(remarks: impl Into<String>) -> Self {
        Self {
            approved: Some(false),
            remarks: Some(remarks.into()),
        }
    }

    /// Whether a verdict has been recorded.
    pub fn is_decided(&self) -> bool {
        self.approved.is_some()
    }

    /// Clear the verdict and remarks.
    pub fn reset(&mut self) {
        self.approved = None;
        self.remarks = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_has_no_verdict() {
        let mark = ReviewMark::pending();
        assert!(!mark.is_decided());
        assert!(mark.remarks.is_none());
    }

    #[test]
    fn test_rejected_carries_remarks() {
        let mark = ReviewMark::rejected("fix scope");
        assert_eq!(mark.approved, Some(false));
        assert_eq!(mark.remarks.as_deref(), Some("fix scope"));
        assert!(mark.is_decided());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut mark = ReviewMark::rejected("fix scope");
        mark.reset();
        assert_eq!(mark, ReviewMark::pending());
    }
}
