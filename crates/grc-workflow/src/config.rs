//! Workflow configuration.

/// Tunables for [`ApprovalWorkflow`](crate::ApprovalWorkflow), passed at
/// construction. No global state: two workflows over the same store may
/// run with different settings.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// How many times an operation that hit a retryable
    /// [`VersionConflict`](grc_core::GrcError::VersionConflict) is
    /// re-attempted before the error is surfaced.
    pub max_conflict_retries: u32,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_conflict_retries: 3,
        }
    }
}
