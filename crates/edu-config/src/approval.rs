//! Approval policy configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApprovalConfig {
    /// Actor ids holding final-approval rights in addition to superadmins.
    #[serde(default)]
    pub final_approvers: Vec<String>,
}

impl ApprovalConfig {
    #[must_use]
    pub fn is_final_approver(&self, actor_id: &str) -> bool {
        self.final_approvers.iter().any(|id| id == actor_id)
    }
}
