use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::Role;

/// An authenticated role bound to at most one organizational id.
///
/// `org_id` is the school, sector, or region id matching the role's level and
/// is ignored for superadmins.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub role: Role,
    pub org_id: Option<String>,
    /// Explicit right to move entries into `approved`.
    #[serde(default)]
    pub final_approval: bool,
}

impl Actor {
    #[must_use]
    pub fn new(id: impl Into<String>, role: Role, org_id: Option<String>) -> Self {
        Self {
            id: id.into(),
            role,
            org_id,
            final_approval: false,
        }
    }

    #[must_use]
    pub fn school_admin(id: impl Into<String>, school_id: impl Into<String>) -> Self {
        Self::new(id, Role::SchoolAdmin, Some(school_id.into()))
    }

    #[must_use]
    pub fn sector_admin(id: impl Into<String>, sector_id: impl Into<String>) -> Self {
        Self::new(id, Role::SectorAdmin, Some(sector_id.into()))
    }

    #[must_use]
    pub fn region_admin(id: impl Into<String>, region_id: impl Into<String>) -> Self {
        Self::new(id, Role::RegionAdmin, Some(region_id.into()))
    }

    #[must_use]
    pub fn superadmin(id: impl Into<String>) -> Self {
        Self::new(id, Role::SuperAdmin, None)
    }

    #[must_use]
    pub const fn with_final_approval(mut self, granted: bool) -> Self {
        self.final_approval = granted;
        self
    }
}
