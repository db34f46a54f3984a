//! Status enums, roles, column types, and audit/notification kinds.
//!
//! Most enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`;
//! `Role` keeps the single-word `lowercase` names stored in the users table.
//! `EntryStatus` owns the approval state graph through `allowed_next_states()`;
//! who may take which edge is decided by the permission matrix in `edu-approval`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// EntryStatus
// ---------------------------------------------------------------------------

/// Status of a data entry through its chain of custody.
///
/// ```text
/// draft → pending → sector_approved → region_approved → approved
///                 ↘ approved*        ↘ approved*
/// pending | sector_approved | region_approved → returned | rejected
/// returned → draft | pending
/// ```
///
/// `*` shortcut edges into `approved` exist only for actors holding
/// final-approval rights. `approved` and `rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Draft,
    Pending,
    SectorApproved,
    RegionApproved,
    Approved,
    Returned,
    Rejected,
}

impl EntryStatus {
    pub const ALL: [Self; 7] = [
        Self::Draft,
        Self::Pending,
        Self::SectorApproved,
        Self::RegionApproved,
        Self::Approved,
        Self::Returned,
        Self::Rejected,
    ];

    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Draft => &[Self::Pending],
            Self::Pending => &[
                Self::SectorApproved,
                Self::Approved,
                Self::Returned,
                Self::Rejected,
            ],
            Self::SectorApproved => &[
                Self::RegionApproved,
                Self::Approved,
                Self::Returned,
                Self::Rejected,
            ],
            Self::RegionApproved => &[Self::Approved, Self::Returned, Self::Rejected],
            Self::Returned => &[Self::Draft, Self::Pending],
            Self::Approved | Self::Rejected => &[],
        }
    }

    /// Check whether transitioning to `next` is allowed by the graph alone.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// Field values may only change while the entry is in one of these states.
    #[must_use]
    pub const fn is_editable(self) -> bool {
        matches!(self, Self::Draft | Self::Pending)
    }

    /// States past the school's hands: edits require a superadmin reopen.
    #[must_use]
    pub const fn is_locked(self) -> bool {
        matches!(
            self,
            Self::SectorApproved | Self::RegionApproved | Self::Approved | Self::Rejected
        )
    }

    /// States a reviewer can act on (approve further, return, or reject).
    #[must_use]
    pub const fn is_under_review(self) -> bool {
        matches!(
            self,
            Self::Pending | Self::SectorApproved | Self::RegionApproved
        )
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::SectorApproved => "sector_approved",
            Self::RegionApproved => "region_approved",
            Self::Approved => "approved",
            Self::Returned => "returned",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ScopeLevel
// ---------------------------------------------------------------------------

/// Level of the organizational hierarchy an actor can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScopeLevel {
    School,
    Sector,
    Region,
}

impl ScopeLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::School => "school",
            Self::Sector => "sector",
            Self::Region => "region",
        }
    }
}

impl fmt::Display for ScopeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// The four fixed actor roles, lowest privilege first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    SchoolAdmin,
    SectorAdmin,
    RegionAdmin,
    SuperAdmin,
}

impl Role {
    /// The hierarchy level this role is bound to. `None` for superadmin.
    #[must_use]
    pub const fn scope_level(self) -> Option<ScopeLevel> {
        match self {
            Self::SchoolAdmin => Some(ScopeLevel::School),
            Self::SectorAdmin => Some(ScopeLevel::Sector),
            Self::RegionAdmin => Some(ScopeLevel::Region),
            Self::SuperAdmin => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SchoolAdmin => "schooladmin",
            Self::SectorAdmin => "sectoradmin",
            Self::RegionAdmin => "regionadmin",
            Self::SuperAdmin => "superadmin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ColumnType
// ---------------------------------------------------------------------------

/// Semantic type of a column value. Values are always stored as strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Text,
    Number,
    Email,
    Select,
    Date,
    Checkbox,
}

impl ColumnType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Email => "email",
            Self::Select => "select",
            Self::Date => "date",
            Self::Checkbox => "checkbox",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CategoryAssignment
// ---------------------------------------------------------------------------

/// Which actors a category is assigned to.
///
/// `All` categories are filled in by schools; `Sectors` and `Regions`
/// categories only accept data from actors at that level or above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CategoryAssignment {
    All,
    Sectors,
    Regions,
}

impl CategoryAssignment {
    /// Lowest role allowed to write data for the category.
    #[must_use]
    pub const fn minimum_role(self) -> Role {
        match self {
            Self::All => Role::SchoolAdmin,
            Self::Sectors => Role::SectorAdmin,
            Self::Regions => Role::RegionAdmin,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Sectors => "sectors",
            Self::Regions => "regions",
        }
    }
}

impl fmt::Display for CategoryAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CategoryStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CategoryStatus {
    Active,
    Inactive,
}

impl CategoryStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl fmt::Display for CategoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AuditAction
// ---------------------------------------------------------------------------

/// Type of action recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    StatusChanged,
    Reopened,
    ProxyDataEntry,
    ProxySubmit,
    ProxySubmitAndApprove,
}

impl AuditAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StatusChanged => "status_changed",
            Self::Reopened => "reopened",
            Self::ProxyDataEntry => "proxy_data_entry",
            Self::ProxySubmit => "proxy_submit",
            Self::ProxySubmitAndApprove => "proxy_submit_and_approve",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EntityType
// ---------------------------------------------------------------------------

/// Type of entity referenced by audit records and notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    DataEntry,
    Category,
    School,
}

impl EntityType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DataEntry => "data_entry",
            Self::Category => "category",
            Self::School => "school",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// NotificationType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    ProxyDataEntry,
    ProxySubmission,
    ProxyApproval,
    EntryApproved,
    EntryReturned,
    EntryRejected,
    EntryReopened,
}

impl NotificationType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProxyDataEntry => "proxy_data_entry",
            Self::ProxySubmission => "proxy_submission",
            Self::ProxyApproval => "proxy_approval",
            Self::EntryApproved => "entry_approved",
            Self::EntryReturned => "entry_returned",
            Self::EntryRejected => "entry_rejected",
            Self::EntryReopened => "entry_reopened",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
