use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Region {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Sector {
    pub id: String,
    pub region_id: String,
    pub name: String,
}

/// A school and its position in the hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct School {
    pub id: String,
    pub sector_id: String,
    pub region_id: String,
    pub name: String,
    /// School owner; recipient of school-level notifications.
    pub admin_id: Option<String>,
}

/// The organizational coordinates an actor is checked against.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct OrgTarget {
    pub school_id: String,
    pub sector_id: String,
    pub region_id: String,
}

impl From<&School> for OrgTarget {
    fn from(school: &School) -> Self {
        Self {
            school_id: school.id.clone(),
            sector_id: school.sector_id.clone(),
            region_id: school.region_id.clone(),
        }
    }
}
