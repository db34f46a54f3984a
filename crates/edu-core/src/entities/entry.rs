use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::enums::EntryStatus;

/// Composite natural key of an entry. Exactly one entry exists per key.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NaturalKey {
    pub school_id: String,
    pub category_id: String,
    pub column_id: String,
}

impl NaturalKey {
    #[must_use]
    pub fn new(
        school_id: impl Into<String>,
        category_id: impl Into<String>,
        column_id: impl Into<String>,
    ) -> Self {
        Self {
            school_id: school_id.into(),
            category_id: category_id.into(),
            column_id: column_id.into(),
        }
    }
}

impl fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.school_id, self.category_id, self.column_id)
    }
}

/// One submitted fact: a school's value for one column of a category.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Entry {
    pub id: String,
    pub school_id: String,
    pub category_id: String,
    pub column_id: String,
    pub value: String,
    pub status: EntryStatus,
    pub created_by: Option<String>,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_by: Option<String>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    /// Actor that wrote this entry on behalf of the school.
    pub proxy_created_by: Option<String>,
    pub proxy_reason: Option<String>,
    /// Entity the proxy write was originally made for.
    pub proxy_original_entity: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entry {
    #[must_use]
    pub fn key(&self) -> NaturalKey {
        NaturalKey::new(&self.school_id, &self.category_id, &self.column_id)
    }
}
