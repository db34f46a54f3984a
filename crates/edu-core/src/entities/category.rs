use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{CategoryAssignment, CategoryStatus};

/// A group of columns filled in together.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub assignment: CategoryAssignment,
    pub status: CategoryStatus,
}
