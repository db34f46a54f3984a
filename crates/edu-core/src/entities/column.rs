use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::ColumnType;

/// Custom validation rules attached to a column.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ValidationRules {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub pattern: Option<String>,
    /// Value must not be held by another school of the same sector.
    #[serde(default)]
    pub unique: bool,
    /// Message shown when `pattern` does not match.
    #[serde(default)]
    pub message: Option<String>,
}

/// Shape of one fact within a category.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Column {
    pub id: String,
    pub category_id: String,
    pub name: String,
    pub column_type: ColumnType,
    pub is_required: bool,
    #[serde(default)]
    pub validation: ValidationRules,
    /// Allowed values for `select` columns.
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub order_index: u32,
}
