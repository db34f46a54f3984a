//! Field validation engine.
//!
//! [`check_value`] runs the required, type, and rule checks that need nothing
//! but the column definition. [`Validator`] adds the sector-scoped `unique`
//! rule, which reads existing entries.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use edu_core::entities::{Column, School};
use edu_core::enums::ColumnType;
use edu_core::ports::{EntryFilter, EntryStore, ReferenceLookup};
use edu_core::responses::{FieldValidation, FormValidation};
use regex::Regex;

pub const MSG_REQUIRED: &str = "This field is required";
pub const MSG_EMAIL: &str = "Invalid email address";
pub const MSG_NUMBER: &str = "Must be a number";
pub const MSG_OPTION: &str = "Must be one of the available options";
pub const MSG_DATE: &str = "Must be a date in YYYY-MM-DD format";
pub const MSG_CHECKBOX: &str = "Must be a yes/no value";
pub const MSG_PATTERN: &str = "Invalid format";
pub const MSG_BAD_PATTERN: &str = "Validation pattern is misconfigured";
pub const MSG_UNIQUE: &str = "This value is already in use";
pub const MSG_UNIQUE_UNVERIFIED: &str = "Unable to verify that this value is unique";

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid")
});

const CHECKBOX_TOKENS: [&str; 6] = ["true", "false", "1", "0", "yes", "no"];

/// Validate `value` against everything on `column` except `unique`.
#[must_use]
pub fn check_value(column: &Column, value: &str) -> FieldValidation {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return if column.is_required {
            FieldValidation::fail(MSG_REQUIRED)
        } else {
            FieldValidation::ok()
        };
    }

    let number = match check_type(column, trimmed) {
        Ok(number) => number,
        Err(message) => return FieldValidation::fail(message),
    };

    let rules = &column.validation;
    if let Some(number) = number {
        if let Some(min) = rules.min {
            if number < min {
                return FieldValidation::fail(format!("Must be at least {min}"));
            }
        }
        if let Some(max) = rules.max {
            if number > max {
                return FieldValidation::fail(format!("Must be at most {max}"));
            }
        }
    }

    if let Some(pattern) = rules.pattern.as_deref().filter(|p| !p.is_empty()) {
        match Regex::new(pattern) {
            Ok(regex) if regex.is_match(trimmed) => {}
            Ok(_) => {
                return FieldValidation::fail(
                    rules.message.clone().unwrap_or_else(|| MSG_PATTERN.to_string()),
                );
            }
            Err(error) => {
                tracing::warn!(column = %column.id, pattern, %error, "invalid validation pattern");
                return FieldValidation::fail(MSG_BAD_PATTERN);
            }
        }
    }

    FieldValidation::ok()
}

/// Type check. Returns the parsed number for numeric columns.
fn check_type(column: &Column, value: &str) -> Result<Option<f64>, &'static str> {
    match column.column_type {
        ColumnType::Text => Ok(None),
        ColumnType::Number => match value.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Some(n)),
            _ => Err(MSG_NUMBER),
        },
        ColumnType::Email => EMAIL.is_match(value).then_some(None).ok_or(MSG_EMAIL),
        ColumnType::Select => column
            .options
            .iter()
            .any(|o| o == value)
            .then_some(None)
            .ok_or(MSG_OPTION),
        ColumnType::Date => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(|_| None)
            .map_err(|_| MSG_DATE),
        ColumnType::Checkbox => {
            let token = value.to_ascii_lowercase();
            if CHECKBOX_TOKENS.contains(&token.as_str()) {
                return Ok(None);
            }
            if column.options.is_empty() {
                return Err(MSG_CHECKBOX);
            }
            value
                .split(',')
                .map(str::trim)
                .all(|item| column.options.iter().any(|o| o == item))
                .then_some(None)
                .ok_or(MSG_OPTION)
        }
    }
}

/// Validator with read access to existing entries for the `unique` rule.
pub struct Validator<'a, S, R> {
    store: &'a S,
    reference: &'a R,
}

impl<'a, S, R> Validator<'a, S, R>
where
    S: EntryStore,
    R: ReferenceLookup,
{
    pub const fn new(store: &'a S, reference: &'a R) -> Self {
        Self { store, reference }
    }

    /// Validate one value. `school` is the school the value is written for;
    /// without it the `unique` rule cannot be evaluated and is skipped.
    pub async fn validate_field(
        &self,
        column: &Column,
        value: &str,
        school: Option<&School>,
    ) -> FieldValidation {
        let result = check_value(column, value);
        if !result.valid || !column.validation.unique || value.trim().is_empty() {
            return result;
        }
        let Some(school) = school else {
            return result;
        };
        match self.is_taken(column, value.trim(), school).await {
            Ok(false) => result,
            Ok(true) => FieldValidation::fail(MSG_UNIQUE),
            Err(error) => {
                tracing::warn!(column = %column.id, %error, "uniqueness check failed");
                FieldValidation::fail(MSG_UNIQUE_UNVERIFIED)
            }
        }
    }

    /// Validate every column of a form. Missing values count as empty.
    pub async fn validate_form(
        &self,
        columns: &[Column],
        values: &BTreeMap<String, String>,
        school: Option<&School>,
    ) -> FormValidation {
        let mut errors = BTreeMap::new();
        for column in columns {
            let value = values.get(&column.id).map_or("", String::as_str);
            let result = self.validate_field(column, value, school).await;
            if !result.valid {
                let message = result.message.unwrap_or_else(|| MSG_PATTERN.to_string());
                errors.insert(column.id.clone(), message);
            }
        }
        FormValidation::from_errors(errors)
    }

    /// Whether another school in the same sector already holds `value`.
    async fn is_taken(
        &self,
        column: &Column,
        value: &str,
        school: &School,
    ) -> Result<bool, edu_core::errors::StorageError> {
        let others: Vec<String> = self
            .reference
            .schools_in_sector(&school.sector_id)
            .await?
            .into_iter()
            .map(|s| s.id)
            .filter(|id| *id != school.id)
            .collect();
        if others.is_empty() {
            return Ok(false);
        }
        let filter = EntryFilter {
            school_ids: Some(others),
            category_id: Some(column.category_id.clone()),
            column_id: Some(column.id.clone()),
            value: Some(value.to_string()),
            statuses: None,
        };
        Ok(!self.store.select_entries(&filter).await?.is_empty())
    }
}
