//! Structured results returned by the caller-facing API.
//!
//! Every operation result carries an explicit `success` flag plus either a
//! payload or a display-ready `error` string. Partial success of bulk
//! operations is reported through counts and `failures`, not as an error.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::Entry;

/// Result of validating one value against one column.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct FieldValidation {
    pub valid: bool,
    pub message: Option<String>,
}

impl FieldValidation {
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            valid: true,
            message: None,
        }
    }

    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: Some(message.into()),
        }
    }
}

/// Result of validating a whole form. `errors` is keyed by column id.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct FormValidation {
    pub valid: bool,
    pub errors: BTreeMap<String, String>,
}

impl FormValidation {
    #[must_use]
    pub fn from_errors(errors: BTreeMap<String, String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Whether an actor may perform a status transition on a target.
///
/// `allowed == false` always carries a non-empty `reason`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TransitionDecision {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl TransitionDecision {
    #[must_use]
    pub const fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    #[must_use]
    pub fn deny(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        let reason = if reason.trim().is_empty() {
            String::from("transition denied")
        } else {
            reason
        };
        Self {
            allowed: false,
            reason: Some(reason),
        }
    }

    /// The denial reason, or an empty string when allowed.
    #[must_use]
    pub fn reason_str(&self) -> &str {
        self.reason.as_deref().unwrap_or_default()
    }
}

/// A single row that did not make it through a bulk operation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct RowFailure {
    pub column_id: String,
    pub reason: String,
}

/// Response from `save_form_data` and `save_proxy_form_data`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SaveResult {
    pub success: bool,
    /// Number of distinct natural keys written by this call.
    pub saved_count: u32,
    /// Values rejected by field validation, keyed by column id.
    pub field_errors: BTreeMap<String, String>,
    /// Rows refused for permission or status reasons.
    pub failures: Vec<RowFailure>,
    pub error: Option<String>,
}

impl SaveResult {
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

/// Response from `submit_for_approval`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SubmitResult {
    pub success: bool,
    pub submitted_count: u32,
    pub failures: Vec<RowFailure>,
    pub error: Option<String>,
}

impl SubmitResult {
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

/// Response from `submit_proxy_data`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ProxySubmitResult {
    pub success: bool,
    pub submitted_count: u32,
    /// Whether the submitted rows went straight on to `approved`.
    pub auto_approved: bool,
    pub failures: Vec<RowFailure>,
    pub error: Option<String>,
}

impl ProxySubmitResult {
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

/// Response from single-entry transitions and reopen.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TransitionResult {
    pub success: bool,
    pub entry: Option<Entry>,
    pub error: Option<String>,
}

impl TransitionResult {
    #[must_use]
    pub const fn applied(entry: Entry) -> Self {
        Self {
            success: true,
            entry: Some(entry),
            error: None,
        }
    }

    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            entry: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deny_never_has_empty_reason() {
        let decision = TransitionDecision::deny("   ");
        assert!(!decision.allowed);
        assert_eq!(decision.reason_str(), "transition denied");
    }

    #[test]
    fn form_validation_valid_iff_no_errors() {
        assert!(FormValidation::from_errors(BTreeMap::new()).valid);
        let mut errors = BTreeMap::new();
        errors.insert("col-1".to_string(), "This field is required".to_string());
        assert!(!FormValidation::from_errors(errors).valid);
    }

    #[test]
    fn failure_results_carry_error() {
        let result = SaveResult::failure("scope mismatch");
        assert!(!result.success);
        assert_eq!(result.saved_count, 0);
        assert_eq!(result.error.as_deref(), Some("scope mismatch"));
    }
}
