//! Engine error type.
//!
//! Every variant renders to a display-ready message; `ApprovalService`
//! converts errors into result structs before they reach callers.

use std::collections::BTreeMap;

use edu_core::errors::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApprovalError {
    /// One or more values failed field validation. Keyed by field.
    #[error("Validation failed: {}", summarize(.errors))]
    Validation { errors: BTreeMap<String, String> },

    #[error("Permission denied: {reason}")]
    PermissionDenied { reason: String },

    /// Malformed identity or a state that does not allow the request.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApprovalError {
    pub fn denied(reason: impl Into<String>) -> Self {
        Self::PermissionDenied {
            reason: reason.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert(field.into(), message.into());
        Self::Validation { errors }
    }

    /// Message suitable for a per-row failure entry.
    #[must_use]
    pub fn row_reason(&self) -> String {
        match self {
            Self::PermissionDenied { reason } => reason.clone(),
            Self::Conflict(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

fn summarize(errors: &BTreeMap<String, String>) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect::<Vec<_>>()
        .join("; ")
}
