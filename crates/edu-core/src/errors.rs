//! Collaborator error types.
//!
//! These are the errors that cross the collaborator traits in [`crate::ports`].
//! Engine errors (`ApprovalError`) live in `edu-approval` and database errors
//! (`DatabaseError`) in `edu-db`; both convert into or out of these.

use thiserror::Error;

/// The storage collaborator failed (network, constraint violation, bad data).
#[derive(Debug, Error)]
pub enum StorageError {
    /// A write or read was rejected by the store.
    #[error("Storage query failed: {0}")]
    Query(String),

    /// A stored row could not be mapped back to an entity.
    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    /// The store is unreachable or not initialized.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// An audit or notification sink failed. Always logged, never propagated.
#[derive(Debug, Error)]
#[error("{sink} sink failed: {message}")]
pub struct SinkError {
    pub sink: &'static str,
    pub message: String,
}

impl SinkError {
    #[must_use]
    pub fn audit(message: impl Into<String>) -> Self {
        Self {
            sink: "audit",
            message: message.into(),
        }
    }

    #[must_use]
    pub fn notification(message: impl Into<String>) -> Self {
        Self {
            sink: "notification",
            message: message.into(),
        }
    }
}
