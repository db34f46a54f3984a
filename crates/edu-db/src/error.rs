//! Database error types for edu-db.

use edu_core::errors::{SinkError, StorageError};
use thiserror::Error;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed or returned unparseable data.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Invalid state encountered (e.g., bad data in DB).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Reference data file could not be decoded.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<DatabaseError> for StorageError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::InvalidState(message) => Self::InvalidData(message),
            DatabaseError::Migration(message) => Self::Unavailable(message),
            DatabaseError::LibSql(e) => Self::Unavailable(e.to_string()),
            other => Self::Query(other.to_string()),
        }
    }
}

impl DatabaseError {
    pub(crate) fn into_sink(self, sink: &'static str) -> SinkError {
        SinkError {
            sink,
            message: self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_state_maps_to_invalid_data() {
        let err: StorageError = DatabaseError::InvalidState("bad status".into()).into();
        assert!(matches!(err, StorageError::InvalidData(m) if m == "bad status"));
    }

    #[test]
    fn sink_error_keeps_sink_name() {
        let err = DatabaseError::NoResult.into_sink("audit");
        assert_eq!(err.to_string(), "audit sink failed: No result returned");
    }
}
