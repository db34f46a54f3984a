//! # edu-db
//!
//! libSQL storage for the approval engine.
//!
//! [`EduDb`] implements every collaborator trait from `edu_core::ports`:
//! the entry store (upserts keyed on `(school_id, category_id, column_id)`),
//! the read-only hierarchy and category catalog, the append-only audit log,
//! and the notification inbox. Reference data is loaded with
//! [`EduDb::seed`].

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;

pub use repos::{AuditFilter, NotificationFilter, ReferenceData};

#[cfg(test)]
mod test_support;

use error::DatabaseError;
use libsql::Builder;

/// Central database handle.
pub struct EduDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl EduDb {
    /// Open a local database at the given path, or `:memory:`.
    ///
    /// Runs migrations automatically on open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Per-connection in SQLite
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let edu_db = Self { db, conn };
        edu_db.run_migrations().await?;
        tracing::debug!(path, "database opened");
        Ok(edu_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Generate a prefixed ID via libSQL. Returns e.g., `"aud-a3f8b2c1"`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT '{prefix}-' || lower(hex(randomblob(4)))"),
                (),
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<String>(0)?)
    }
}
