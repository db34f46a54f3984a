//! Collaborator contracts the engine depends on.
//!
//! The engine never assumes a query language: it reads and writes entries
//! through [`EntryStore`], resolves the organizational tree and category
//! catalog through [`ReferenceLookup`], and hands side effects to
//! [`AuditSink`] and [`NotificationSink`]. `edu-db` implements all four on
//! top of libSQL.
//!
//! Implementations are injected into `ApprovalService`; none of these traits
//! may rely on process-wide mutable state.

use crate::entities::{AuditRecord, Category, Column, Entry, NaturalKey, NotificationRequest, School};
use crate::enums::EntryStatus;
use crate::errors::{SinkError, StorageError};
use crate::updates::{EntryPatch, EntryUpsert};

/// Filter criteria for entry reads and updates. `None` fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFilter {
    pub school_ids: Option<Vec<String>>,
    pub category_id: Option<String>,
    pub column_id: Option<String>,
    pub value: Option<String>,
    pub statuses: Option<Vec<EntryStatus>>,
}

impl EntryFilter {
    /// Match the single entry with this natural key.
    #[must_use]
    pub fn for_key(key: &NaturalKey) -> Self {
        Self {
            school_ids: Some(vec![key.school_id.clone()]),
            category_id: Some(key.category_id.clone()),
            column_id: Some(key.column_id.clone()),
            ..Self::default()
        }
    }

    /// Match every entry of one school's form for a category.
    #[must_use]
    pub fn for_form(school_id: &str, category_id: &str) -> Self {
        Self {
            school_ids: Some(vec![school_id.to_string()]),
            category_id: Some(category_id.to_string()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_statuses(mut self, statuses: &[EntryStatus]) -> Self {
        self.statuses = Some(statuses.to_vec());
        self
    }

    /// Whether `entry` satisfies every populated criterion.
    #[must_use]
    pub fn matches(&self, entry: &Entry) -> bool {
        self.school_ids
            .as_ref()
            .is_none_or(|ids| ids.contains(&entry.school_id))
            && self
                .category_id
                .as_ref()
                .is_none_or(|id| *id == entry.category_id)
            && self
                .column_id
                .as_ref()
                .is_none_or(|id| *id == entry.column_id)
            && self.value.as_ref().is_none_or(|v| *v == entry.value)
            && self
                .statuses
                .as_ref()
                .is_none_or(|s| s.contains(&entry.status))
    }
}

/// Persistent entry table.
#[allow(async_fn_in_trait)]
pub trait EntryStore {
    /// Insert or update rows keyed on `(school_id, category_id, column_id)`.
    /// Returns the stored rows; a row whose stored status no longer matches
    /// the one it carries is skipped and missing from the result.
    async fn upsert_entries(&self, rows: &[EntryUpsert]) -> Result<Vec<Entry>, StorageError>;

    /// Apply `patch` to every row matching `filter`. Returns the updated rows.
    async fn update_entries(
        &self,
        filter: &EntryFilter,
        patch: &EntryPatch,
    ) -> Result<Vec<Entry>, StorageError>;

    async fn select_entries(&self, filter: &EntryFilter) -> Result<Vec<Entry>, StorageError>;
}

/// Read-only organizational tree and category catalog.
///
/// Must be consistent for the duration of a single engine operation.
#[allow(async_fn_in_trait)]
pub trait ReferenceLookup {
    async fn get_school(&self, school_id: &str) -> Result<Option<School>, StorageError>;

    async fn schools_in_sector(&self, sector_id: &str) -> Result<Vec<School>, StorageError>;

    async fn get_category(&self, category_id: &str) -> Result<Option<Category>, StorageError>;

    /// Columns of a category, in display order.
    async fn category_columns(&self, category_id: &str) -> Result<Vec<Column>, StorageError>;
}

/// Append-only audit log.
#[allow(async_fn_in_trait)]
pub trait AuditSink {
    async fn record(&self, record: &AuditRecord) -> Result<(), SinkError>;
}

#[allow(async_fn_in_trait)]
pub trait NotificationSink {
    async fn notify(&self, request: &NotificationRequest) -> Result<(), SinkError>;
}

// ---------------------------------------------------------------------------
// Borrowed collaborators
// ---------------------------------------------------------------------------

// One backend usually plays every role, so the engine can hold `&Backend`
// four times instead of four owned handles.

impl<T: EntryStore + ?Sized> EntryStore for &T {
    async fn upsert_entries(&self, rows: &[EntryUpsert]) -> Result<Vec<Entry>, StorageError> {
        (**self).upsert_entries(rows).await
    }

    async fn update_entries(
        &self,
        filter: &EntryFilter,
        patch: &EntryPatch,
    ) -> Result<Vec<Entry>, StorageError> {
        (**self).update_entries(filter, patch).await
    }

    async fn select_entries(&self, filter: &EntryFilter) -> Result<Vec<Entry>, StorageError> {
        (**self).select_entries(filter).await
    }
}

impl<T: ReferenceLookup + ?Sized> ReferenceLookup for &T {
    async fn get_school(&self, school_id: &str) -> Result<Option<School>, StorageError> {
        (**self).get_school(school_id).await
    }

    async fn schools_in_sector(&self, sector_id: &str) -> Result<Vec<School>, StorageError> {
        (**self).schools_in_sector(sector_id).await
    }

    async fn get_category(&self, category_id: &str) -> Result<Option<Category>, StorageError> {
        (**self).get_category(category_id).await
    }

    async fn category_columns(&self, category_id: &str) -> Result<Vec<Column>, StorageError> {
        (**self).category_columns(category_id).await
    }
}

impl<T: AuditSink + ?Sized> AuditSink for &T {
    async fn record(&self, record: &AuditRecord) -> Result<(), SinkError> {
        (**self).record(record).await
    }
}

impl<T: NotificationSink + ?Sized> NotificationSink for &T {
    async fn notify(&self, request: &NotificationRequest) -> Result<(), SinkError> {
        (**self).notify(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(school: &str, column: &str, value: &str, status: EntryStatus) -> Entry {
        let now = Utc::now();
        Entry {
            id: "ent-00000001".into(),
            school_id: school.into(),
            category_id: "cat-1".into(),
            column_id: column.into(),
            value: value.into(),
            status,
            created_by: None,
            approved_by: None,
            approved_at: None,
            rejected_by: None,
            rejected_at: None,
            rejection_reason: None,
            proxy_created_by: None,
            proxy_reason: None,
            proxy_original_entity: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = EntryFilter::default();
        assert!(filter.matches(&entry("sch-1", "col-1", "x", EntryStatus::Draft)));
    }

    #[test]
    fn key_filter_matches_only_that_key() {
        let key = NaturalKey::new("sch-1", "cat-1", "col-1");
        let filter = EntryFilter::for_key(&key);
        assert!(filter.matches(&entry("sch-1", "col-1", "x", EntryStatus::Draft)));
        assert!(!filter.matches(&entry("sch-2", "col-1", "x", EntryStatus::Draft)));
        assert!(!filter.matches(&entry("sch-1", "col-2", "x", EntryStatus::Draft)));
    }

    #[test]
    fn status_filter_restricts_matches() {
        let filter = EntryFilter::for_form("sch-1", "cat-1")
            .with_statuses(&[EntryStatus::Draft, EntryStatus::Returned]);
        assert!(filter.matches(&entry("sch-1", "col-1", "x", EntryStatus::Returned)));
        assert!(!filter.matches(&entry("sch-1", "col-1", "x", EntryStatus::Pending)));
    }
}
