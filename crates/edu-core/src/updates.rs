//! Write payloads for the entry store.
//!
//! `EntryUpsert` is one row of an upsert keyed on the natural key.
//! `EntryPatch` is a partial update: only `Some` fields are written, and
//! `Some(None)` clears a nullable column. Patches serialize to the changed
//! fields only, which is what the audit log records as `after`.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entities::{Entry, NaturalKey};
use crate::enums::EntryStatus;

/// Provenance attached to every entry written by a proxy actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProxyProvenance {
    pub proxy_created_by: String,
    pub proxy_reason: String,
    pub proxy_original_entity: String,
}

/// One row of an upsert.
///
/// A new row is inserted with `status`. On conflict with an existing row of
/// the same natural key, `status` is the status the caller last read: the
/// store writes `value` and `updated_at` only if the stored row still has
/// it, and skips the row otherwise. Status changes go through
/// `EntryStore::update_entries`, never through an upsert. The store keeps
/// the existing `id`, `created_at`, and `created_by` (filling `created_by`
/// only when it was unset), and overwrites provenance only when this row
/// carries it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryUpsert {
    pub school_id: String,
    pub category_id: String,
    pub column_id: String,
    pub value: String,
    pub status: EntryStatus,
    pub created_by: Option<String>,
    pub proxy: Option<ProxyProvenance>,
    pub updated_at: DateTime<Utc>,
}

impl EntryUpsert {
    #[must_use]
    pub fn key(&self) -> NaturalKey {
        NaturalKey::new(&self.school_id, &self.category_id, &self.column_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EntryStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<Option<DateTime<Utc>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_by: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<Option<DateTime<Utc>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl EntryPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the patch to an in-memory entry, mirroring the store's UPDATE.
    pub fn apply(&self, entry: &mut Entry) {
        if let Some(status) = self.status {
            entry.status = status;
        }
        if let Some(ref value) = self.value {
            entry.value.clone_from(value);
        }
        if let Some(ref approved_by) = self.approved_by {
            entry.approved_by.clone_from(approved_by);
        }
        if let Some(approved_at) = self.approved_at {
            entry.approved_at = approved_at;
        }
        if let Some(ref rejected_by) = self.rejected_by {
            entry.rejected_by.clone_from(rejected_by);
        }
        if let Some(rejected_at) = self.rejected_at {
            entry.rejected_at = rejected_at;
        }
        if let Some(ref reason) = self.rejection_reason {
            entry.rejection_reason.clone_from(reason);
        }
        if let Some(updated_at) = self.updated_at {
            entry.updated_at = updated_at;
        }
    }
}

pub struct EntryPatchBuilder(EntryPatch);

impl EntryPatchBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(EntryPatch::default())
    }

    #[must_use]
    pub fn status(mut self, status: EntryStatus) -> Self {
        self.0.status = Some(status);
        self
    }

    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.0.value = Some(value.into());
        self
    }

    #[must_use]
    pub fn approved(mut self, by: impl Into<String>, at: DateTime<Utc>) -> Self {
        self.0.approved_by = Some(Some(by.into()));
        self.0.approved_at = Some(Some(at));
        self
    }

    #[must_use]
    pub fn clear_approval(mut self) -> Self {
        self.0.approved_by = Some(None);
        self.0.approved_at = Some(None);
        self
    }

    #[must_use]
    pub fn rejected(mut self, by: Option<String>, at: DateTime<Utc>, reason: impl Into<String>) -> Self {
        self.0.rejected_by = Some(by);
        self.0.rejected_at = Some(Some(at));
        self.0.rejection_reason = Some(Some(reason.into()));
        self
    }

    #[must_use]
    pub fn clear_rejection(mut self) -> Self {
        self.0.rejected_by = Some(None);
        self.0.rejected_at = Some(None);
        self.0.rejection_reason = Some(None);
        self
    }

    #[must_use]
    pub fn updated_at(mut self, at: DateTime<Utc>) -> Self {
        self.0.updated_at = Some(at);
        self
    }

    #[must_use]
    pub fn build(self) -> EntryPatch {
        self.0
    }
}

impl Default for EntryPatchBuilder {
    fn default() -> Self {
        Self::new()
    }
}
