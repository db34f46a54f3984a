//! Data entry repository.
//!
//! Rows are keyed on `(school_id, category_id, column_id)`. Upserts keep the
//! existing id, author, and `created_at`, and never change a status. Both
//! upserts and updates are guarded on the status the engine last read.

use edu_core::entities::Entry;
use edu_core::errors::StorageError;
use edu_core::ports::{EntryFilter, EntryStore};
use edu_core::updates::{EntryPatch, EntryUpsert};
use libsql::Value;

use crate::EduDb;
use crate::error::DatabaseError;
use crate::helpers::{
    get_opt_string, opt_text, opt_timestamp, parse_datetime, parse_enum, parse_optional_datetime,
};

const ENTRY_COLUMNS: &str = "id, school_id, category_id, column_id, value, status, \
    created_by, approved_by, approved_at, rejected_by, rejected_at, rejection_reason, \
    proxy_created_by, proxy_reason, proxy_original_entity, created_at, updated_at";

fn entry_from_row(row: &libsql::Row) -> Result<Entry, DatabaseError> {
    Ok(Entry {
        id: row.get::<String>(0)?,
        school_id: row.get::<String>(1)?,
        category_id: row.get::<String>(2)?,
        column_id: row.get::<String>(3)?,
        value: row.get::<String>(4)?,
        status: parse_enum(&row.get::<String>(5)?)?,
        created_by: get_opt_string(row, 6)?,
        approved_by: get_opt_string(row, 7)?,
        approved_at: parse_optional_datetime(get_opt_string(row, 8)?.as_deref())?,
        rejected_by: get_opt_string(row, 9)?,
        rejected_at: parse_optional_datetime(get_opt_string(row, 10)?.as_deref())?,
        rejection_reason: get_opt_string(row, 11)?,
        proxy_created_by: get_opt_string(row, 12)?,
        proxy_reason: get_opt_string(row, 13)?,
        proxy_original_entity: get_opt_string(row, 14)?,
        created_at: parse_datetime(&row.get::<String>(15)?)?,
        updated_at: parse_datetime(&row.get::<String>(16)?)?,
    })
}

/// Push `value` and return its positional placeholder.
fn bind(params: &mut Vec<Value>, value: Value) -> String {
    params.push(value);
    format!("?{}", params.len())
}

/// Build a WHERE clause for `filter`, appending its parameters to `params`.
///
/// An empty id or status list matches nothing.
fn where_clause(filter: &EntryFilter, params: &mut Vec<Value>) -> String {
    let mut conditions = Vec::new();

    if let Some(ref school_ids) = filter.school_ids {
        if school_ids.is_empty() {
            conditions.push("0".to_string());
        } else {
            let placeholders: Vec<String> = school_ids
                .iter()
                .map(|id| bind(params, Value::Text(id.clone())))
                .collect();
            conditions.push(format!("school_id IN ({})", placeholders.join(", ")));
        }
    }
    if let Some(ref category_id) = filter.category_id {
        let p = bind(params, Value::Text(category_id.clone()));
        conditions.push(format!("category_id = {p}"));
    }
    if let Some(ref column_id) = filter.column_id {
        let p = bind(params, Value::Text(column_id.clone()));
        conditions.push(format!("column_id = {p}"));
    }
    if let Some(ref value) = filter.value {
        let p = bind(params, Value::Text(value.clone()));
        conditions.push(format!("value = {p}"));
    }
    if let Some(ref statuses) = filter.statuses {
        if statuses.is_empty() {
            conditions.push("0".to_string());
        } else {
            let placeholders: Vec<String> = statuses
                .iter()
                .map(|s| bind(params, Value::Text(s.as_str().to_string())))
                .collect();
            conditions.push(format!("status IN ({})", placeholders.join(", ")));
        }
    }

    if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    }
}

/// Build the SET list for `patch`, appending its parameters to `params`.
fn set_clause(patch: &EntryPatch, params: &mut Vec<Value>) -> Vec<String> {
    let mut sets = Vec::new();
    if let Some(status) = patch.status {
        let p = bind(params, Value::Text(status.as_str().to_string()));
        sets.push(format!("status = {p}"));
    }
    if let Some(ref value) = patch.value {
        let p = bind(params, Value::Text(value.clone()));
        sets.push(format!("value = {p}"));
    }
    if let Some(ref approved_by) = patch.approved_by {
        let p = bind(params, opt_text(approved_by.as_deref()));
        sets.push(format!("approved_by = {p}"));
    }
    if let Some(approved_at) = patch.approved_at {
        let p = bind(params, opt_timestamp(approved_at));
        sets.push(format!("approved_at = {p}"));
    }
    if let Some(ref rejected_by) = patch.rejected_by {
        let p = bind(params, opt_text(rejected_by.as_deref()));
        sets.push(format!("rejected_by = {p}"));
    }
    if let Some(rejected_at) = patch.rejected_at {
        let p = bind(params, opt_timestamp(rejected_at));
        sets.push(format!("rejected_at = {p}"));
    }
    if let Some(ref reason) = patch.rejection_reason {
        let p = bind(params, opt_text(reason.as_deref()));
        sets.push(format!("rejection_reason = {p}"));
    }
    if let Some(updated_at) = patch.updated_at {
        let p = bind(params, Value::Text(updated_at.to_rfc3339()));
        sets.push(format!("updated_at = {p}"));
    }
    sets
}

fn sort_by_key(entries: &mut [Entry]) {
    entries.sort_by(|a, b| {
        (&a.school_id, &a.category_id, &a.column_id).cmp(&(&b.school_id, &b.category_id, &b.column_id))
    });
}

async fn collect(mut rows: libsql::Rows) -> Result<Vec<Entry>, DatabaseError> {
    let mut entries = Vec::new();
    while let Some(row) = rows.next().await? {
        entries.push(entry_from_row(&row)?);
    }
    Ok(entries)
}

impl EduDb {
    /// Upsert every row in one transaction and return the stored rows.
    ///
    /// An existing row is only updated while its status equals the status
    /// the upsert carries; otherwise it is left alone and missing from the
    /// result.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if any row fails (e.g. unknown school); no
    /// row is written in that case.
    pub async fn upsert_entry_rows(&self, rows: &[EntryUpsert]) -> Result<Vec<Entry>, DatabaseError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let tx = self.conn.transaction().await?;
        let mut stored = Vec::with_capacity(rows.len());

        for row in rows {
            let proxy = row.proxy.as_ref();
            let result = tx
                .query(
                    &format!(
                        "INSERT INTO data_entries (id, school_id, category_id, column_id, value, status,
                            created_by, proxy_created_by, proxy_reason, proxy_original_entity,
                            created_at, updated_at)
                         VALUES ('ent-' || lower(hex(randomblob(4))), ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
                         ON CONFLICT(school_id, category_id, column_id) DO UPDATE SET
                            value = excluded.value,
                            updated_at = excluded.updated_at,
                            created_by = COALESCE(data_entries.created_by, excluded.created_by),
                            proxy_created_by = COALESCE(excluded.proxy_created_by, data_entries.proxy_created_by),
                            proxy_reason = COALESCE(excluded.proxy_reason, data_entries.proxy_reason),
                            proxy_original_entity = COALESCE(excluded.proxy_original_entity, data_entries.proxy_original_entity)
                         WHERE data_entries.status = excluded.status
                         RETURNING {ENTRY_COLUMNS}"
                    ),
                    libsql::params_from_iter(vec![
                        Value::Text(row.school_id.clone()),
                        Value::Text(row.category_id.clone()),
                        Value::Text(row.column_id.clone()),
                        Value::Text(row.value.clone()),
                        Value::Text(row.status.as_str().to_string()),
                        opt_text(row.created_by.as_deref()),
                        opt_text(proxy.map(|p| p.proxy_created_by.as_str())),
                        opt_text(proxy.map(|p| p.proxy_reason.as_str())),
                        opt_text(proxy.map(|p| p.proxy_original_entity.as_str())),
                        Value::Text(row.updated_at.to_rfc3339()),
                    ]),
                )
                .await;
            let mut returned = match result {
                Ok(returned) => returned,
                Err(e) => {
                    tx.rollback().await?;
                    return Err(e.into());
                }
            };
            let entry = match returned.next().await? {
                Some(r) => Some(entry_from_row(&r)?),
                None => None,
            };
            drop(returned);
            match entry {
                Some(entry) => stored.push(entry),
                None => tracing::debug!(key = %row.key(), status = %row.status, "upsert skipped, status changed"),
            }
        }

        tx.commit().await?;
        tracing::debug!(rows = stored.len(), "entries upserted");
        Ok(stored)
    }

    /// Apply `patch` to every row matching `filter` and return the updated rows.
    ///
    /// An empty patch updates nothing and returns the matching rows as stored.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the update fails.
    pub async fn patch_entries(
        &self,
        filter: &EntryFilter,
        patch: &EntryPatch,
    ) -> Result<Vec<Entry>, DatabaseError> {
        if patch.is_empty() {
            return self.find_entries(filter).await;
        }
        let mut params = Vec::new();
        let sets = set_clause(patch, &mut params);
        let where_sql = where_clause(filter, &mut params);
        let sql = format!(
            "UPDATE data_entries SET {}{where_sql} RETURNING {ENTRY_COLUMNS}",
            sets.join(", ")
        );
        let rows = self.conn.query(&sql, libsql::params_from_iter(params)).await?;
        let mut entries = collect(rows).await?;
        sort_by_key(&mut entries);
        Ok(entries)
    }

    /// Rows matching `filter`, ordered by natural key.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or a stored row is invalid.
    pub async fn find_entries(&self, filter: &EntryFilter) -> Result<Vec<Entry>, DatabaseError> {
        let mut params = Vec::new();
        let where_sql = where_clause(filter, &mut params);
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM data_entries{where_sql}
             ORDER BY school_id, category_id, column_id"
        );
        let rows = self.conn.query(&sql, libsql::params_from_iter(params)).await?;
        collect(rows).await
    }
}

impl EntryStore for EduDb {
    async fn upsert_entries(&self, rows: &[EntryUpsert]) -> Result<Vec<Entry>, StorageError> {
        Ok(self.upsert_entry_rows(rows).await?)
    }

    async fn update_entries(
        &self,
        filter: &EntryFilter,
        patch: &EntryPatch,
    ) -> Result<Vec<Entry>, StorageError> {
        Ok(self.patch_entries(filter, patch).await?)
    }

    async fn select_entries(&self, filter: &EntryFilter) -> Result<Vec<Entry>, StorageError> {
        Ok(self.find_entries(filter).await?)
    }
}
