//! Audit log repository.
//!
//! Append-only: the schema rejects UPDATE and DELETE on `audit_log`.

use edu_core::entities::{AuditLogEntry, AuditRecord};
use edu_core::enums::{AuditAction, EntityType};
use edu_core::errors::SinkError;
use edu_core::ids::PREFIX_AUDIT;
use edu_core::ports::AuditSink;

use crate::EduDb;
use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum, parse_optional_json};

/// Filter criteria for audit queries.
#[derive(Debug, Default)]
pub struct AuditFilter {
    pub entity_type: Option<EntityType>,
    pub entity_id: Option<String>,
    pub action: Option<AuditAction>,
    pub actor_id: Option<String>,
    pub limit: Option<u32>,
}

impl EduDb {
    /// Append an audit record. Returns the generated id.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn append_audit(&self, record: &AuditRecord) -> Result<String, DatabaseError> {
        let id = self.generate_id(PREFIX_AUDIT).await?;
        let before = record.before.as_ref().map(ToString::to_string);
        let after = record.after.as_ref().map(ToString::to_string);
        self.conn
            .execute(
                "INSERT INTO audit_log
                    (id, actor_id, action, entity_type, entity_id, before_data, after_data, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                libsql::params![
                    id.as_str(),
                    record.actor_id.as_deref(),
                    record.action.as_str(),
                    record.entity_type.as_str(),
                    record.entity_id.as_str(),
                    before.as_deref(),
                    after.as_deref(),
                    record.created_at.to_rfc3339()
                ],
            )
            .await?;
        Ok(id)
    }

    /// Query audit records with optional filters, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn query_audit(&self, filter: &AuditFilter) -> Result<Vec<AuditLogEntry>, DatabaseError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(ref et) = filter.entity_type {
            params.push(libsql::Value::Text(et.as_str().to_string()));
            conditions.push(format!("entity_type = ?{}", params.len()));
        }
        if let Some(ref eid) = filter.entity_id {
            params.push(libsql::Value::Text(eid.clone()));
            conditions.push(format!("entity_id = ?{}", params.len()));
        }
        if let Some(ref action) = filter.action {
            params.push(libsql::Value::Text(action.as_str().to_string()));
            conditions.push(format!("action = ?{}", params.len()));
        }
        if let Some(ref actor) = filter.actor_id {
            params.push(libsql::Value::Text(actor.clone()));
            conditions.push(format!("actor_id = ?{}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let limit = filter.limit.unwrap_or(100);
        let sql = format!(
            "SELECT id, actor_id, action, entity_type, entity_id, before_data, after_data, created_at
             FROM audit_log {where_clause}
             ORDER BY created_at DESC, rowid DESC LIMIT {limit}"
        );

        let mut rows = self
            .conn
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut entries = Vec::new();

        while let Some(row) = rows.next().await? {
            entries.push(AuditLogEntry {
                id: row.get::<String>(0)?,
                actor_id: get_opt_string(&row, 1)?,
                action: parse_enum(&row.get::<String>(2)?)?,
                entity_type: parse_enum(&row.get::<String>(3)?)?,
                entity_id: row.get::<String>(4)?,
                before: parse_optional_json(get_opt_string(&row, 5)?.as_deref())?,
                after: parse_optional_json(get_opt_string(&row, 6)?.as_deref())?,
                created_at: parse_datetime(&row.get::<String>(7)?)?,
            });
        }

        Ok(entries)
    }
}

impl AuditSink for EduDb {
    async fn record(&self, record: &AuditRecord) -> Result<(), SinkError> {
        self.append_audit(record)
            .await
            .map(|_| ())
            .map_err(|e| e.into_sink("audit"))
    }
}
