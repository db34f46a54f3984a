//! Notification inbox repository.

use chrono::Utc;
use edu_core::entities::{Notification, NotificationRequest};
use edu_core::errors::SinkError;
use edu_core::ids::PREFIX_NOTIFICATION;
use edu_core::ports::NotificationSink;

use crate::EduDb;
use crate::error::DatabaseError;
use crate::helpers::{parse_datetime, parse_enum};

/// Filter criteria for inbox queries.
#[derive(Debug, Default)]
pub struct NotificationFilter {
    pub recipient_id: Option<String>,
    pub unread_only: bool,
    pub limit: Option<u32>,
}

impl EduDb {
    /// Store a notification. Returns the generated id.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn append_notification(
        &self,
        request: &NotificationRequest,
    ) -> Result<String, DatabaseError> {
        let id = self.generate_id(PREFIX_NOTIFICATION).await?;
        self.conn
            .execute(
                "INSERT INTO notifications
                    (id, recipient_id, notification_type, title, message,
                     related_entity_type, related_entity_id, is_read, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8)",
                libsql::params![
                    id.as_str(),
                    request.recipient_id.as_str(),
                    request.notification_type.as_str(),
                    request.title.as_str(),
                    request.message.as_str(),
                    request.related_entity_type.as_str(),
                    request.related_entity_id.as_str(),
                    Utc::now().to_rfc3339()
                ],
            )
            .await?;
        Ok(id)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_notifications(
        &self,
        filter: &NotificationFilter,
    ) -> Result<Vec<Notification>, DatabaseError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(ref recipient) = filter.recipient_id {
            params.push(libsql::Value::Text(recipient.clone()));
            conditions.push(format!("recipient_id = ?{}", params.len()));
        }
        if filter.unread_only {
            conditions.push("is_read = 0".to_string());
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let limit = filter.limit.unwrap_or(100);
        let sql = format!(
            "SELECT id, recipient_id, notification_type, title, message,
                    related_entity_type, related_entity_id, is_read, created_at
             FROM notifications {where_clause}
             ORDER BY created_at DESC, rowid DESC LIMIT {limit}"
        );

        let mut rows = self
            .conn
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut notifications = Vec::new();
        while let Some(row) = rows.next().await? {
            notifications.push(Notification {
                id: row.get::<String>(0)?,
                recipient_id: row.get::<String>(1)?,
                notification_type: parse_enum(&row.get::<String>(2)?)?,
                title: row.get::<String>(3)?,
                message: row.get::<String>(4)?,
                related_entity_type: parse_enum(&row.get::<String>(5)?)?,
                related_entity_id: row.get::<String>(6)?,
                is_read: row.get::<i64>(7)? != 0,
                created_at: parse_datetime(&row.get::<String>(8)?)?,
            });
        }
        Ok(notifications)
    }

    /// Mark one notification read. Returns `false` if the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the UPDATE fails.
    pub async fn mark_notification_read(&self, id: &str) -> Result<bool, DatabaseError> {
        let changed = self
            .conn
            .execute("UPDATE notifications SET is_read = 1 WHERE id = ?1", [id])
            .await?;
        Ok(changed > 0)
    }
}

impl NotificationSink for EduDb {
    async fn notify(&self, request: &NotificationRequest) -> Result<(), SinkError> {
        self.append_notification(request)
            .await
            .map(|_| ())
            .map_err(|e| e.into_sink("notification"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::seeded_db;
    use edu_core::enums::{EntityType, NotificationType};
    use pretty_assertions::assert_eq;

    fn request(recipient: &str) -> NotificationRequest {
        NotificationRequest {
            recipient_id: recipient.into(),
            notification_type: NotificationType::EntryApproved,
            title: "Entry approved".into(),
            message: "teacherCount was approved".into(),
            related_entity_type: EntityType::DataEntry,
            related_entity_id: "ent-00000001".into(),
        }
    }

    #[tokio::test]
    async fn inbox_lists_by_recipient() {
        let db = seeded_db().await;
        db.notify(&request("usr-0000000a")).await.unwrap();
        db.notify(&request("usr-0000000b")).await.unwrap();

        let filter = NotificationFilter {
            recipient_id: Some("usr-0000000a".into()),
            ..NotificationFilter::default()
        };
        let inbox = db.list_notifications(&filter).await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].notification_type, NotificationType::EntryApproved);
        assert!(!inbox[0].is_read);
    }

    #[tokio::test]
    async fn mark_read_hides_from_unread_view() {
        let db = seeded_db().await;
        let id = db.append_notification(&request("usr-0000000a")).await.unwrap();
        assert!(db.mark_notification_read(&id).await.unwrap());
        assert!(!db.mark_notification_read("ntf-ffffffff").await.unwrap());

        let unread = NotificationFilter {
            unread_only: true,
            ..NotificationFilter::default()
        };
        assert!(db.list_notifications(&unread).await.unwrap().is_empty());
        let all = db.list_notifications(&NotificationFilter::default()).await.unwrap();
        assert!(all[0].is_read);
    }
}
