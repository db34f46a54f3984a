use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{EntityType, NotificationType};

/// A message the engine asks the notification sink to deliver.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NotificationRequest {
    pub recipient_id: String,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub related_entity_type: EntityType,
    pub related_entity_id: String,
}

/// A stored notification.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Notification {
    pub id: String,
    pub recipient_id: String,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub related_entity_type: EntityType,
    pub related_entity_id: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
