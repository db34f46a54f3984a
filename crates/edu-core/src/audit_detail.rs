//! Typed audit payloads.
//!
//! Each audit action carries structured `before`/`after` JSON blobs. These
//! types fix the shape of the most common ones.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Payload for `AuditAction::StatusChanged` and `AuditAction::Reopened`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StatusChangedDetail {
    pub from: String,
    pub to: String,
    pub reason: Option<String>,
}

/// Payload for the proxy actions.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ProxyDetail {
    pub school_id: String,
    pub category_id: String,
    pub original_entity: String,
    pub reason: String,
    pub affected_count: u32,
    pub auto_approved: bool,
}
