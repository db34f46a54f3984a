//! Entity structs for all domain objects.
//!
//! Each entity maps to a table in the libSQL database (see `edu-db/migrations`).
//! All structs derive `Serialize`, `Deserialize`, and `JsonSchema` for JSON roundtrip
//! and schema validation.

mod actor;
mod audit;
mod category;
mod column;
mod entry;
mod hierarchy;
mod notification;

pub use actor::Actor;
pub use audit::{AuditLogEntry, AuditRecord};
pub use category::Category;
pub use column::{Column, ValidationRules};
pub use entry::{Entry, NaturalKey};
pub use hierarchy::{OrgTarget, Region, School, Sector};
pub use notification::{Notification, NotificationRequest};
