//! Repository implementations.
//!
//! Each module adds `impl EduDb` query methods for one table group and the
//! matching collaborator trait from `edu_core::ports`.

pub mod audit;
pub mod entries;
pub mod notifications;
pub mod reference;

pub use audit::AuditFilter;
pub use notifications::NotificationFilter;
pub use reference::ReferenceData;
