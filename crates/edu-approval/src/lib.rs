//! # edu-approval
//!
//! Hierarchical approval and proxy-submission engine for school data entries.
//!
//! Components, bottom-up:
//! - [`validation`]: per-column field validation, including sector-scoped uniqueness
//! - [`permissions`]: the `(role, capability)` permission matrix and scope rule
//! - [`state_machine`]: audited status transitions and the superadmin reopen
//! - [`writer`]: idempotent form saves and bulk submission
//! - [`proxy`]: saves and submissions on behalf of a school, with provenance
//! - [`effects`]: audit and notification effects flushed after each write
//! - [`service`]: [`ApprovalService`], the caller-facing API
//!
//! Storage, reference data, and sinks are injected through the traits in
//! `edu_core::ports`.

pub mod effects;
pub mod error;
pub mod permissions;
pub mod proxy;
pub mod service;
pub mod state_machine;
pub mod validation;
pub mod writer;

#[cfg(test)]
mod test_support;

pub use error::ApprovalError;
pub use proxy::ProxyOptions;
pub use service::ApprovalService;
pub use writer::SaveOptions;
