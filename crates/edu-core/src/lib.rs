//! # edu-core
//!
//! Core types and collaborator contracts for the school data approval engine.
//!
//! This crate provides the foundational types shared across all workspace crates:
//! - Entity structs (entries, columns, categories, schools, actors, audit, notifications)
//! - Status and role enums, including the entry approval state graph
//! - Collaborator traits (`ports`) the engine calls and storage implements
//! - Entry filters and patch builders used at the storage boundary
//! - Structured results returned by the caller-facing API
//! - ID prefix constants and actor-id well-formedness checks
//! - Storage and sink error types

pub mod audit_detail;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod ports;
pub mod responses;
pub mod updates;
