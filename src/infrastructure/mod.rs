//! Infrastructure layer for external integrations.
//!
//! This layer implements the storage traits defined by the domain layer.
//!
//! # Modules
//!
//! - [`persistence`] - PostgreSQL implementations
//! - [`memory`] - in-process implementations with identical semantics

pub mod memory;
pub mod persistence;
