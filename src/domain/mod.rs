//! Domain layer: entities, rules and storage contracts.
//!
//! Nothing in here performs I/O. The layer defines what a valid movie or
//! token is, how a listing request becomes a bounded plan, and which
//! operations a storage backend must offer.
//!
//! # Architecture
//!
//! - [`validator`] - field-level violation accumulator
//! - [`entities`] - [`entities::Movie`] and [`entities::Token`] with their rules
//! - [`filters`] - paging/sorting input and pagination metadata
//! - [`query`] - resolved listing plan shared by all backends
//! - [`repositories`] - storage capability traits

pub mod entities;
pub mod filters;
pub mod query;
pub mod repositories;
pub mod validator;
