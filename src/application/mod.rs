//! Application layer on top of the storage traits.
//!
//! Services take an `Arc` of a storage trait object (or a concrete backend
//! in tests) and add the behavior that spans several storage calls.
//!
//! # Available Services
//!
//! - [`services::movie_service::MovieService`] - movie CRUD and conflict-retrying updates
//! - [`services::auth_service::AuthService`] - token issuance, authentication and revocation

pub mod services;
