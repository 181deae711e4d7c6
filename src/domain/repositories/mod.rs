//! Storage capability traits for the domain layer.
//!
//! These traits are the only thing upper layers see of persistence. Concrete
//! backends live in `crate::infrastructure`.
//!
//! # Architecture
//!
//! - Traits define the contract for data operations
//! - PostgreSQL implementations live in `crate::infrastructure::persistence`
//! - In-process implementations live in `crate::infrastructure::memory`
//! - Mock implementations are auto-generated via `mockall` for testing
//!
//! # Available Capabilities
//!
//! - [`MovieStorage`] - movie CRUD and filtered listing
//! - [`TokenStorage`] - scoped bearer token issuance and invalidation

pub mod movie_storage;
pub mod token_storage;

pub use movie_storage::MovieStorage;
pub use token_storage::TokenStorage;

#[cfg(test)]
pub use movie_storage::MockMovieStorage;
#[cfg(test)]
pub use token_storage::MockTokenStorage;
