//! In-process storage implementations.
//!
//! Same contracts and semantics as the PostgreSQL storages, kept behind a
//! `tokio::sync::RwLock`. Used for fast deterministic tests and local runs
//! without a database.
//!
//! - [`InMemoryMovieStorage`] - movies keyed by id
//! - [`InMemoryTokenStorage`] - token hashes keyed by digest

mod memory_movie_storage;
mod memory_token_storage;

pub use memory_movie_storage::InMemoryMovieStorage;
pub use memory_token_storage::InMemoryTokenStorage;
