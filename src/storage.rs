//! The pair of storage capabilities handed to adapters.

use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::repositories::{MovieStorage, TokenStorage};
use crate::infrastructure::memory::{InMemoryMovieStorage, InMemoryTokenStorage};
use crate::infrastructure::persistence::{PgMovieStorage, PgTokenStorage};

/// Movie and token storage behind trait objects.
///
/// Adapters receive this value and never learn which backend is in use.
#[derive(Clone)]
pub struct Storage {
    pub movies: Arc<dyn MovieStorage>,
    pub tokens: Arc<dyn TokenStorage>,
}

impl Storage {
    /// PostgreSQL-backed storage; every round-trip is bounded by `timeout`.
    pub fn postgres(pool: Arc<PgPool>, timeout: Duration) -> Self {
        Self {
            movies: Arc::new(PgMovieStorage::with_timeout(pool.clone(), timeout)),
            tokens: Arc::new(PgTokenStorage::with_timeout(pool, timeout)),
        }
    }

    /// Fresh, empty in-process storage.
    pub fn in_memory() -> Self {
        Self {
            movies: Arc::new(InMemoryMovieStorage::new()),
            tokens: Arc::new(InMemoryTokenStorage::new()),
        }
    }
}
