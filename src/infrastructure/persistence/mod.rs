//! PostgreSQL storage implementations.
//!
//! Backed by SQLx with runtime-checked, parameterized statements. Every
//! round-trip is bounded by the storage's query timeout.
//!
//! # Storages
//!
//! - [`PgMovieStorage`] - movie CRUD, filtered listing, versioned updates
//! - [`PgTokenStorage`] - token hash storage and lookup

pub mod pg_movie_storage;
pub mod pg_token_storage;

pub use pg_movie_storage::PgMovieStorage;
pub use pg_token_storage::PgTokenStorage;

use std::future::Future;
use std::time::Duration;

use crate::error::AppError;

/// Default bound on a single store round-trip.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(3);

/// Awaits `fut` for at most `after`.
///
/// Expiry becomes [`AppError::Timeout`]; database errors go through
/// [`crate::error::map_sqlx_error`].
pub(crate) async fn with_timeout<T, F>(
    operation: &'static str,
    after: Duration,
    fut: F,
) -> Result<T, AppError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(after, fut).await {
        Ok(result) => result.map_err(AppError::from),
        Err(_) => {
            tracing::warn!(operation, ?after, "Store round-trip timed out");
            Err(AppError::timeout(operation, after))
        }
    }
}
