//! Storage capability for movies.

use crate::domain::entities::{Movie, validate_movie};
use crate::domain::filters::{Filters, Metadata};
use crate::domain::validator::Validator;
use crate::error::AppError;
use async_trait::async_trait;
use serde_json::json;

/// Everything a movie backend must provide.
///
/// Callers depend on this trait only, so a PostgreSQL store, the in-memory
/// store and a scripted mock are interchangeable.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgMovieStorage`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::InMemoryMovieStorage`] - in-process implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/storage_memory.rs`, `tests/repository_movie.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MovieStorage: Send + Sync {
    /// Persists a new movie.
    ///
    /// On success `id`, `created_at` and `version` (always 1) are written
    /// back into `movie`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] before touching the store if any
    /// field rule fails.
    /// Returns [`AppError::Timeout`] or [`AppError::Persistence`] on store faults.
    async fn insert(&self, movie: &mut Movie) -> Result<(), AppError>;

    /// Fetches a movie by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if `id < 1` or no row has that id.
    async fn get(&self, id: i64) -> Result<Movie, AppError>;

    /// Lists one page of movies matching `title` and `genres`.
    ///
    /// The metadata is computed from the full match count observed in the
    /// same snapshot as the page itself.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `filters` are out of bounds or
    /// name an unknown sort key.
    async fn get_all(
        &self,
        title: &str,
        genres: &[String],
        filters: &Filters,
    ) -> Result<(Vec<Movie>, Metadata), AppError>;

    /// Writes `movie` back if its `version` is still the stored one.
    ///
    /// The version check and the increment happen in one store operation;
    /// on success `movie.version` holds the new value.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if any field rule fails.
    /// Returns [`AppError::EditConflict`] if the stored version has moved
    /// on or the row is gone. Re-read and retry.
    async fn update(&self, movie: &mut Movie) -> Result<(), AppError>;

    /// Removes a movie.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if `id < 1` or nothing was deleted.
    /// Deleting twice is an error the second time.
    async fn delete(&self, id: i64) -> Result<(), AppError>;
}

/// Runs the field rules and fails with every violation found.
pub(crate) fn ensure_valid_movie(movie: &Movie) -> Result<(), AppError> {
    let mut v = Validator::new();
    validate_movie(&mut v, movie);
    v.into_result()
}

pub(crate) fn movie_not_found(id: i64) -> AppError {
    AppError::not_found("movie", json!({ "id": id }))
}

pub(crate) fn movie_edit_conflict(id: i64, version: i32) -> AppError {
    AppError::edit_conflict("movie", json!({ "id": id, "version": version }))
}
