//! Movie operations for adapters.

use std::sync::Arc;
use std::time::Duration;
use tokio_retry::RetryIf;
use tokio_retry::strategy::FixedInterval;
use tracing::{debug, warn};

use crate::domain::entities::Movie;
use crate::domain::filters::{Filters, Metadata};
use crate::domain::repositories::MovieStorage;
use crate::error::AppError;

const DEFAULT_MAX_RETRIES: usize = 3;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(10);

/// Front door to [`MovieStorage`].
///
/// Plain [`MovieService::update`] surfaces an edit conflict to the caller.
/// [`MovieService::update_with`] instead re-reads and re-applies the
/// change a bounded number of times.
pub struct MovieService<S: MovieStorage + ?Sized> {
    storage: Arc<S>,
    max_retries: usize,
    retry_delay: Duration,
}

impl<S: MovieStorage + ?Sized> MovieService<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Overrides how often and how quickly [`Self::update_with`] retries.
    pub fn with_retry_policy(mut self, max_retries: usize, retry_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay = retry_delay;
        self
    }

    /// Inserts a new movie and returns it with id, timestamp and version set.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if any field rule fails.
    pub async fn create(&self, mut movie: Movie) -> Result<Movie, AppError> {
        self.storage.insert(&mut movie).await?;
        debug!(movie_id = movie.id, "Movie created");
        Ok(movie)
    }

    pub async fn show(&self, id: i64) -> Result<Movie, AppError> {
        self.storage.get(id).await
    }

    pub async fn list(
        &self,
        title: &str,
        genres: &[String],
        filters: &Filters,
    ) -> Result<(Vec<Movie>, Metadata), AppError> {
        self.storage.get_all(title, genres, filters).await
    }

    /// Writes `movie` back if nobody else changed it since it was read.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::EditConflict`] if the stored version moved on.
    pub async fn update(&self, mut movie: Movie) -> Result<Movie, AppError> {
        self.storage.update(&mut movie).await?;
        Ok(movie)
    }

    /// Reads movie `id`, applies `apply` and writes it back, starting over
    /// from a fresh read on edit conflict.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::EditConflict`] once the retries are exhausted.
    /// Any other error ends the attempt immediately.
    pub async fn update_with<F>(&self, id: i64, apply: F) -> Result<Movie, AppError>
    where
        F: Fn(&mut Movie) + Send + Sync,
    {
        let storage = &self.storage;
        let apply = &apply;
        let strategy = FixedInterval::new(self.retry_delay).take(self.max_retries);

        let action = move || async move {
            let mut movie = storage.get(id).await?;
            apply(&mut movie);
            storage.update(&mut movie).await?;
            Ok::<_, AppError>(movie)
        };

        let on_conflict = |e: &AppError| {
            let conflict = matches!(e, AppError::EditConflict { .. });
            if conflict {
                warn!(movie_id = id, "Edit conflict, retrying from a fresh read");
            }
            conflict
        };

        RetryIf::spawn(strategy, action, on_conflict).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.storage.delete(id).await?;
        debug!(movie_id = id, "Movie deleted");
        Ok(())
    }
}
