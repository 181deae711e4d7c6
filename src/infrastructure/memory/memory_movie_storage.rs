//! In-memory implementation of movie storage.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::domain::entities::Movie;
use crate::domain::filters::{Filters, Metadata, calculate_metadata};
use crate::domain::query::MovieQuery;
use crate::domain::repositories::MovieStorage;
use crate::domain::repositories::movie_storage::{
    ensure_valid_movie, movie_edit_conflict, movie_not_found,
};
use crate::error::AppError;

#[derive(Default)]
struct MovieTable {
    last_id: i64,
    rows: BTreeMap<i64, Movie>,
}

/// Movie storage held in process memory.
///
/// Ids start at 1 and are never reused. The version check in
/// [`MovieStorage::update`] runs under the write lock, so concurrent
/// updates against the same version serialize exactly as they do in
/// PostgreSQL.
#[derive(Default)]
pub struct InMemoryMovieStorage {
    table: RwLock<MovieTable>,
}

impl InMemoryMovieStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored movies.
    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl MovieStorage for InMemoryMovieStorage {
    async fn insert(&self, movie: &mut Movie) -> Result<(), AppError> {
        ensure_valid_movie(movie)?;

        let mut table = self.table.write().await;
        table.last_id += 1;

        movie.id = table.last_id;
        movie.created_at = Utc::now();
        movie.version = 1;
        table.rows.insert(movie.id, movie.clone());

        debug!(movie_id = movie.id, "Movie inserted");
        Ok(())
    }

    async fn get(&self, id: i64) -> Result<Movie, AppError> {
        if id < 1 {
            return Err(movie_not_found(id));
        }

        self.table
            .read()
            .await
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| movie_not_found(id))
    }

    async fn get_all(
        &self,
        title: &str,
        genres: &[String],
        filters: &Filters,
    ) -> Result<(Vec<Movie>, Metadata), AppError> {
        let query = MovieQuery::build(title, genres, filters)?;

        let table = self.table.read().await;
        let mut matched: Vec<&Movie> = table.rows.values().filter(|m| query.matches(m)).collect();
        matched.sort_by(|a, b| query.compare(a, b));

        let total = matched.len() as i64;
        let movies: Vec<Movie> = matched
            .into_iter()
            .skip(usize::try_from(query.offset).unwrap_or(usize::MAX))
            .take(usize::try_from(query.limit).unwrap_or(0))
            .cloned()
            .collect();

        debug!(total, returned = movies.len(), page = query.page, "Movies listed");
        Ok((movies, calculate_metadata(total, query.page, query.page_size)))
    }

    async fn update(&self, movie: &mut Movie) -> Result<(), AppError> {
        ensure_valid_movie(movie)?;
        if movie.id < 1 {
            return Err(movie_not_found(movie.id));
        }

        let mut table = self.table.write().await;
        let Some(stored) = table
            .rows
            .get_mut(&movie.id)
            .filter(|stored| stored.version == movie.version)
        else {
            warn!(
                movie_id = movie.id,
                version = movie.version,
                "Edit conflict on movie update"
            );
            return Err(movie_edit_conflict(movie.id, movie.version));
        };

        movie.version += 1;
        movie.created_at = stored.created_at;
        *stored = movie.clone();

        debug!(movie_id = movie.id, version = movie.version, "Movie updated");
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        if id < 1 {
            return Err(movie_not_found(id));
        }

        self.table
            .write()
            .await
            .rows
            .remove(&id)
            .ok_or_else(|| movie_not_found(id))?;

        debug!(movie_id = id, "Movie deleted");
        Ok(())
    }
}
