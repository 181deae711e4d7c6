//! PostgreSQL implementation of movie storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::{DEFAULT_QUERY_TIMEOUT, with_timeout};
use crate::domain::entities::{Movie, Runtime};
use crate::domain::filters::{Filters, Metadata, calculate_metadata};
use crate::domain::query::{MovieColumn, MovieQuery};
use crate::domain::repositories::MovieStorage;
use crate::domain::repositories::movie_storage::{
    ensure_valid_movie, movie_edit_conflict, movie_not_found,
};
use crate::error::AppError;

const MOVIE_COLUMNS: &str = "id, created_at, title, year, runtime, genres, version";

const MATCH_CLAUSE: &str = "strpos(lower(title), lower($1)) > 0 AND genres @> $2";

#[derive(sqlx::FromRow)]
struct MovieRow {
    id: i64,
    created_at: DateTime<Utc>,
    title: String,
    year: i32,
    runtime: i32,
    genres: Vec<String>,
    version: i32,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        Movie {
            id: row.id,
            created_at: row.created_at,
            title: row.title,
            year: row.year,
            runtime: Runtime(row.runtime),
            genres: row.genres,
            version: row.version,
        }
    }
}

/// PostgreSQL storage for movies.
///
/// Updates use the `version` column as an optimistic lock: the write is
/// conditional on the version the caller read, and bumps it in the same
/// statement.
pub struct PgMovieStorage {
    pool: Arc<PgPool>,
    timeout: Duration,
}

impl PgMovieStorage {
    /// Creates a storage with the default query timeout.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self::with_timeout(pool, DEFAULT_QUERY_TIMEOUT)
    }

    pub fn with_timeout(pool: Arc<PgPool>, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    fn page_sql(query: &MovieQuery) -> String {
        format!(
            "SELECT {MOVIE_COLUMNS} FROM movies WHERE {MATCH_CLAUSE} \
             ORDER BY {} {}, id ASC \
             LIMIT $3 OFFSET $4",
            order_expr(query.sort_column),
            query.sort_direction.as_sql(),
        )
    }
}

/// Titles order by code point, independent of the database collation.
fn order_expr(column: MovieColumn) -> &'static str {
    match column {
        MovieColumn::Title => r#"title COLLATE "C""#,
        other => other.as_sql(),
    }
}

#[async_trait]
impl MovieStorage for PgMovieStorage {
    async fn insert(&self, movie: &mut Movie) -> Result<(), AppError> {
        ensure_valid_movie(movie)?;

        let (id, created_at, version) = with_timeout(
            "movies.insert",
            self.timeout,
            sqlx::query_as::<_, (i64, DateTime<Utc>, i32)>(
                r#"
                INSERT INTO movies (title, year, runtime, genres)
                VALUES ($1, $2, $3, $4)
                RETURNING id, created_at, version
                "#,
            )
            .bind(&movie.title)
            .bind(movie.year)
            .bind(movie.runtime.minutes())
            .bind(&movie.genres)
            .fetch_one(self.pool.as_ref()),
        )
        .await?;

        movie.id = id;
        movie.created_at = created_at;
        movie.version = version;

        debug!(movie_id = id, "Movie inserted");
        Ok(())
    }

    async fn get(&self, id: i64) -> Result<Movie, AppError> {
        if id < 1 {
            return Err(movie_not_found(id));
        }

        let sql = format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE id = $1");
        let row = with_timeout(
            "movies.get",
            self.timeout,
            sqlx::query_as::<_, MovieRow>(&sql)
                .bind(id)
                .fetch_optional(self.pool.as_ref()),
        )
        .await?;

        row.map(Movie::from).ok_or_else(|| movie_not_found(id))
    }

    async fn get_all(
        &self,
        title: &str,
        genres: &[String],
        filters: &Filters,
    ) -> Result<(Vec<Movie>, Metadata), AppError> {
        let query = MovieQuery::build(title, genres, filters)?;
        let page_sql = Self::page_sql(&query);
        let count_sql = format!("SELECT count(*) FROM movies WHERE {MATCH_CLAUSE}");

        let (total, rows) = with_timeout("movies.get_all", self.timeout, async {
            let mut tx = self.pool.begin().await?;
            sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
                .execute(&mut *tx)
                .await?;

            let total: i64 = sqlx::query_scalar(&count_sql)
                .bind(&query.title)
                .bind(&query.genres)
                .fetch_one(&mut *tx)
                .await?;

            let rows: Vec<MovieRow> = sqlx::query_as(&page_sql)
                .bind(&query.title)
                .bind(&query.genres)
                .bind(query.limit)
                .bind(query.offset)
                .fetch_all(&mut *tx)
                .await?;

            tx.commit().await?;
            Ok::<_, sqlx::Error>((total, rows))
        })
        .await?;

        debug!(total, returned = rows.len(), page = query.page, "Movies listed");

        let movies = rows.into_iter().map(Movie::from).collect();
        Ok((movies, calculate_metadata(total, query.page, query.page_size)))
    }

    async fn update(&self, movie: &mut Movie) -> Result<(), AppError> {
        ensure_valid_movie(movie)?;
        if movie.id < 1 {
            return Err(movie_not_found(movie.id));
        }

        let new_version = with_timeout(
            "movies.update",
            self.timeout,
            sqlx::query_scalar::<_, i32>(
                r#"
                UPDATE movies
                SET title = $1, year = $2, runtime = $3, genres = $4, version = version + 1
                WHERE id = $5 AND version = $6
                RETURNING version
                "#,
            )
            .bind(&movie.title)
            .bind(movie.year)
            .bind(movie.runtime.minutes())
            .bind(&movie.genres)
            .bind(movie.id)
            .bind(movie.version)
            .fetch_optional(self.pool.as_ref()),
        )
        .await?;

        match new_version {
            Some(version) => {
                movie.version = version;
                debug!(movie_id = movie.id, version, "Movie updated");
                Ok(())
            }
            None => {
                warn!(
                    movie_id = movie.id,
                    version = movie.version,
                    "Edit conflict on movie update"
                );
                Err(movie_edit_conflict(movie.id, movie.version))
            }
        }
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        if id < 1 {
            return Err(movie_not_found(id));
        }

        let result = with_timeout(
            "movies.delete",
            self.timeout,
            sqlx::query("DELETE FROM movies WHERE id = $1")
                .bind(id)
                .execute(self.pool.as_ref()),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(movie_not_found(id));
        }

        debug!(movie_id = id, "Movie deleted");
        Ok(())
    }
}
