mod common;

use chrono::{DateTime, Utc};
use common::{casablanca, genres, seed};
use movie_catalog::domain::entities::{Movie, Runtime};
use movie_catalog::domain::filters::Filters;
use movie_catalog::domain::repositories::MovieStorage;
use movie_catalog::error::AppError;
use movie_catalog::infrastructure::persistence::PgMovieStorage;
use sqlx::PgPool;
use std::sync::Arc;

fn ids(movies: &[Movie]) -> Vec<i64> {
    movies.iter().map(|m| m.id).collect()
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_insert_and_get(pool: PgPool) {
    let storage = PgMovieStorage::new(Arc::new(pool.clone()));
    let mut movie = casablanca();

    let before: DateTime<Utc> = sqlx::query_scalar("SELECT clock_timestamp()")
        .fetch_one(&pool)
        .await
        .unwrap();
    storage.insert(&mut movie).await.unwrap();

    assert!(movie.id > 0);
    assert!(movie.created_at >= before);
    assert_eq!(movie.version, 1);

    let fetched = storage.get(movie.id).await.unwrap();
    assert_eq!(fetched.title, "Casablanca");
    assert_eq!(fetched.year, 1942);
    assert_eq!(fetched.runtime, Runtime(102));
    assert_eq!(fetched.genres, genres(&["drama", "romance"]));
    assert_eq!(fetched.created_at, movie.created_at);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_insert_invalid_movie_writes_nothing(pool: PgPool) {
    let storage = PgMovieStorage::new(Arc::new(pool.clone()));
    let mut movie = Movie::new("Untitled", 2000, Runtime(0), vec![]);

    let result = storage.insert(&mut movie).await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    let count: i64 = sqlx::query_scalar("SELECT count(*) FROM movies")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_get_not_found(pool: PgPool) {
    let storage = PgMovieStorage::new(Arc::new(pool));

    assert!(matches!(storage.get(0).await, Err(AppError::NotFound { .. })));
    assert!(matches!(storage.get(12345).await, Err(AppError::NotFound { .. })));
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_update_checks_version(pool: PgPool) {
    let storage = PgMovieStorage::new(Arc::new(pool));
    let mut movie = casablanca();
    storage.insert(&mut movie).await.unwrap();

    let mut stale = movie.clone();

    movie.runtime = Runtime(103);
    storage.update(&mut movie).await.unwrap();
    assert_eq!(movie.version, 2);

    stale.title = "Stale".to_string();
    let result = storage.update(&mut stale).await;
    assert!(matches!(result, Err(AppError::EditConflict { .. })));

    let stored = storage.get(movie.id).await.unwrap();
    assert_eq!(stored.title, "Casablanca");
    assert_eq!(stored.runtime, Runtime(103));
    assert_eq!(stored.version, 2);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_delete_twice(pool: PgPool) {
    let storage = PgMovieStorage::new(Arc::new(pool));
    let mut movie = casablanca();
    storage.insert(&mut movie).await.unwrap();

    storage.delete(movie.id).await.unwrap();
    assert!(matches!(storage.delete(movie.id).await, Err(AppError::NotFound { .. })));
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_get_all_filters_sorts_and_pages(pool: PgPool) {
    let storage = PgMovieStorage::new(Arc::new(pool));
    let movies = seed(&storage).await;

    let (page, metadata) = storage
        .get_all("", &[], &Filters::new(1, 3, "-year"))
        .await
        .unwrap();
    assert_eq!(
        ids(&page),
        vec![movies[1].id, movies[2].id, movies[4].id]
    );
    assert_eq!(metadata.total_records, 5);
    assert_eq!(metadata.last_page, 2);

    let (page, _) = storage
        .get_all("panther", &genres(&["action"]), &Filters::default())
        .await
        .unwrap();
    assert_eq!(ids(&page), vec![movies[1].id]);

    let (page, metadata) = storage
        .get_all("", &genres(&["western"]), &Filters::default())
        .await
        .unwrap();
    assert!(page.is_empty());
    assert!(metadata.is_empty());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_get_all_title_sort_is_by_code_point(pool: PgPool) {
    let storage = PgMovieStorage::new(Arc::new(pool));
    for title in ["apple", "Banana"] {
        let mut movie = Movie::new(title, 2000, Runtime(90), genres(&["drama"]));
        storage.insert(&mut movie).await.unwrap();
    }

    let (movies, _) = storage
        .get_all("", &[], &Filters::new(1, 20, "title"))
        .await
        .unwrap();

    let titles: Vec<&str> = movies.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, vec!["Banana", "apple"]);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_get_all_rejects_unknown_sort(pool: PgPool) {
    let storage = PgMovieStorage::new(Arc::new(pool));

    let err = storage
        .get_all("", &[], &Filters::new(1, 20, "genres"))
        .await
        .unwrap_err();
    assert_eq!(
        err.validation_errors().unwrap().get("sort"),
        Some("invalid sort value")
    );
}
