use chrono::TimeDelta;
use movie_catalog::domain::entities::{TokenScope, hash_token_plaintext};
use movie_catalog::domain::repositories::TokenStorage;
use movie_catalog::error::AppError;
use movie_catalog::infrastructure::persistence::PgTokenStorage;
use sqlx::PgPool;
use std::sync::Arc;

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_new_token_stores_hash_only(pool: PgPool) {
    let storage = PgTokenStorage::new(Arc::new(pool.clone()));

    let token = storage
        .new_token(7, TimeDelta::hours(1), TokenScope::Authentication)
        .await
        .unwrap();

    let stored: Vec<u8> = sqlx::query_scalar("SELECT hash FROM tokens WHERE user_id = $1")
        .bind(7_i64)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stored, hash_token_plaintext(&token.plaintext));

    let user_id = storage
        .get_user_id_for_token(TokenScope::Authentication, &token.plaintext)
        .await
        .unwrap();
    assert_eq!(user_id, 7);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_expired_and_wrong_scope_are_rejected(pool: PgPool) {
    let storage = PgTokenStorage::new(Arc::new(pool));

    let expired = storage
        .new_token(7, TimeDelta::seconds(-1), TokenScope::Authentication)
        .await
        .unwrap();
    let result = storage
        .get_user_id_for_token(TokenScope::Authentication, &expired.plaintext)
        .await;
    assert!(matches!(result, Err(AppError::NotFound { .. })));

    let activation = storage
        .new_token(7, TimeDelta::hours(1), TokenScope::Activation)
        .await
        .unwrap();
    let result = storage
        .get_user_id_for_token(TokenScope::Authentication, &activation.plaintext)
        .await;
    assert!(matches!(result, Err(AppError::NotFound { .. })));
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_delete_expired(pool: PgPool) {
    let storage = PgTokenStorage::new(Arc::new(pool.clone()));

    storage
        .new_token(7, TimeDelta::seconds(-1), TokenScope::Authentication)
        .await
        .unwrap();
    let live = storage
        .new_token(7, TimeDelta::hours(1), TokenScope::Authentication)
        .await
        .unwrap();

    assert_eq!(storage.delete_expired().await.unwrap(), 1);

    let remaining: i64 = sqlx::query_scalar("SELECT count(*) FROM tokens")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 1);

    let owner = storage
        .get_user_id_for_token(TokenScope::Authentication, &live.plaintext)
        .await
        .unwrap();
    assert_eq!(owner, 7);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_delete_all_for_user(pool: PgPool) {
    let storage = PgTokenStorage::new(Arc::new(pool));
    let ttl = TimeDelta::hours(1);

    let token = storage.new_token(7, ttl, TokenScope::Authentication).await.unwrap();
    storage.new_token(7, ttl, TokenScope::Authentication).await.unwrap();
    let kept = storage.new_token(7, ttl, TokenScope::Activation).await.unwrap();

    let removed = storage
        .delete_all_for_user(TokenScope::Authentication, 7)
        .await
        .unwrap();
    assert_eq!(removed, 2);

    let result = storage
        .get_user_id_for_token(TokenScope::Authentication, &token.plaintext)
        .await;
    assert!(matches!(result, Err(AppError::NotFound { .. })));

    let owner = storage
        .get_user_id_for_token(TokenScope::Activation, &kept.plaintext)
        .await
        .unwrap();
    assert_eq!(owner, 7);
}
