//! PostgreSQL implementation of token storage.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::{DEFAULT_QUERY_TIMEOUT, with_timeout};
use crate::domain::entities::{Token, TokenScope, hash_token_plaintext};
use crate::domain::repositories::TokenStorage;
use crate::error::AppError;

/// PostgreSQL storage for bearer tokens.
///
/// Stores SHA-256 hashes only. Raw tokens are never persisted.
pub struct PgTokenStorage {
    pool: Arc<PgPool>,
    timeout: Duration,
}

impl PgTokenStorage {
    /// Creates a storage with the default query timeout.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self::with_timeout(pool, DEFAULT_QUERY_TIMEOUT)
    }

    pub fn with_timeout(pool: Arc<PgPool>, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[async_trait]
impl TokenStorage for PgTokenStorage {
    async fn insert(&self, token: &Token) -> Result<(), AppError> {
        with_timeout(
            "tokens.insert",
            self.timeout,
            sqlx::query(
                r#"
                INSERT INTO tokens (hash, user_id, expiry, scope)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(&token.hash)
            .bind(token.user_id)
            .bind(token.expiry)
            .bind(token.scope.as_str())
            .execute(self.pool.as_ref()),
        )
        .await?;

        debug!(user_id = token.user_id, scope = %token.scope, "Token stored");
        Ok(())
    }

    async fn delete_all_for_user(&self, scope: TokenScope, user_id: i64) -> Result<u64, AppError> {
        let result = with_timeout(
            "tokens.delete_all_for_user",
            self.timeout,
            sqlx::query(
                r#"
                DELETE FROM tokens
                WHERE scope = $1 AND user_id = $2
                "#,
            )
            .bind(scope.as_str())
            .bind(user_id)
            .execute(self.pool.as_ref()),
        )
        .await?;

        let removed = result.rows_affected();
        info!(user_id, %scope, removed, "Tokens revoked");
        Ok(removed)
    }

    async fn delete_expired(&self) -> Result<u64, AppError> {
        let result = with_timeout(
            "tokens.delete_expired",
            self.timeout,
            sqlx::query("DELETE FROM tokens WHERE expiry <= $1")
                .bind(Utc::now())
                .execute(self.pool.as_ref()),
        )
        .await?;

        let removed = result.rows_affected();
        info!(removed, "Expired tokens purged");
        Ok(removed)
    }

    async fn get_user_id_for_token(
        &self,
        scope: TokenScope,
        plaintext: &str,
    ) -> Result<i64, AppError> {
        let hash = hash_token_plaintext(plaintext);

        let user_id = with_timeout(
            "tokens.get_user_id_for_token",
            self.timeout,
            sqlx::query_scalar::<_, i64>(
                r#"
                SELECT user_id
                FROM tokens
                WHERE hash = $1
                  AND scope = $2
                  AND expiry > $3
                "#,
            )
            .bind(&hash)
            .bind(scope.as_str())
            .bind(Utc::now())
            .fetch_optional(self.pool.as_ref()),
        )
        .await?;

        user_id.ok_or_else(|| AppError::not_found("token", json!({ "scope": scope.as_str() })))
    }
}
