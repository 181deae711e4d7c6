//! In-memory implementation of token storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::domain::entities::{Token, TokenScope, hash_token_plaintext};
use crate::domain::repositories::TokenStorage;
use crate::error::AppError;

struct TokenRecord {
    user_id: i64,
    expiry: DateTime<Utc>,
    scope: TokenScope,
}

/// Token storage held in process memory, keyed by SHA-256 digest.
///
/// Like the PostgreSQL storage it never sees a plaintext at rest.
#[derive(Default)]
pub struct InMemoryTokenStorage {
    records: RwLock<HashMap<Vec<u8>, TokenRecord>>,
}

impl InMemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tokens, expired ones included.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl TokenStorage for InMemoryTokenStorage {
    async fn insert(&self, token: &Token) -> Result<(), AppError> {
        let mut records = self.records.write().await;
        if records.contains_key(&token.hash) {
            return Err(AppError::persistence(
                "unique constraint violation on token hash",
            ));
        }

        records.insert(
            token.hash.clone(),
            TokenRecord {
                user_id: token.user_id,
                expiry: token.expiry,
                scope: token.scope,
            },
        );

        debug!(user_id = token.user_id, scope = %token.scope, "Token stored");
        Ok(())
    }

    async fn delete_all_for_user(&self, scope: TokenScope, user_id: i64) -> Result<u64, AppError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, r| !(r.scope == scope && r.user_id == user_id));

        let removed = (before - records.len()) as u64;
        info!(user_id, %scope, removed, "Tokens revoked");
        Ok(removed)
    }

    async fn delete_expired(&self) -> Result<u64, AppError> {
        let now = Utc::now();
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, r| now < r.expiry);

        let removed = (before - records.len()) as u64;
        info!(removed, "Expired tokens purged");
        Ok(removed)
    }

    async fn get_user_id_for_token(
        &self,
        scope: TokenScope,
        plaintext: &str,
    ) -> Result<i64, AppError> {
        let hash = hash_token_plaintext(plaintext);
        let now = Utc::now();

        self.records
            .read()
            .await
            .get(&hash)
            .filter(|r| r.scope == scope && now < r.expiry)
            .map(|r| r.user_id)
            .ok_or_else(|| AppError::not_found("token", json!({ "scope": scope.as_str() })))
    }
}
