//! Storage capability for bearer tokens.

use crate::domain::entities::{Token, TokenScope};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::TimeDelta;

/// Persistence for scoped tokens.
///
/// Only hashes cross this boundary on the way in. The one exception is
/// [`TokenStorage::new_token`], which returns the plaintext to its caller
/// and nowhere else.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgTokenStorage`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::InMemoryTokenStorage`] - in-process implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/tokens_memory.rs`, `tests/repository_token.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenStorage: Send + Sync {
    /// Generates a token for `user_id`, persists its hash and returns it
    /// with the plaintext.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Entropy`] if randomness is unavailable; the
    /// store is not touched in that case.
    /// Store errors from [`TokenStorage::insert`] are returned unchanged.
    async fn new_token(
        &self,
        user_id: i64,
        ttl: TimeDelta,
        scope: TokenScope,
    ) -> Result<Token, AppError> {
        let token = Token::generate(user_id, ttl, scope)?;
        self.insert(&token).await?;

        tracing::info!(user_id, %scope, expiry = %token.expiry, "Token issued");

        Ok(token)
    }

    /// Persists hash, owner, expiry and scope of `token`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Timeout`] or [`AppError::Persistence`] on store faults.
    async fn insert(&self, token: &Token) -> Result<(), AppError>;

    /// Deletes every token of `scope` owned by `user_id`.
    ///
    /// Returns the number of tokens removed.
    async fn delete_all_for_user(&self, scope: TokenScope, user_id: i64) -> Result<u64, AppError>;

    /// Deletes every token whose expiry has passed, in any scope.
    ///
    /// Returns the number of tokens removed.
    async fn delete_expired(&self) -> Result<u64, AppError>;

    /// Resolves the owner of an unexpired token with the given scope.
    ///
    /// The plaintext is hashed before lookup. Callers are expected to have
    /// checked its shape with
    /// [`validate_token_plaintext`](crate::domain::entities::validate_token_plaintext).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no row matches hash and scope, or
    /// the match has expired.
    async fn get_user_id_for_token(
        &self,
        scope: TokenScope,
        plaintext: &str,
    ) -> Result<i64, AppError>;
}
