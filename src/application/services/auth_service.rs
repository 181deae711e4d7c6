//! Bearer token issuance and authentication.

use chrono::TimeDelta;
use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::entities::{Token, TokenScope, validate_token_plaintext};
use crate::domain::repositories::TokenStorage;
use crate::domain::validator::Validator;
use crate::error::AppError;

/// Issues, resolves and revokes scoped tokens.
///
/// Plaintext is shape-checked before any store round-trip, so malformed
/// input surfaces as [`AppError::Validation`] rather than a lookup miss.
pub struct AuthService<T: TokenStorage + ?Sized> {
    tokens: Arc<T>,
    activation_ttl: TimeDelta,
    authentication_ttl: TimeDelta,
}

impl<T: TokenStorage + ?Sized> AuthService<T> {
    /// Creates a new authentication service.
    ///
    /// # Arguments
    ///
    /// - `tokens` - token storage
    /// - `activation_ttl` - lifetime of activation tokens
    /// - `authentication_ttl` - lifetime of authentication tokens
    pub fn new(tokens: Arc<T>, activation_ttl: TimeDelta, authentication_ttl: TimeDelta) -> Self {
        Self {
            tokens,
            activation_ttl,
            authentication_ttl,
        }
    }

    /// Resolves the user behind an authentication token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the plaintext is malformed and
    /// [`AppError::NotFound`] if it is unknown, expired or of another scope.
    pub async fn authenticate(&self, plaintext: &str) -> Result<i64, AppError> {
        check_plaintext(plaintext)?;

        let user_id = self
            .tokens
            .get_user_id_for_token(TokenScope::Authentication, plaintext)
            .await?;

        debug!(user_id, "Token authenticated");
        Ok(user_id)
    }

    pub async fn issue_authentication_token(&self, user_id: i64) -> Result<Token, AppError> {
        self.tokens
            .new_token(user_id, self.authentication_ttl, TokenScope::Authentication)
            .await
    }

    pub async fn issue_activation_token(&self, user_id: i64) -> Result<Token, AppError> {
        self.tokens
            .new_token(user_id, self.activation_ttl, TokenScope::Activation)
            .await
    }

    /// Consumes an activation token: resolves its owner and deletes every
    /// activation token that owner holds.
    pub async fn redeem_activation_token(&self, plaintext: &str) -> Result<i64, AppError> {
        check_plaintext(plaintext)?;

        let user_id = self
            .tokens
            .get_user_id_for_token(TokenScope::Activation, plaintext)
            .await?;
        self.tokens
            .delete_all_for_user(TokenScope::Activation, user_id)
            .await?;

        info!(user_id, "Activation token redeemed");
        Ok(user_id)
    }

    pub async fn revoke_all(&self, user_id: i64, scope: TokenScope) -> Result<u64, AppError> {
        self.tokens.delete_all_for_user(scope, user_id).await
    }

    /// Drops expired tokens of every scope and user.
    pub async fn purge_expired(&self) -> Result<u64, AppError> {
        self.tokens.delete_expired().await
    }
}

fn check_plaintext(plaintext: &str) -> Result<(), AppError> {
    let mut v = Validator::new();
    validate_token_plaintext(&mut v, plaintext);
    v.into_result()
}
