//! Scoped bearer tokens.
//!
//! The plaintext is 16 random bytes in unpadded base-32 and is handed out
//! exactly once, by the call that generates it. Storage only ever sees the
//! SHA-256 digest.

use chrono::{DateTime, TimeDelta, Utc};
use data_encoding::BASE32_NOPAD;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::domain::validator::Validator;
use crate::error::AppError;

/// Bytes of entropy behind every token.
pub const TOKEN_ENTROPY_BYTES: usize = 16;

/// Length of the base-32 plaintext for [`TOKEN_ENTROPY_BYTES`].
pub const TOKEN_PLAINTEXT_LEN: usize = 26;

/// What a token may be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenScope {
    Activation,
    Authentication,
}

impl TokenScope {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenScope::Activation => "activation",
            TokenScope::Authentication => "authentication",
        }
    }
}

impl fmt::Display for TokenScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown token scope: {0:?}")]
pub struct UnknownScope(pub String);

impl FromStr for TokenScope {
    type Err = UnknownScope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "activation" => Ok(TokenScope::Activation),
            "authentication" => Ok(TokenScope::Authentication),
            other => Err(UnknownScope(other.to_string())),
        }
    }
}

/// A freshly issued token.
///
/// Only `token` and `expiry` are serialized; `hash`, owner and scope stay
/// server-side.
#[derive(Clone, Serialize)]
pub struct Token {
    #[serde(rename = "token")]
    pub plaintext: String,
    #[serde(skip)]
    pub hash: Vec<u8>,
    #[serde(skip)]
    pub user_id: i64,
    pub expiry: DateTime<Utc>,
    #[serde(skip)]
    pub scope: TokenScope,
}

impl Token {
    /// Draws fresh randomness from the OS and builds a token for `user_id`
    /// that expires `ttl` from now.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] on field `ttl` if the expiry is not
    /// representable, and [`AppError::Entropy`] if the OS random source
    /// fails. Entropy failures are never retried.
    pub fn generate(user_id: i64, ttl: TimeDelta, scope: TokenScope) -> Result<Self, AppError> {
        let expiry = expiry_after(Utc::now(), ttl)?;

        let mut random_bytes = [0u8; TOKEN_ENTROPY_BYTES];
        getrandom::fill(&mut random_bytes).map_err(AppError::Entropy)?;

        let plaintext = BASE32_NOPAD.encode(&random_bytes);
        let hash = hash_token_plaintext(&plaintext);

        Ok(Self {
            plaintext,
            hash,
            user_id,
            expiry,
            scope,
        })
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiry
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("plaintext", &"<redacted>")
            .field("hash", &"<redacted>")
            .field("user_id", &self.user_id)
            .field("expiry", &self.expiry)
            .field("scope", &self.scope)
            .finish()
    }
}

fn expiry_after(now: DateTime<Utc>, ttl: TimeDelta) -> Result<DateTime<Utc>, AppError> {
    now.checked_add_signed(ttl).ok_or_else(|| {
        let mut v = Validator::new();
        v.add_error("ttl", "must be a reasonable duration");
        AppError::Validation(v.errors().clone())
    })
}

/// SHA-256 of the plaintext, the only form that is persisted.
pub fn hash_token_plaintext(plaintext: &str) -> Vec<u8> {
    Sha256::digest(plaintext.as_bytes()).to_vec()
}

pub fn validate_token_plaintext(v: &mut Validator, plaintext: &str) {
    v.check(!plaintext.is_empty(), "token", "must be provided");
    v.check(
        plaintext.len() == TOKEN_PLAINTEXT_LEN,
        "token",
        "must be 26 bytes long",
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_plaintext_shape() {
        let token = Token::generate(7, TimeDelta::hours(1), TokenScope::Authentication).unwrap();

        assert_eq!(token.plaintext.len(), TOKEN_PLAINTEXT_LEN);
        assert!(
            token
                .plaintext
                .chars()
                .all(|c| c.is_ascii_uppercase() || ('2'..='7').contains(&c))
        );
        assert!(!token.plaintext.contains('='));
        assert_eq!(token.user_id, 7);
        assert_eq!(token.scope, TokenScope::Authentication);
    }

    #[test]
    fn test_generate_hash_matches_plaintext() {
        let token = Token::generate(1, TimeDelta::minutes(5), TokenScope::Activation).unwrap();
        assert_eq!(token.hash.len(), 32);
        assert_eq!(token.hash, hash_token_plaintext(&token.plaintext));
    }

    #[test]
    fn test_generate_sets_expiry_from_ttl() {
        let before = Utc::now();
        let token = Token::generate(1, TimeDelta::hours(1), TokenScope::Activation).unwrap();
        let after = Utc::now();

        assert!(token.expiry >= before + TimeDelta::hours(1));
        assert!(token.expiry <= after + TimeDelta::hours(1));
        assert!(!token.is_expired_at(after));
        assert!(token.is_expired_at(token.expiry));
    }

    #[test]
    fn test_generate_rejects_unrepresentable_ttl() {
        for ttl in [TimeDelta::MAX, TimeDelta::MIN] {
            let err = Token::generate(7, ttl, TokenScope::Authentication).unwrap_err();
            let errors = err.validation_errors().unwrap();
            assert_eq!(errors.get("ttl"), Some("must be a reasonable duration"));
        }
    }

    #[test]
    fn test_generated_tokens_are_independent() {
        let plaintexts: HashSet<String> = (0..64)
            .map(|_| {
                Token::generate(1, TimeDelta::hours(1), TokenScope::Authentication)
                    .unwrap()
                    .plaintext
            })
            .collect();
        assert_eq!(plaintexts.len(), 64);
    }

    #[test]
    fn test_hash_is_sha256() {
        let digest = hash_token_plaintext("abc");
        assert_eq!(
            digest[..4],
            [0xba, 0x78, 0x16, 0xbf],
            "SHA-256(\"abc\") starts with ba7816bf"
        );
    }

    #[test]
    fn test_validate_token_plaintext() {
        let mut v = Validator::new();
        validate_token_plaintext(&mut v, "ABCDEFGHIJKLMNOPQRSTUVWXYZ");
        assert!(v.valid());

        let mut v = Validator::new();
        validate_token_plaintext(&mut v, "");
        assert_eq!(v.errors().get("token"), Some("must be provided"));

        let mut v = Validator::new();
        validate_token_plaintext(&mut v, "TOOSHORT");
        assert_eq!(v.errors().get("token"), Some("must be 26 bytes long"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let token = Token::generate(9, TimeDelta::hours(1), TokenScope::Authentication).unwrap();
        let rendered = format!("{token:?}");

        assert!(!rendered.contains(&token.plaintext));
        assert!(rendered.contains("<redacted>"));
        assert!(rendered.contains("user_id: 9"));
    }

    #[test]
    fn test_serializes_only_token_and_expiry() {
        let token = Token::generate(9, TimeDelta::hours(1), TokenScope::Authentication).unwrap();
        let json = serde_json::to_value(&token).unwrap();
        let object = json.as_object().unwrap();

        assert_eq!(object.len(), 2);
        assert_eq!(object["token"], token.plaintext.as_str());
        assert!(object.contains_key("expiry"));
    }

    #[test]
    fn test_scope_round_trip() {
        for scope in [TokenScope::Activation, TokenScope::Authentication] {
            assert_eq!(scope.as_str().parse::<TokenScope>().unwrap(), scope);
        }
        assert!("password-reset".parse::<TokenScope>().is_err());
    }
}
