//! Core domain entities.
//!
//! - [`Movie`] - a catalog record with store-owned identity and version
//! - [`Token`] - a scoped, expiring bearer credential
//!
//! Field rules live next to each entity ([`validate_movie`],
//! [`validate_token_plaintext`]) and report into a shared
//! [`Validator`](crate::domain::validator::Validator).

pub mod movie;
pub mod token;

pub use movie::{Movie, Runtime, validate_movie};
pub use token::{Token, TokenScope, hash_token_plaintext, validate_token_plaintext};
