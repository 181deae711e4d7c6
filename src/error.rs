//! Error taxonomy shared by every storage backend and service.

use serde_json::{Value, json};
use std::time::Duration;
use thiserror::Error;

use crate::domain::validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum AppError {
    /// One or more field rules failed. Nothing was written.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("{entity} not found")]
    NotFound { entity: &'static str, details: Value },

    /// The stored version moved on since the caller last read the record.
    #[error("edit conflict on {entity}")]
    EditConflict { entity: &'static str, details: Value },

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("persistence failure: {message}")]
    Persistence {
        message: String,
        #[source]
        source: Option<sqlx::Error>,
    },

    #[error("random source failure: {0}")]
    Entropy(getrandom::Error),
}

impl AppError {
    pub fn not_found(entity: &'static str, details: Value) -> Self {
        Self::NotFound { entity, details }
    }

    pub fn edit_conflict(entity: &'static str, details: Value) -> Self {
        Self::EditConflict { entity, details }
    }

    pub fn timeout(operation: &'static str, after: Duration) -> Self {
        Self::Timeout { operation, after }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
            source: None,
        }
    }

    /// Stable machine-readable code for adapters that translate errors
    /// into transport responses.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::NotFound { .. } => "not_found",
            AppError::EditConflict { .. } => "edit_conflict",
            AppError::Timeout { .. } => "timeout",
            AppError::Persistence { .. } => "persistence_error",
            AppError::Entropy(_) => "entropy_error",
        }
    }

    /// Edit conflicts call for a fresh read, timeouts for a backoff.
    /// Everything else is final.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::EditConflict { .. } | AppError::Timeout { .. })
    }

    /// Field violations, when this is a validation error.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            AppError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(errors)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        map_sqlx_error(e)
    }
}

pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    if matches!(e, sqlx::Error::RowNotFound) {
        return AppError::not_found("record", json!({}));
    }

    let message = match e.as_database_error() {
        Some(db) if db.is_unique_violation() => {
            format!("unique constraint violation on {:?}", db.constraint())
        }
        Some(db) if db.is_check_violation() => {
            format!("check constraint violation on {:?}", db.constraint())
        }
        _ => "database error".to_string(),
    };

    AppError::Persistence {
        message,
        source: Some(e),
    }
}
