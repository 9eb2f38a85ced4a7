//! Unified error types for Shard Router Core.

use serde::Serialize;
use shard_router_types::{ConfigError, RouterError, TypedError};
use thiserror::Error;

/// Main error type for router operations that touch I/O.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AppError {
    /// Database operation failed (sqlx).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// File system I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Routing, extraction or rewrite failed.
    #[error("Routing error: {0}")]
    Router(#[from] RouterError),

    /// Configuration loading or validation failed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A pool was requested outside a Tokio runtime.
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl From<TypedError> for AppError {
    fn from(err: TypedError) -> Self {
        match err {
            TypedError::Router(err) => Self::Router(err),
            TypedError::Config(err) => Self::Config(err),
        }
    }
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}

/// Result type alias for router operations.
pub type AppResult<T> = Result<T, AppError>;
