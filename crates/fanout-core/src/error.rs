//! Error types for Fanout

use thiserror::Error;

/// Result type alias using Fanout's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Fanout error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Plan '{0}' not found")]
    PlanNotFound(String),

    #[error("Failed to spawn agent for role '{0}': {1}")]
    SpawnFailed(String, String),

    #[error("Context store error: {0}")]
    StoreError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
