//! Event bus error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventError {
    #[error("invalid payload: expected a JSON object, got {found}")]
    InvalidPayload { found: &'static str },

    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EventError>;
