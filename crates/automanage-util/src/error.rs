//! Error types for automanage

use thiserror::Error;

/// Core error type for automanage operations
#[derive(Debug, Error)]
pub enum AutomanageError {
    #[error("Invalid time: {0}")]
    InvalidTime(String),
}

impl AutomanageError {
    pub fn invalid_time(msg: impl Into<String>) -> Self {
        Self::InvalidTime(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, AutomanageError>;
