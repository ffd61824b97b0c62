//! Error types for study-engine.

use crate::types::SessionStatus;
use thiserror::Error;

/// Result type alias using EngineError.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors surfaced by the session engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Empty or unusable item pool, or invalid settings.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Operation not permitted from the current status. State is left unchanged.
    #[error("cannot {operation} while session is {status}")]
    InvalidState {
        operation: &'static str,
        status: SessionStatus,
    },
}

impl EngineError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub(crate) fn invalid_state(operation: &'static str, status: SessionStatus) -> Self {
        Self::InvalidState { operation, status }
    }
}

/// Errors reported by a session recorder. Never re-raised by the engine.
#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("recorder channel closed")]
    ChannelClosed,

    #[error("recorder rejected results: {0}")]
    Rejected(String),
}
