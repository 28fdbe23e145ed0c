//! Router error types

use thiserror::Error;

/// Router-specific errors
#[derive(Debug, Error)]
pub enum RouterError {
    /// Target creation error
    #[error("failed to create target '{id}': {message}")]
    TargetCreation { id: String, message: String },

    /// Target with this id is already registered
    #[error("target '{id}' is already registered")]
    DuplicateTarget { id: String },

    /// Contract-level error
    #[error("contract error: {0}")]
    Contract(#[from] contracts::ContractError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RouterError {
    /// Create a target creation error
    pub fn target_creation(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TargetCreation {
            id: id.into(),
            message: message.into(),
        }
    }
}
