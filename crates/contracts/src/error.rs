//! Layered error definitions
//!
//! Categorized by source: config / target / io

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Target Errors =====
    /// Target write error
    #[error("target '{target}' write error: {message}")]
    TargetWrite { target: String, message: String },

    /// Target panicked while handling a record
    #[error("target '{target}' panicked: {message}")]
    TargetPanicked { target: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create target write error
    pub fn target_write(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TargetWrite {
            target: target.into(),
            message: message.into(),
        }
    }

    /// Create target panic error
    pub fn target_panicked(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TargetPanicked {
            target: target.into(),
            message: message.into(),
        }
    }
}
