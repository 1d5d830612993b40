use thiserror::Error;

use crate::errors::domain::DomainError;
use crate::errors::ErrorCode;

/// Process-level error: configuration, startup and anything wrapping a
/// domain rejection on its way out of the engine.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
    #[error("Configuration error: {detail}")]
    Config { detail: String },
    #[error("Internal error: {detail}")]
    Internal { detail: String },
}

impl AppError {
    /// Wire code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Domain(err) => err.code(),
            AppError::Config { .. } => ErrorCode::ConfigError,
            AppError::Internal { .. } => ErrorCode::Internal,
        }
    }

    /// Error detail without the variant prefix.
    pub fn detail(&self) -> String {
        match self {
            AppError::Domain(err) => err.detail().to_string(),
            AppError::Config { detail } => detail.clone(),
            AppError::Internal { detail } => detail.clone(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }
}
