//! Error types shared across rnannot crates

use thiserror::Error;

/// Result type alias for common helpers
pub type Result<T> = std::result::Result<T, CommonError>;

#[derive(Error, Debug)]
pub enum CommonError {
    #[error("Invalid value '{value}' for {key}: {message}")]
    InvalidEnvVar {
        key: String,
        value: String,
        message: String,
    },

    #[error("Environment variable {0} is not valid unicode")]
    NotUnicode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CommonError {
    pub fn invalid_env_var(
        key: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidEnvVar {
            key: key.into(),
            value: value.into(),
            message: message.into(),
        }
    }
}
