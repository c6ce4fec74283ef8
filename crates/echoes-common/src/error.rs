//! Error types shared by the Urban Echoes crates

use thiserror::Error;

/// Result type alias for shared operations
pub type Result<T> = std::result::Result<T, EchoesError>;

/// Errors raised by shared code (configuration parsing, logging setup)
#[derive(Error, Debug)]
pub enum EchoesError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("Logging error: {0}")]
    Logging(String),
}

impl EchoesError {
    /// Create an invalid-value error for a named setting
    pub fn invalid_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.into(),
        }
    }
}
