//! Error types shared across the Sirene workspace

use thiserror::Error;

use crate::types::IdentifierError;

/// Result type alias for Sirene operations
pub type Result<T> = std::result::Result<T, SireneError>;

/// Main error type for Sirene
#[derive(Error, Debug)]
pub enum SireneError {
    #[error("Invalid identifier: {0}")]
    Identifier(#[from] IdentifierError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SireneError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
