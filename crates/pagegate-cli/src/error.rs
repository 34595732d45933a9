//! Error types for pagegate-cli

use thiserror::Error;

/// Result type alias for pagegate-cli operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in pagegate-cli
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from pagegate-acl
    #[error("ACL error: {0}")]
    Acl(#[from] pagegate_acl::Error),

    /// The policy file could not be parsed.
    #[error("Policy error: {0}")]
    Policy(String),

    /// JSON output could not be produced.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Build a policy file error.
    pub fn policy(message: impl Into<String>) -> Self {
        Self::Policy(message.into())
    }
}
