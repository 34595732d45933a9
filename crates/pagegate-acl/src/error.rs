//! Error types for pagegate-acl

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for pagegate-acl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in pagegate-acl
///
/// None of these ever escape an access decision: evaluation fails closed
/// instead. They surface from rule construction, group management and
/// configuration loading.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A rule's principal was already bound.
    #[error("rule principal is already bound to '{0}'")]
    AlreadyBound(String),

    /// An identity with an empty name was supplied.
    #[error("invalid identity: {0}")]
    InvalidIdentity(String),

    /// An action token did not name a known page action.
    #[error("unknown action '{0}'")]
    UnknownAction(String),

    /// The named group does not exist.
    #[error("unknown group '{0}'")]
    UnknownGroup(String),

    /// A group with this name already exists.
    #[error("group '{0}' already exists")]
    GroupExists(String),

    /// Configuration could not be parsed or is inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O failure while reading a file.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Build a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Wrap an I/O error together with the path being accessed.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}
