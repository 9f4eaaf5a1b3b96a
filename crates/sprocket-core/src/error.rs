//! Error types for sprocket backends

use thiserror::Error;

/// Error raised by a database backend
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Driver error: {0}")]
    Driver(String),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error that displays as the bare message
    pub fn other(message: impl Into<String>) -> Self {
        Error::Other(message.into())
    }
}

/// Result type alias for backend operations
pub type Result<T> = std::result::Result<T, Error>;
