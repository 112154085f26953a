//! Error types for credential and request handling.

use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving credentials or building requests.
///
/// A credential that is simply not configured is not an error; lookups
/// return `Ok(None)` for that case.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading from or writing to the secure credential store failed.
    #[error("credential backend error: {0}")]
    CredentialBackend(String),

    /// A background credential task was cancelled before it finished.
    #[error("credential task cancelled: {0}")]
    TaskCancelled(String),

    /// A credential key name that is not part of the known namespace.
    #[error("unknown credential key: {0}")]
    UnknownCredentialKey(String),

    /// The caller supplied inputs that violate the request factory contract.
    #[error("request construction error: {0}")]
    RequestConstruction(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn request(msg: impl Into<String>) -> Self {
        Self::RequestConstruction(msg.into())
    }
}
