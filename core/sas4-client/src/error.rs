//! Remote client error types.

use thiserror::Error;

/// Result type for remote operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur talking to the licensing platform.
///
/// `Remote`, `Transport` and `NotFound` render their message verbatim; those
/// strings are shown to end users unchanged.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Operator login was rejected or failed.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Network or remote-side failure with no structured error body.
    #[error("{0}")]
    Transport(String),

    /// The remote returned a structured error message.
    #[error("{0}")]
    Remote(String),

    /// The requested record does not exist remotely.
    #[error("{0}")]
    NotFound(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("payload encryption error: {0}")]
    Crypto(#[from] sas4_crypto::CryptoError),
}

impl ClientError {
    /// Returns true if this error means the record was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }
}
