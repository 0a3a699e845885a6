//! Blob fetch error types.

use thiserror::Error;

/// Errors during a proxied binary fetch.
///
/// Contained entirely within the owning cache instance: a failed thumbnail
/// renders a placeholder and is never retried automatically.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum BlobError {
    #[error("blob fetch failed: {message}")]
    Network { message: String },

    #[error("blob fetch returned HTTP {status}")]
    Status { status: u16 },

    #[error("blob payload is not a decodable image: {message}")]
    Undecodable { message: String },
}

impl BlobError {
    /// Creates a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates a non-success status error.
    #[must_use]
    pub const fn status(status: u16) -> Self {
        Self::Status { status }
    }

    /// Creates an undecodable-payload error.
    #[must_use]
    pub fn undecodable(message: impl Into<String>) -> Self {
        Self::Undecodable {
            message: message.into(),
        }
    }
}

/// Malformed file-column payload.
///
/// The resolver treats this as "zero files" by policy; it is never raised
/// past the resolution pass.
#[derive(Debug, Clone, Error)]
#[error("malformed file-list payload: {message}")]
pub struct FileListParseError {
    message: String,
}

impl FileListParseError {
    /// Creates a parse error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
