//! Backend API error types.

use thiserror::Error;

/// Errors from the sync-job endpoints.
///
/// Poll failures retain the previous snapshot; only the reset command
/// surfaces its failure to the user.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum ApiError {
    #[error("network error: {message}")]
    Network { message: String },

    #[error("request timed out")]
    Timeout,

    #[error("credential rejected by backend")]
    Unauthorized,

    #[error("backend returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("failed to parse backend response: {message}")]
    Parse { message: String },

    #[error("unexpected API error: {message}")]
    Unexpected { message: String },
}

impl ApiError {
    /// Creates a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates a non-success status error.
    #[must_use]
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Creates a response-parse error.
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Creates an unexpected error.
    #[must_use]
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }

    /// Returns true when a later attempt could succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Timeout) || self.is_server_error()
    }

    /// Returns true for 5xx responses.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(self, Self::Status { status, .. } if *status >= 500)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ApiError::network("reset by peer").is_transient());
        assert!(ApiError::Timeout.is_transient());
        assert!(ApiError::status(503, "unavailable").is_transient());
        assert!(!ApiError::status(404, "missing").is_transient());
        assert!(!ApiError::Unauthorized.is_transient());
    }
}
