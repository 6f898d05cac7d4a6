//! Fabraic error types.

use thiserror::Error;

/// Errors that can occur when building or sending a Fabraic API request.
#[derive(Debug, Error)]
pub enum FabraicError {
    /// Missing or invalid construction input (credentials, base URL, service path).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The request body could not be serialized to JSON.
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// The HTTP call itself failed (DNS, connection, timeout, cancellation).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-2xx status. The body is kept verbatim.
    #[error("request failed ({status}): {body}")]
    Api { status: u16, body: String },

    /// A non-empty 2xx response body was not valid JSON.
    #[error("failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),
}

impl FabraicError {
    /// HTTP status carried by an [`FabraicError::Api`] error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the server rejected the request with a non-2xx status.
    pub fn is_api_error(&self) -> bool {
        matches!(self, Self::Api { .. })
    }
}

/// Fabraic Result type alias.
pub type FabraicResult<T> = Result<T, FabraicError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_keeps_raw_body() {
        let err = FabraicError::Api {
            status: 404,
            body: "no such order".into(),
        };
        assert_eq!(err.to_string(), "request failed (404): no such order");
        assert_eq!(err.status(), Some(404));
        assert!(err.is_api_error());
    }

    #[test]
    fn test_non_api_errors_have_no_status() {
        let err = FabraicError::Config("missing credentials".into());
        assert_eq!(err.status(), None);
        assert!(!err.is_api_error());
    }
}
