//! Error types for the assistant domain.
//!
//! Uses `thiserror` for ergonomic error definitions.

use thiserror::Error;

/// The top-level error type used by hosts (CLI, embedding applications).
#[derive(Debug, Error)]
pub enum Error {
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Any failure to obtain reply text from the text-generation backend.
///
/// The conversation recovers from every variant with the fallback message;
/// the detail is only for logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("API request failed: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    #[error("Rate limited or quota exhausted, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Service not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Response contained no text")]
    EmptyResponse,

    #[error("Prompt blocked by the service: {reason}")]
    Blocked { reason: String },
}

impl ServiceError {
    /// Short stable label for logs and events.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Api { .. } => "api",
            Self::RateLimited { .. } => "rate_limited",
            Self::AuthenticationFailed(_) => "authentication",
            Self::NotConfigured(_) => "not_configured",
            Self::Network(_) => "network",
            Self::Timeout(_) => "timeout",
            Self::MalformedResponse(_) => "malformed_response",
            Self::EmptyResponse => "empty_response",
            Self::Blocked { .. } => "blocked",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_error_displays_correctly() {
        let err = Error::Service(ServiceError::Api {
            status_code: 503,
            message: "model overloaded".into(),
        });
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("model overloaded"));
    }

    #[test]
    fn service_error_converts_into_top_level() {
        fn fails() -> Result<()> {
            Err(ServiceError::EmptyResponse)?
        }
        assert!(matches!(fails(), Err(Error::Service(ServiceError::EmptyResponse))));
    }

    #[test]
    fn service_error_kinds() {
        assert_eq!(ServiceError::EmptyResponse.kind(), "empty_response");
        assert_eq!(
            ServiceError::NotConfigured("no key".into()).kind(),
            "not_configured"
        );
        assert_eq!(
            ServiceError::RateLimited { retry_after_secs: 5 }.kind(),
            "rate_limited"
        );
    }
}
