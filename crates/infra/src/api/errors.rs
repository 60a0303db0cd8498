//! API-specific error types
//!
//! Provides error classification for API operations so callers can build
//! their own retry policy.

use std::time::Duration;

use mktosync_domain::MktoError;
use reqwest::StatusCode;
use thiserror::Error;

/// Categories of API errors for retry logic
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// Authentication errors (401, 403, bad token response)
    Authentication,
    /// Rate limiting errors (429) - retry with backoff
    RateLimit,
    /// Server errors (5xx) - retryable
    Server,
    /// Client errors (4xx except auth) - non-retryable
    Client,
    /// Network/connection errors - retryable
    Network,
    /// Configuration errors - non-retryable
    Config,
}

/// API operation errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Client error: {0}")]
    Client(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),
}

impl ApiError {
    /// Get the error category for this error
    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::Auth(_) => ApiErrorCategory::Authentication,
            Self::RateLimit(_) => ApiErrorCategory::RateLimit,
            Self::Server(_) => ApiErrorCategory::Server,
            Self::Client(_) => ApiErrorCategory::Client,
            Self::Network(_) | Self::Timeout(_) => ApiErrorCategory::Network,
            Self::Config(_) => ApiErrorCategory::Config,
        }
    }

    /// Check if this error should be retried
    pub fn should_retry(&self) -> bool {
        matches!(
            self.category(),
            ApiErrorCategory::Authentication
                | ApiErrorCategory::RateLimit
                | ApiErrorCategory::Server
                | ApiErrorCategory::Network
        )
    }

    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, path: &str, body: &str) -> Self {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let message = if body.is_empty() {
            format!("{} returned status {}", path, status)
        } else {
            format!("{} returned status {}: {}", path, status, body)
        };

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Self::Auth(message)
        } else if status == StatusCode::TOO_MANY_REQUESTS {
            Self::RateLimit(message)
        } else if status.is_server_error() {
            Self::Server(message)
        } else if status.is_client_error() {
            Self::Client(message)
        } else {
            Self::Network(message)
        }
    }
}

impl From<MktoError> for ApiError {
    fn from(err: MktoError) -> Self {
        match err {
            MktoError::Auth(message) => Self::Auth(message),
            MktoError::Network(message) => Self::Network(message),
            MktoError::Config(message) => Self::Config(message),
            MktoError::InvalidInput(message) | MktoError::Io(message) => Self::Client(message),
            MktoError::Internal(message) => Self::Server(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(
            ApiError::Auth("test".to_string()).category(),
            ApiErrorCategory::Authentication
        );
        assert_eq!(
            ApiError::RateLimit("test".to_string()).category(),
            ApiErrorCategory::RateLimit
        );
        assert_eq!(ApiError::Server("test".to_string()).category(), ApiErrorCategory::Server);
        assert_eq!(
            ApiError::Timeout(Duration::from_secs(1)).category(),
            ApiErrorCategory::Network
        );
    }

    #[test]
    fn test_should_retry() {
        assert!(ApiError::Auth("test".to_string()).should_retry());
        assert!(ApiError::RateLimit("test".to_string()).should_retry());
        assert!(ApiError::Server("test".to_string()).should_retry());
        assert!(ApiError::Network("test".to_string()).should_retry());
        assert!(!ApiError::Client("test".to_string()).should_retry());
        assert!(!ApiError::Config("test".to_string()).should_retry());
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(ApiError::from_status(401, "/x", ""), ApiError::Auth(_)));
        assert!(matches!(ApiError::from_status(403, "/x", ""), ApiError::Auth(_)));
        assert!(matches!(ApiError::from_status(429, "/x", ""), ApiError::RateLimit(_)));
        assert!(matches!(ApiError::from_status(502, "/x", ""), ApiError::Server(_)));
        assert!(matches!(ApiError::from_status(404, "/x", ""), ApiError::Client(_)));

        let err = ApiError::from_status(400, "/rest/v1/leads.json", "bad input");
        assert!(err.to_string().contains("bad input"));
    }

    #[test]
    fn test_domain_auth_error_stays_auth() {
        let err: ApiError = MktoError::Auth("missing access_token".to_string()).into();
        assert!(matches!(err, ApiError::Auth(msg) if msg == "missing access_token"));
    }
}
