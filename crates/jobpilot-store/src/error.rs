//! Store error types.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during document-store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Document already exists: {0}")]
    AlreadyExists(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Rate limited, retry after {0}ms")]
    RateLimited(u64),

    #[error("Server error ({0}): {1}")]
    ServerError(u16, String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub fn auth_error(msg: impl Into<String>) -> Self {
        Self::AuthError(msg.into())
    }

    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::RequestFailed(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Map an HTTP status code to a store error.
    pub fn from_http_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => Self::PermissionDenied(message),
            404 => Self::NotFound(message),
            409 => Self::AlreadyExists(message),
            429 => Self::RateLimited(1000),
            500..=599 => Self::ServerError(status, message),
            _ => Self::RequestFailed(message),
        }
    }

    /// Check if the error is worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::RateLimited(_) | Self::ServerError(_, _)
        )
    }

    /// Suggested delay before retrying, when the server provided one.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            Self::RateLimited(ms) => Some(*ms),
            _ => None,
        }
    }

    /// HTTP status equivalent of this error, when one applies.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::AuthError(_) => Some(401),
            Self::PermissionDenied(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::AlreadyExists(_) => Some(409),
            Self::RateLimited(_) => Some(429),
            Self::ServerError(status, _) => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_http_status_429_is_retryable() {
        let err = StoreError::from_http_status(429, "rate limited");
        assert!(matches!(err, StoreError::RateLimited(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn from_http_status_5xx_is_retryable() {
        for status in [500, 502, 503] {
            let err = StoreError::from_http_status(status, "server error");
            assert!(matches!(err, StoreError::ServerError(s, _) if s == status));
            assert!(err.is_retryable());
        }
    }

    #[test]
    fn from_http_status_4xx_is_not_retryable() {
        assert!(!StoreError::from_http_status(400, "bad request").is_retryable());
        assert!(!StoreError::from_http_status(404, "not found").is_retryable());
        assert!(!StoreError::from_http_status(409, "conflict").is_retryable());
    }

    #[test]
    fn from_http_status_maps_not_found() {
        let err = StoreError::from_http_status(404, "missing");
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn http_status_getter() {
        assert_eq!(StoreError::RateLimited(1000).http_status(), Some(429));
        assert_eq!(
            StoreError::ServerError(502, "bad gateway".into()).http_status(),
            Some(502)
        );
        assert_eq!(StoreError::NotFound("doc".into()).http_status(), Some(404));
        assert_eq!(StoreError::RequestFailed("oops".into()).http_status(), None);
    }

    #[test]
    fn retry_after_only_on_rate_limit() {
        assert_eq!(StoreError::RateLimited(5000).retry_after_ms(), Some(5000));
        assert_eq!(
            StoreError::ServerError(500, "error".into()).retry_after_ms(),
            None
        );
    }
}
