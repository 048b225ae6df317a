//! Media error types.

use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while validating or storing images.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Empty file in field '{0}'")]
    EmptyFile(String),

    #[error("Unsupported image type '{0}'")]
    UnsupportedType(String),

    #[error("File too large: {size} bytes (limit {limit})")]
    TooLarge { size: usize, limit: usize },

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),
}

impl MediaError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn upload_failed(msg: impl Into<String>) -> Self {
        Self::UploadFailed(msg.into())
    }

    /// True when the error comes from the caller's payload rather than the
    /// storage backend.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyFile(_) | Self::UnsupportedType(_) | Self::TooLarge { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_flagged() {
        assert!(MediaError::EmptyFile("logo".into()).is_validation());
        assert!(MediaError::UnsupportedType("text/plain".into()).is_validation());
        assert!(MediaError::TooLarge {
            size: 10,
            limit: 5
        }
        .is_validation());
        assert!(!MediaError::UploadFailed("boom".into()).is_validation());
    }
}
