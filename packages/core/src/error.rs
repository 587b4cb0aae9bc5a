//! Error types for ranking, catalogs, uploads and classification sessions

use thiserror::Error;

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors raised by the ranking operation itself.
///
/// Unknown labels are not errors; they resolve through the catalog fallback.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RankError {
    /// The caller passed an empty prediction set, a zero bound or a
    /// probability with no defined ordering
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },
}

impl RankError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        RankError::InvalidInput {
            reason: reason.into(),
        }
    }
}

/// Errors that can occur while building or loading a display catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Two entries normalize to the same lookup key
    #[error("Duplicate catalog key: {key}")]
    DuplicateKey { key: String },

    /// An entry has a key that is blank after trimming
    #[error("Catalog entry {index} has an empty key")]
    EmptyKey { index: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Upload rejected before it reaches the model
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("Unsupported media type: {media_type}")]
    UnsupportedMediaType { media_type: String },

    #[error("Upload too large: {size} bytes, limit is {limit} bytes")]
    TooLarge { size: u64, limit: u64 },

    #[error("Upload is empty")]
    Empty,
}

/// Errors reported by a classifier implementation
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// The model could not be loaded or is not ready yet
    #[error("Model not loaded: {0}")]
    NotLoaded(String),

    /// The model failed while classifying an image
    #[error("Inference failed: {message}")]
    Inference {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ClassifierError {
    pub fn inference(message: impl Into<String>) -> Self {
        ClassifierError::Inference {
            message: message.into(),
            source: None,
        }
    }

    pub fn inference_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ClassifierError::Inference {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Errors surfaced by a classification session submission
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    #[error(transparent)]
    Rank(#[from] RankError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The model call did not finish within the configured limit
    #[error("Inference timeout after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// A newer submission or a reset replaced this one before it could render
    #[error("Submission {generation} superseded by generation {current}")]
    Superseded { generation: u64, current: u64 },
}

/// Errors that can occur while loading widget configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ConfigError {
    pub fn invalid_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_error_message() {
        let err = RankError::invalid_input("prediction set is empty");
        assert_eq!(err.to_string(), "Invalid input: prediction set is empty");
    }

    #[test]
    fn test_session_error_is_transparent_over_upload() {
        let err: SessionError = UploadError::TooLarge { size: 11, limit: 10 }.into();
        assert_eq!(
            err.to_string(),
            "Upload too large: 11 bytes, limit is 10 bytes"
        );
    }

    #[test]
    fn test_classifier_error_keeps_source() {
        use std::error::Error as _;

        let io = std::io::Error::other("socket closed");
        let err = ClassifierError::inference_with_source("model call failed", io);
        assert!(err.source().is_some());
    }
}
