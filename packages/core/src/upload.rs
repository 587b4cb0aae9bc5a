//! Upload validation ahead of inference

use crate::error::UploadError;
use serde::{Deserialize, Serialize};

/// Default upload size limit: 10MB
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Media types accepted by the strict policy
pub const DEFAULT_MEDIA_TYPES: [&str; 3] = ["image/jpeg", "image/jpg", "image/png"];

/// An image handed to the widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    /// File name as reported by the picker, if any
    pub name: Option<String>,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: None,
            media_type: media_type.into(),
            bytes,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Which uploads are allowed to reach the classifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadPolicy {
    /// Exact media types, or `type/*` wildcards
    pub accepted_media_types: Vec<String>,
    pub max_bytes: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            accepted_media_types: DEFAULT_MEDIA_TYPES.iter().map(|t| t.to_string()).collect(),
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl UploadPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Any `image/*` type, same size limit
    pub fn any_image() -> Self {
        Self {
            accepted_media_types: vec!["image/*".to_string()],
            ..Self::default()
        }
    }

    pub fn with_max_bytes(mut self, bytes: u64) -> Self {
        self.max_bytes = bytes;
        self
    }

    pub fn accepts_media_type(&self, media_type: &str) -> bool {
        let essence = media_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        self.accepted_media_types.iter().any(|pattern| {
            let pattern = pattern.trim().to_ascii_lowercase();
            match pattern.strip_suffix("/*") {
                Some(major) => essence
                    .split_once('/')
                    .is_some_and(|(m, sub)| m == major && !sub.is_empty()),
                None => essence == pattern,
            }
        })
    }

    pub fn validate(&self, upload: &Upload) -> Result<(), UploadError> {
        if !self.accepts_media_type(&upload.media_type) {
            return Err(UploadError::UnsupportedMediaType {
                media_type: upload.media_type.clone(),
            });
        }
        if upload.bytes.is_empty() {
            return Err(UploadError::Empty);
        }
        if upload.size() > self.max_bytes {
            return Err(UploadError::TooLarge {
                size: upload.size(),
                limit: self.max_bytes,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_media_types() {
        let policy = UploadPolicy::default();
        assert!(policy.accepts_media_type("image/png"));
        assert!(policy.accepts_media_type("IMAGE/JPEG"));
        assert!(policy.accepts_media_type("image/jpeg; charset=binary"));
        assert!(!policy.accepts_media_type("image/gif"));
        assert!(!policy.accepts_media_type("text/plain"));
    }

    #[test]
    fn test_any_image_policy() {
        let policy = UploadPolicy::any_image();
        assert!(policy.accepts_media_type("image/gif"));
        assert!(policy.accepts_media_type("image/webp"));
        assert!(!policy.accepts_media_type("image/"));
        assert!(!policy.accepts_media_type("application/pdf"));
    }

    #[test]
    fn test_validate_size_limit() {
        let policy = UploadPolicy::default().with_max_bytes(4);
        assert!(policy.validate(&Upload::new("image/png", vec![0; 4])).is_ok());
        assert_eq!(
            policy.validate(&Upload::new("image/png", vec![0; 5])),
            Err(UploadError::TooLarge { size: 5, limit: 4 })
        );
    }

    #[test]
    fn test_validate_rejects_wrong_type_first() {
        let policy = UploadPolicy::default();
        let result = policy.validate(&Upload::new("text/plain", Vec::new()));
        assert!(matches!(result, Err(UploadError::UnsupportedMediaType { .. })));
    }

    #[test]
    fn test_validate_rejects_empty() {
        let policy = UploadPolicy::default();
        assert_eq!(
            policy.validate(&Upload::new("image/png", Vec::new())),
            Err(UploadError::Empty)
        );
    }
}
