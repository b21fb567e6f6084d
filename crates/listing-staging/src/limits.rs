//! Staging limits
//!
//! Limits are plain values so the same gate serves entry images and avatars.

use serde::{Deserialize, Serialize};

/// Maximum staged attachments per entry
pub const DEFAULT_MAX_ATTACHMENTS: usize = 5;

/// Maximum image size in bytes (2 MiB, inclusive)
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 2 * 1024 * 1024;

/// MIME types accepted for entry images
pub const ENTRY_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png"];

/// MIME types accepted for avatars
pub const AVATAR_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "image/gif"];

/// Limits applied by the validation gate and at submit time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagingLimits {
    /// Upper bound on staged attachments
    pub max_attachments: usize,
    /// Upper bound on a single file's size
    pub max_image_bytes: u64,
    /// Accepted MIME types
    pub allowed_types: Vec<String>,
}

impl StagingLimits {
    /// Limits for catalog entry images
    #[must_use]
    pub fn entry_images() -> Self {
        Self {
            max_attachments: DEFAULT_MAX_ATTACHMENTS,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            allowed_types: ENTRY_IMAGE_TYPES.iter().map(ToString::to_string).collect(),
        }
    }

    /// Limits for a single avatar image
    #[must_use]
    pub fn avatars() -> Self {
        Self {
            max_attachments: 1,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            allowed_types: AVATAR_IMAGE_TYPES.iter().map(ToString::to_string).collect(),
        }
    }

    /// With max attachments
    #[inline]
    #[must_use]
    pub fn with_max_attachments(mut self, max: usize) -> Self {
        self.max_attachments = max;
        self
    }

    /// With max image size
    #[inline]
    #[must_use]
    pub fn with_max_image_bytes(mut self, max: u64) -> Self {
        self.max_image_bytes = max;
        self
    }

    /// Whether a MIME type is in the allow-set
    #[inline]
    #[must_use]
    pub fn allows_type(&self, mime_type: &str) -> bool {
        self.allowed_types.iter().any(|t| t == mime_type)
    }
}

impl Default for StagingLimits {
    fn default() -> Self {
        Self::entry_images()
    }
}
