//! Listing configuration
//!
//! Loaded from TOML; every key is optional and falls back to the defaults
//! below.
//!
//! ```toml
//! max_attachments = 5
//! max_image_bytes = 2097152
//! entry_image_types = ["image/jpeg", "image/png"]
//! avatar_image_types = ["image/jpeg", "image/png", "image/webp", "image/gif"]
//! notice_ttl_ms = 3000
//! ```

use listing_staging::{
    StagingLimits, AVATAR_IMAGE_TYPES, DEFAULT_MAX_ATTACHMENTS, DEFAULT_MAX_IMAGE_BYTES,
    ENTRY_IMAGE_TYPES,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How long a rejection notice stays visible
pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_secs(3);

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// Config path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// TOML did not parse
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values parsed but are unusable
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Listing configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Maximum attachments per entry
    pub max_attachments: usize,
    /// Maximum size of one image
    pub max_image_bytes: u64,
    /// MIME types accepted for entry images
    pub entry_image_types: Vec<String>,
    /// MIME types accepted for avatars
    pub avatar_image_types: Vec<String>,
    /// Rejection notice lifetime in milliseconds
    pub notice_ttl_ms: u64,
}

impl ListingConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from TOML text and validate
    ///
    /// # Errors
    /// `ConfigError::Parse` or `ConfigError::Invalid`
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file and validate
    ///
    /// # Errors
    /// `ConfigError::Io` plus everything [`ListingConfig::from_toml_str`] returns
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// `ConfigError::Invalid` describing the first bad value
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attachments == 0 {
            return Err(ConfigError::Invalid("max_attachments must be at least 1".into()));
        }
        if self.max_image_bytes == 0 {
            return Err(ConfigError::Invalid("max_image_bytes must be at least 1".into()));
        }
        if self.entry_image_types.is_empty() {
            return Err(ConfigError::Invalid("entry_image_types is empty".into()));
        }
        if self.avatar_image_types.is_empty() {
            return Err(ConfigError::Invalid("avatar_image_types is empty".into()));
        }
        Ok(())
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

    /// With notice lifetime
    #[inline]
    #[must_use]
    pub fn with_notice_ttl(mut self, ttl: Duration) -> Self {
        self.notice_ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Notice lifetime
    #[inline]
    #[must_use]
    pub fn notice_ttl(&self) -> Duration {
        Duration::from_millis(self.notice_ttl_ms)
    }

    /// Gate limits for entry images
    #[must_use]
    pub fn entry_limits(&self) -> StagingLimits {
        StagingLimits {
            max_attachments: self.max_attachments,
            max_image_bytes: self.max_image_bytes,
            allowed_types: self.entry_image_types.clone(),
        }
    }

    /// Gate limits for avatars
    #[must_use]
    pub fn avatar_limits(&self) -> StagingLimits {
        StagingLimits {
            max_attachments: 1,
            max_image_bytes: self.max_image_bytes,
            allowed_types: self.avatar_image_types.clone(),
        }
    }
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            max_attachments: DEFAULT_MAX_ATTACHMENTS,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            entry_image_types: ENTRY_IMAGE_TYPES.iter().map(ToString::to_string).collect(),
            avatar_image_types: AVATAR_IMAGE_TYPES.iter().map(ToString::to_string).collect(),
            notice_ttl_ms: 3_000,
        }
    }
}
