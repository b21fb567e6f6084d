//! Validation gate
//!
//! Pure predicate deciding whether a candidate file may be staged. Checks run
//! in a fixed order and the first failure wins:
//!
//! 1. capacity
//! 2. duplicate within the session, by (name, size)
//! 3. in edit mode, name already present in an existing image URL
//! 4. MIME type allow-set
//! 5. byte size
//!
//! A rejection never mutates the staging list.

use crate::limits::StagingLimits;
use crate::list::StagingList;
use listing_model::{CatalogEntry, LocalFile};
use serde::{Deserialize, Serialize};

/// Reason a candidate file was not staged
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// Staging would exceed the attachment limit
    #[error("you can only add up to {max} images")]
    CapacityExceeded {
        /// Attachment limit
        max: usize,
    },

    /// Same (name, size) already staged in this session
    #[error("{name} has already been selected")]
    DuplicateInSession {
        /// File name
        name: String,
    },

    /// An existing image of the entry already carries this name
    #[error("an image named {name} already exists for this entry")]
    DuplicateExistingName {
        /// File name
        name: String,
    },

    /// MIME type not in the allow-set
    #[error("unsupported file type {mime_type}")]
    UnsupportedType {
        /// Offending MIME type
        mime_type: String,
    },

    /// File larger than the byte limit
    #[error("{name} is {size} bytes, limit is {max} bytes")]
    TooLarge {
        /// File name
        name: String,
        /// File size in bytes
        size: u64,
        /// Byte limit
        max: u64,
    },
}

/// Stable rejection codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionCode {
    /// See [`Rejection::CapacityExceeded`]
    CapacityExceeded,
    /// See [`Rejection::DuplicateInSession`]
    DuplicateInSession,
    /// See [`Rejection::DuplicateExistingName`]
    DuplicateExistingName,
    /// See [`Rejection::UnsupportedType`]
    UnsupportedType,
    /// See [`Rejection::TooLarge`]
    TooLarge,
}

impl Rejection {
    /// Stable code for this rejection
    #[must_use]
    pub fn code(&self) -> RejectionCode {
        match self {
            Rejection::CapacityExceeded { .. } => RejectionCode::CapacityExceeded,
            Rejection::DuplicateInSession { .. } => RejectionCode::DuplicateInSession,
            Rejection::DuplicateExistingName { .. } => RejectionCode::DuplicateExistingName,
            Rejection::UnsupportedType { .. } => RejectionCode::UnsupportedType,
            Rejection::TooLarge { .. } => RejectionCode::TooLarge,
        }
    }
}

/// Gate applying [`StagingLimits`] to candidate files
#[derive(Debug, Clone, Default)]
pub struct ValidationGate {
    limits: StagingLimits,
}

impl ValidationGate {
    /// Create gate with limits
    #[inline]
    #[must_use]
    pub fn new(limits: StagingLimits) -> Self {
        Self { limits }
    }

    /// Active limits
    #[inline]
    #[must_use]
    pub fn limits(&self) -> &StagingLimits {
        &self.limits
    }

    /// Decide whether `candidate` may be staged
    ///
    /// `edit_context` is the entry being edited, if any.
    ///
    /// # Errors
    /// The first failing check, as a [`Rejection`]
    pub fn check(
        &self,
        candidate: &LocalFile,
        staging: &StagingList,
        edit_context: Option<&CatalogEntry>,
    ) -> Result<(), Rejection> {
        self.check_capacity(staging.len(), 1)?;
        self.check_file(candidate, staging, edit_context)
    }

    /// Capacity check for adding `incoming` files to `staged` ones
    ///
    /// # Errors
    /// `Rejection::CapacityExceeded` if the total would exceed the limit
    pub fn check_capacity(&self, staged: usize, incoming: usize) -> Result<(), Rejection> {
        if staged.saturating_add(incoming) > self.limits.max_attachments {
            return Err(Rejection::CapacityExceeded {
                max: self.limits.max_attachments,
            });
        }
        Ok(())
    }

    /// Checks 2 to 5, without capacity
    ///
    /// # Errors
    /// The first failing check, as a [`Rejection`]
    pub fn check_file(
        &self,
        candidate: &LocalFile,
        staging: &StagingList,
        edit_context: Option<&CatalogEntry>,
    ) -> Result<(), Rejection> {
        if staging.contains_file(candidate) {
            return Err(Rejection::DuplicateInSession {
                name: candidate.name().to_string(),
            });
        }

        if let Some(entry) = edit_context {
            if name_in_urls(candidate.name(), &entry.image_urls) {
                return Err(Rejection::DuplicateExistingName {
                    name: candidate.name().to_string(),
                });
            }
        }

        self.check_content(candidate)
    }

    /// Type and size checks only
    ///
    /// # Errors
    /// `Rejection::UnsupportedType` or `Rejection::TooLarge`
    pub fn check_content(&self, candidate: &LocalFile) -> Result<(), Rejection> {
        if !self.limits.allows_type(candidate.mime_type()) {
            return Err(Rejection::UnsupportedType {
                mime_type: candidate.mime_type().to_string(),
            });
        }

        if candidate.size() > self.limits.max_image_bytes {
            return Err(Rejection::TooLarge {
                name: candidate.name().to_string(),
                size: candidate.size(),
                max: self.limits.max_image_bytes,
            });
        }

        Ok(())
    }
}

/// Case-insensitive substring match of a file name against URLs
fn name_in_urls(name: &str, urls: &[String]) -> bool {
    let needle = name.to_lowercase();
    urls.iter().any(|url| url.to_lowercase().contains(&needle))
}
