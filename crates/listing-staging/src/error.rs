//! Staging list errors

/// Errors from staging list operations and submit-time count checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StagingError {
    /// Ordinal does not address a staged attachment
    #[error("no attachment at position {index} (staged: {len})")]
    IndexOutOfRange {
        /// Requested ordinal
        index: usize,
        /// Staged count
        len: usize,
    },

    /// Nothing staged at submit time
    #[error("at least one image is required")]
    Empty,

    /// More staged than allowed at submit time
    #[error("{count} images staged, at most {max} allowed")]
    OverCapacity {
        /// Staged count
        count: usize,
        /// Attachment limit
        max: usize,
    },
}
