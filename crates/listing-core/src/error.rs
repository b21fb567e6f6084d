//! Error types for listing sessions and submissions
//!
//! - [`SessionError`]: local staging failures; non-fatal, surfaced inline
//! - [`SubmitError`]: precondition failures and terminal submission failures
//! - [`RequestError`]: single-call operations outside the submission flow

use crate::preview::PreviewError;
use crate::services::ServiceError;
use crate::state::SubmitState;
use listing_model::{AssetRecord, CatalogEntry, DraftError, DraftId};
use listing_staging::{Rejection, StagingError};

/// Local staging errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    /// Validation gate refused the file
    #[error("rejected: {0}")]
    Rejected(#[from] Rejection),

    /// Preview could not be decoded
    #[error("preview failed: {0}")]
    Preview(#[from] PreviewError),

    /// Invalid staging operation
    #[error(transparent)]
    Staging(#[from] StagingError),
}

/// Submission errors
///
/// Precondition variants (`DraftInvalid`, `NotLoggedIn`, `Attachments`,
/// `SubmissionInFlight`) guarantee no remote call was made. `Failed` means
/// the entry was not changed remotely by the failing step. `Partial` means
/// the entry now exists remotely but its images are missing or incomplete.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// Draft fields failed validation
    #[error(transparent)]
    DraftInvalid(#[from] DraftError),

    /// No authenticated actor
    #[error("not logged in")]
    NotLoggedIn,

    /// Staged attachment count outside `1..=max`
    #[error(transparent)]
    Attachments(#[from] StagingError),

    /// Another submission of the same draft has not finished
    #[error("a submission of draft {0} is already in progress")]
    SubmissionInFlight(DraftId),

    /// A remote step failed; nothing was changed on the entry
    #[error("{step} failed: {source}")]
    Failed {
        /// Step that failed
        step: SubmitState,
        /// Remote failure
        #[source]
        source: ServiceError,
        /// Assets uploaded during a failed join; never deleted automatically
        orphaned: Vec<AssetRecord>,
    },

    /// Entry saved, but its images could not be fully linked
    #[error("entry {id} was saved but {step} failed: {source}", id = entry.id)]
    Partial {
        /// The entry as it now exists remotely
        entry: Box<CatalogEntry>,
        /// Step that failed
        step: SubmitState,
        /// Remote failure
        #[source]
        source: ServiceError,
        /// Assets uploaded but not linked to the entry
        orphaned: Vec<AssetRecord>,
    },
}

impl SubmitError {
    /// Whether remote state changed before the failure
    #[inline]
    #[must_use]
    pub fn remote_changed(&self) -> bool {
        matches!(self, Self::Partial { .. })
    }

    /// Whether this is a partial success
    #[inline]
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.remote_changed()
    }

    /// Whether the failure happened before any remote call
    #[inline]
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::DraftInvalid(_)
                | Self::NotLoggedIn
                | Self::Attachments(_)
                | Self::SubmissionInFlight(_)
        )
    }

    /// Terminal coordinator state for this error, if the machine started
    #[must_use]
    pub fn terminal_state(&self) -> Option<SubmitState> {
        match self {
            Self::Failed { .. } => Some(SubmitState::Failed),
            Self::Partial { .. } => Some(SubmitState::PartialSuccess),
            _ => None,
        }
    }

    /// Uploaded assets left without a link
    #[must_use]
    pub fn orphaned(&self) -> &[AssetRecord] {
        match self {
            Self::Failed { orphaned, .. } | Self::Partial { orphaned, .. } => orphaned,
            _ => &[],
        }
    }

    /// Message for the actor; partial success is worded apart from failure
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::DraftInvalid(e) => e.to_string(),
            Self::NotLoggedIn => "Please log in first.".to_string(),
            Self::Attachments(StagingError::Empty) => "Please add at least one image.".to_string(),
            Self::Attachments(e) => e.to_string(),
            Self::SubmissionInFlight(_) => "This listing is already being saved.".to_string(),
            Self::Failed { .. } => "Saving failed. Nothing was changed; please try again.".to_string(),
            Self::Partial { .. } => {
                "The listing was saved, but its images could not all be attached. Please edit it to add them again."
                    .to_string()
            }
        }
    }
}

/// Errors of single-call operations (entry delete, avatar upload)
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RequestError {
    /// No authenticated actor
    #[error("not logged in")]
    NotLoggedIn,

    /// Validation gate refused the file
    #[error("rejected: {0}")]
    Rejected(#[from] Rejection),

    /// Remote call failed
    #[error(transparent)]
    Remote(#[from] ServiceError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use listing_model::{ActorId, CategoryId, EntryId};

    fn entry() -> CatalogEntry {
        CatalogEntry {
            id: EntryId::new("p9"),
            owner_id: ActorId::new("s1"),
            name: "n".into(),
            description: "d".into(),
            price: 1.0,
            quantity: 1,
            category_id: CategoryId::new("c"),
            image_urls: vec![],
        }
    }

    #[test]
    fn partial_is_distinct_from_failed() {
        let failed = SubmitError::Failed {
            step: SubmitState::CreateEntry,
            source: ServiceError::Transport("down".into()),
            orphaned: vec![],
        };
        let partial = SubmitError::Partial {
            entry: Box::new(entry()),
            step: SubmitState::UploadAssets,
            source: ServiceError::Transport("down".into()),
            orphaned: vec![],
        };

        assert!(!failed.remote_changed());
        assert!(partial.is_partial());
        assert_ne!(failed.user_message(), partial.user_message());
        assert_eq!(failed.terminal_state(), Some(SubmitState::Failed));
        assert_eq!(partial.terminal_state(), Some(SubmitState::PartialSuccess));
        assert!(partial.to_string().contains("entry p9 was saved"));
    }

    #[test]
    fn preconditions_have_no_terminal_state() {
        let err = SubmitError::NotLoggedIn;
        assert!(err.is_precondition());
        assert!(err.terminal_state().is_none());
        assert!(err.orphaned().is_empty());

        let empty = SubmitError::from(StagingError::Empty);
        assert_eq!(empty.user_message(), "Please add at least one image.");
    }
}
