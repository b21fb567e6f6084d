//! Submission state machine
//!
//! Create mode:
//! `Idle -> CreateEntry -> UploadAssets -> LinkEntry -> Done`
//!
//! Edit mode:
//! `Idle -> DirectUpdate -> Done` when nothing new is staged, otherwise
//! `Idle -> UploadAssets -> Merge -> UpdateEntry -> Done`.
//!
//! `Failed` and `PartialSuccess` are terminal. There is no cancellation:
//! once started, a submission runs to a terminal state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coordinator states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmitState {
    /// Not started
    Idle,
    /// Creating the entry (create mode)
    CreateEntry,
    /// Uploading NEW attachments concurrently
    UploadAssets,
    /// Writing the image list onto the new entry (create mode)
    LinkEntry,
    /// Updating fields without uploads (edit mode)
    DirectUpdate,
    /// Computing the final image order (edit mode)
    Merge,
    /// Updating the entry with merged images (edit mode)
    UpdateEntry,
    /// Everything succeeded
    Done,
    /// Failed before the entry changed remotely
    Failed,
    /// Entry created, image linkage incomplete
    PartialSuccess,
}

impl SubmitState {
    /// Whether no further transition is possible
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed | Self::PartialSuccess)
    }
}

impl fmt::Display for SubmitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "IDLE",
            Self::CreateEntry => "CREATE_ENTRY",
            Self::UploadAssets => "UPLOAD_ASSETS",
            Self::LinkEntry => "LINK_ENTRY",
            Self::DirectUpdate => "DIRECT_UPDATE",
            Self::Merge => "MERGE",
            Self::UpdateEntry => "UPDATE_ENTRY",
            Self::Done => "DONE",
            Self::Failed => "FAILED",
            Self::PartialSuccess => "PARTIAL_SUCCESS",
        };
        f.write_str(name)
    }
}

/// States reachable from `from` in one step
#[must_use]
pub fn allowed_transitions(from: SubmitState) -> &'static [SubmitState] {
    use SubmitState::*;
    match from {
        Idle => &[CreateEntry, DirectUpdate, UploadAssets],
        CreateEntry => &[UploadAssets, LinkEntry, Failed],
        UploadAssets => &[LinkEntry, Merge, Failed, PartialSuccess],
        LinkEntry => &[Done, PartialSuccess],
        DirectUpdate => &[Done, Failed],
        Merge => &[UpdateEntry],
        UpdateEntry => &[Done, Failed],
        Done | Failed | PartialSuccess => &[],
    }
}

/// Invalid state transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid submission transition {from} -> {to}")]
pub struct TransitionError {
    /// Current state
    pub from: SubmitState,
    /// Requested state
    pub to: SubmitState,
}

/// Validate a single transition
///
/// # Errors
/// `TransitionError` if `to` is not reachable from `from`
pub fn validate_transition(from: SubmitState, to: SubmitState) -> Result<(), TransitionError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(TransitionError { from, to })
    }
}

/// Recorded path through the state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTrace {
    states: Vec<SubmitState>,
}

impl StateTrace {
    /// Start at `Idle`
    #[must_use]
    pub fn new() -> Self {
        Self {
            states: vec![SubmitState::Idle],
        }
    }

    /// Current state
    #[must_use]
    pub fn current(&self) -> SubmitState {
        self.states.last().copied().unwrap_or(SubmitState::Idle)
    }

    /// Advance to `next`
    ///
    /// Transitions are fixed by the coordinator's control flow; an invalid
    /// one is a programming error and trips a debug assertion.
    pub fn advance(&mut self, next: SubmitState) {
        let from = self.current();
        debug_assert!(
            validate_transition(from, next).is_ok(),
            "invalid submission transition {from} -> {next}"
        );
        tracing::debug!(%from, to = %next, "submission transition");
        self.states.push(next);
    }

    /// Every state visited, starting with `Idle`
    #[must_use]
    pub fn states(&self) -> &[SubmitState] {
        &self.states
    }

    /// Consume into the visited states
    #[must_use]
    pub fn into_states(self) -> Vec<SubmitState> {
        self.states
    }
}

impl Default for StateTrace {
    fn default() -> Self {
        Self::new()
    }
}
