//! Submission coordinator
//!
//! Drives a prepared submission through the create or edit state machine
//! (see [`crate::state`]). Uploads of NEW attachments fan out concurrently
//! and are joined as a unit; results are reassembled by request position so
//! the merge rule holds whatever order they complete in. A failed join does
//! not roll back the uploads that succeeded: they are reported as orphans.
//!
//! A submission is split in two:
//! - [`SubmissionCoordinator::prepare`] checks every precondition and
//!   freezes the staging list. No remote call happens here.
//! - [`SubmissionCoordinator::execute`] takes the per-draft lock and runs
//!   the machine to a terminal state.

use crate::config::ListingConfig;
use crate::error::{RequestError, SubmitError};
use crate::services::{AssetService, CatalogService, ServiceError, Services};
use crate::session::{DraftSession, Mode};
use crate::state::{StateTrace, SubmitState};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::join_all;
use listing_model::{Actor, AssetRecord, CatalogEntry, DraftId, EntryId, EntryPayload, LocalFile, OwnerType};
use listing_staging::{PendingUpload, SubmissionSnapshot, ValidationGate};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// What a prepared submission will do
#[derive(Debug, Clone)]
enum Target {
    Create,
    Edit(EntryId),
}

/// A validated, frozen submission ready to execute
#[derive(Debug, Clone)]
pub struct Submission {
    draft_id: DraftId,
    actor: Actor,
    target: Target,
    payload: EntryPayload,
    snapshot: SubmissionSnapshot,
}

impl Submission {
    /// Draft being submitted
    #[inline]
    #[must_use]
    pub fn draft_id(&self) -> DraftId {
        self.draft_id
    }

    /// Frozen staging list
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> &SubmissionSnapshot {
        &self.snapshot
    }

    /// Whether this edits an existing entry
    #[inline]
    #[must_use]
    pub fn is_edit(&self) -> bool {
        matches!(self.target, Target::Edit(_))
    }
}

/// Successful submission
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReport {
    /// Submitted draft
    pub draft_id: DraftId,
    /// Entry as stored remotely
    pub entry: CatalogEntry,
    /// Assets uploaded, in staging order
    pub uploaded: Vec<AssetRecord>,
    /// States visited, `Idle` through `Done`
    pub states: Vec<SubmitState>,
}

/// A failed upload join
struct UploadFailure {
    source: ServiceError,
    orphaned: Vec<AssetRecord>,
}

/// Holds the in-flight slot for one draft; released on drop
struct InFlightGuard<'a> {
    in_flight: &'a DashMap<DraftId, SubmitState>,
    draft_id: DraftId,
    trace: StateTrace,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(in_flight: &'a DashMap<DraftId, SubmitState>, draft_id: DraftId) -> Option<Self> {
        match in_flight.entry(draft_id) {
            Entry::Occupied(_) => return None,
            Entry::Vacant(slot) => {
                slot.insert(SubmitState::Idle);
            }
        }
        Some(Self {
            in_flight,
            draft_id,
            trace: StateTrace::new(),
        })
    }

    fn advance(&mut self, next: SubmitState) {
        self.trace.advance(next);
        if let Some(mut state) = self.in_flight.get_mut(&self.draft_id) {
            *state = next;
        }
    }

    fn states(&self) -> Vec<SubmitState> {
        self.trace.states().to_vec()
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.remove(&self.draft_id);
    }
}

/// Top-level submission state machine
pub struct SubmissionCoordinator {
    catalog: Arc<dyn CatalogService>,
    assets: Arc<dyn AssetService>,
    max_attachments: usize,
    avatar_gate: ValidationGate,
    in_flight: DashMap<DraftId, SubmitState>,
}

impl SubmissionCoordinator {
    /// Create coordinator
    #[must_use]
    pub fn new(services: &Services, config: &ListingConfig) -> Self {
        Self {
            catalog: Arc::clone(&services.catalog),
            assets: Arc::clone(&services.assets),
            max_attachments: config.max_attachments,
            avatar_gate: ValidationGate::new(config.avatar_limits()),
            in_flight: DashMap::new(),
        }
    }

    /// State of an in-flight submission of `draft_id`
    #[must_use]
    pub fn state_of(&self, draft_id: DraftId) -> Option<SubmitState> {
        self.in_flight.get(&draft_id).map(|s| *s)
    }

    /// Number of submissions currently running
    #[inline]
    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Check preconditions and freeze the session for submission
    ///
    /// Order: draft fields, actor, attachment count.
    ///
    /// # Errors
    /// `DraftInvalid`, `NotLoggedIn` or `Attachments`
    pub fn prepare(&self, session: &DraftSession, actor: Option<&Actor>) -> Result<Submission, SubmitError> {
        let payload = session.draft().to_payload(Vec::new())?;
        let actor = actor.ok_or(SubmitError::NotLoggedIn)?.clone();
        session.staging().check_count(self.max_attachments)?;

        let target = match session.mode() {
            Mode::Create => Target::Create,
            Mode::Edit(entry) => Target::Edit(entry.id.clone()),
        };

        Ok(Submission {
            draft_id: session.id(),
            actor,
            target,
            payload,
            snapshot: session.staging().snapshot(),
        })
    }

    /// Run a prepared submission to a terminal state
    ///
    /// # Errors
    /// `SubmissionInFlight` if the draft is already being submitted (no
    /// remote call made), otherwise `Failed` or `Partial`
    #[tracing::instrument(skip_all, fields(draft = %submission.draft_id, edit = submission.is_edit()))]
    pub async fn execute(&self, submission: Submission) -> Result<SubmitReport, SubmitError> {
        let Some(mut guard) = InFlightGuard::acquire(&self.in_flight, submission.draft_id) else {
            tracing::warn!("submission already in flight");
            return Err(SubmitError::SubmissionInFlight(submission.draft_id));
        };

        tracing::info!(
            staged = submission.snapshot.len(),
            uploads = submission.snapshot.uploads().len(),
            "submission started"
        );

        let result = match &submission.target {
            Target::Create => self.run_create(&mut guard, &submission).await,
            Target::Edit(entry_id) => self.run_edit(&mut guard, &submission, entry_id).await,
        };

        match &result {
            Ok(report) => tracing::info!(entry = %report.entry.id, "submission done"),
            Err(e) if e.is_partial() => {
                tracing::error!(error = %e, orphaned = e.orphaned().len(), "submission partially succeeded");
            }
            Err(e) => tracing::error!(error = %e, orphaned = e.orphaned().len(), "submission failed"),
        }
        result
    }

    /// Prepare, execute, and clear the session on success
    ///
    /// On failure the session is left intact for a retry.
    ///
    /// # Errors
    /// Everything [`prepare`](Self::prepare) and [`execute`](Self::execute) return
    pub async fn submit(
        &self,
        session: &mut DraftSession,
        actor: Option<&Actor>,
    ) -> Result<SubmitReport, SubmitError> {
        let submission = self.prepare(session, actor)?;
        let report = self.execute(submission).await?;
        session.discard();
        Ok(report)
    }

    async fn run_create(
        &self,
        guard: &mut InFlightGuard<'_>,
        submission: &Submission,
    ) -> Result<SubmitReport, SubmitError> {
        let actor = &submission.actor;

        guard.advance(SubmitState::CreateEntry);
        let created = match self.catalog.create(&submission.payload, actor).await {
            Ok(entry) => entry,
            Err(source) => {
                guard.advance(SubmitState::Failed);
                return Err(SubmitError::Failed {
                    step: SubmitState::CreateEntry,
                    source,
                    orphaned: Vec::new(),
                });
            }
        };
        tracing::debug!(entry = %created.id, "entry created");

        let uploaded = if submission.snapshot.has_uploads() {
            guard.advance(SubmitState::UploadAssets);
            match self.upload_all(created.id.as_str(), submission.snapshot.uploads(), actor).await {
                Ok(uploaded) => uploaded,
                Err(failure) => {
                    guard.advance(SubmitState::PartialSuccess);
                    return Err(SubmitError::Partial {
                        entry: Box::new(created),
                        step: SubmitState::UploadAssets,
                        source: failure.source,
                        orphaned: failure.orphaned,
                    });
                }
            }
        } else {
            Vec::new()
        };

        guard.advance(SubmitState::LinkEntry);
        let images = submission.snapshot.merge(uploaded.iter().map(|a| a.url.clone()));
        let linked = match self
            .catalog
            .update(&created.id, &created.payload_with_images(images), actor)
            .await
        {
            Ok(entry) => entry,
            Err(source) => {
                guard.advance(SubmitState::PartialSuccess);
                return Err(SubmitError::Partial {
                    entry: Box::new(created),
                    step: SubmitState::LinkEntry,
                    source,
                    orphaned: uploaded,
                });
            }
        };

        guard.advance(SubmitState::Done);
        Ok(SubmitReport {
            draft_id: submission.draft_id,
            entry: linked,
            uploaded,
            states: guard.states(),
        })
    }

    async fn run_edit(
        &self,
        guard: &mut InFlightGuard<'_>,
        submission: &Submission,
        entry_id: &EntryId,
    ) -> Result<SubmitReport, SubmitError> {
        let actor = &submission.actor;

        if !submission.snapshot.has_uploads() {
            guard.advance(SubmitState::DirectUpdate);
            let payload = submission.payload.clone().with_images(submission.snapshot.persisted_urls());
            return match self.catalog.update(entry_id, &payload, actor).await {
                Ok(entry) => {
                    guard.advance(SubmitState::Done);
                    Ok(SubmitReport {
                        draft_id: submission.draft_id,
                        entry,
                        uploaded: Vec::new(),
                        states: guard.states(),
                    })
                }
                Err(source) => {
                    guard.advance(SubmitState::Failed);
                    Err(SubmitError::Failed {
                        step: SubmitState::DirectUpdate,
                        source,
                        orphaned: Vec::new(),
                    })
                }
            };
        }

        guard.advance(SubmitState::UploadAssets);
        let uploaded = match self.upload_all(entry_id.as_str(), submission.snapshot.uploads(), actor).await {
            Ok(uploaded) => uploaded,
            Err(failure) => {
                guard.advance(SubmitState::Failed);
                return Err(SubmitError::Failed {
                    step: SubmitState::UploadAssets,
                    source: failure.source,
                    orphaned: failure.orphaned,
                });
            }
        };

        guard.advance(SubmitState::Merge);
        let images = submission.snapshot.merge(uploaded.iter().map(|a| a.url.clone()));
        tracing::debug!(?images, "merged image order");

        guard.advance(SubmitState::UpdateEntry);
        let payload = submission.payload.clone().with_images(images);
        match self.catalog.update(entry_id, &payload, actor).await {
            Ok(entry) => {
                guard.advance(SubmitState::Done);
                Ok(SubmitReport {
                    draft_id: submission.draft_id,
                    entry,
                    uploaded,
                    states: guard.states(),
                })
            }
            Err(source) => {
                guard.advance(SubmitState::Failed);
                Err(SubmitError::Failed {
                    step: SubmitState::UpdateEntry,
                    source,
                    orphaned: uploaded,
                })
            }
        }
    }

    /// Upload every pending file concurrently and join on all of them
    ///
    /// Results keep request order. Every upload is awaited before deciding,
    /// so the successes of a failed join are all known.
    async fn upload_all(
        &self,
        owner_id: &str,
        uploads: &[PendingUpload],
        actor: &Actor,
    ) -> Result<Vec<AssetRecord>, UploadFailure> {
        let results = join_all(
            uploads
                .iter()
                .map(|upload| self.assets.upload(owner_id, OwnerType::Entry, &upload.file, actor)),
        )
        .await;

        let mut uploaded = Vec::with_capacity(results.len());
        let mut first_error = None;
        for (upload, result) in uploads.iter().zip(results) {
            match result {
                Ok(record) => uploaded.push(record),
                Err(e) => {
                    tracing::warn!(ordinal = upload.ordinal, file = upload.file.name(), error = %e, "upload failed");
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match first_error {
            None => Ok(uploaded),
            Some(source) => Err(UploadFailure {
                source,
                orphaned: uploaded,
            }),
        }
    }

    /// Delete an entry
    ///
    /// # Errors
    /// `NotLoggedIn` or `Remote`
    pub async fn delete_entry(&self, entry_id: &EntryId, actor: Option<&Actor>) -> Result<(), RequestError> {
        let actor = actor.ok_or(RequestError::NotLoggedIn)?;
        self.catalog.delete(entry_id, actor).await?;
        tracing::info!(entry = %entry_id, "entry deleted");
        Ok(())
    }

    /// Upload the actor's avatar (owner type USER)
    ///
    /// # Errors
    /// `NotLoggedIn`, `Rejected` by the avatar gate, or `Remote`
    pub async fn upload_avatar(&self, file: LocalFile, actor: Option<&Actor>) -> Result<AssetRecord, RequestError> {
        let actor = actor.ok_or(RequestError::NotLoggedIn)?;
        self.avatar_gate.check_content(&file)?;
        let record = self
            .assets
            .upload(actor.id.as_str(), OwnerType::User, &file, actor)
            .await?;
        tracing::info!(user = %actor.id, asset = %record.id, "avatar uploaded");
        Ok(record)
    }
}

impl fmt::Debug for SubmissionCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubmissionCoordinator")
            .field("max_attachments", &self.max_attachments)
            .field("in_flight", &self.in_flight.len())
            .finish_non_exhaustive()
    }
}
