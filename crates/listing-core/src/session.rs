//! Draft sessions
//!
//! A [`DraftSession`] owns everything local to one create or edit flow: the
//! draft fields, the staging list, the last rejection notice and the entry
//! being edited. Nothing here survives the session; it is discarded on
//! cancel and cleared after a successful submission.

use crate::config::ListingConfig;
use crate::error::SessionError;
use crate::notice::Notice;
use crate::preview::PreviewDecoder;
use crate::reconciler::{EditReconciler, ReconcileState};
use crate::services::{AssetService, Services};
use listing_model::{
    Actor, AssetId, Attachment, CatalogEntry, Draft, DraftId, LocalFile, NewAttachment,
};
use listing_staging::{Rejection, StagingList, ValidationGate};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Whether a session creates a new entry or edits an existing one
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    /// New entry
    Create,
    /// Existing entry, as fetched when editing started
    Edit(Box<CatalogEntry>),
}

/// Outcome of removing a staged attachment
#[derive(Debug)]
pub struct Removal {
    /// The attachment taken out of the staging list
    pub attachment: Attachment,
    /// Detached remote delete, when one was issued
    pub delete_task: Option<JoinHandle<()>>,
}

/// Local state of one create or edit flow
#[derive(Clone)]
pub struct DraftSession {
    id: DraftId,
    mode: Mode,
    draft: Draft,
    staging: StagingList,
    gate: ValidationGate,
    notice_ttl: Duration,
    notice: Option<Notice>,
    reconcile_state: Option<ReconcileState>,
    assets: Arc<dyn AssetService>,
    decoder: Arc<dyn PreviewDecoder>,
}

impl DraftSession {
    /// Empty session for a new entry
    #[must_use]
    pub fn create(services: &Services, config: &ListingConfig) -> Self {
        Self {
            id: DraftId::new(),
            mode: Mode::Create,
            draft: Draft::new(),
            staging: StagingList::new(),
            gate: ValidationGate::new(config.entry_limits()),
            notice_ttl: config.notice_ttl(),
            notice: None,
            reconcile_state: None,
            assets: Arc::clone(&services.assets),
            decoder: Arc::clone(&services.decoder),
        }
    }

    /// Session editing `entry`, hydrated through the edit reconciler
    pub async fn edit(entry: CatalogEntry, services: &Services, config: &ListingConfig) -> Self {
        let reconciliation = EditReconciler::new(Arc::clone(&services.assets))
            .reconcile(&entry)
            .await;

        tracing::info!(
            entry = %entry.id,
            outcome = %reconciliation.outcome,
            resolved = reconciliation.resolved_count(),
            staged = reconciliation.staging.len(),
            "entered edit mode"
        );

        Self {
            id: DraftId::new(),
            mode: Mode::Edit(Box::new(entry)),
            draft: reconciliation.draft,
            staging: reconciliation.staging,
            gate: ValidationGate::new(config.entry_limits()),
            notice_ttl: config.notice_ttl(),
            notice: None,
            reconcile_state: reconciliation.states.last().copied(),
            assets: Arc::clone(&services.assets),
            decoder: Arc::clone(&services.decoder),
        }
    }

    /// Session identity, used for the submission lock
    #[inline]
    #[must_use]
    pub fn id(&self) -> DraftId {
        self.id
    }

    /// Create or edit
    #[inline]
    #[must_use]
    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Entry being edited, if any
    #[must_use]
    pub fn edit_context(&self) -> Option<&CatalogEntry> {
        match &self.mode {
            Mode::Create => None,
            Mode::Edit(entry) => Some(entry),
        }
    }

    /// Final reconciler state (`Hydrated`) in edit mode
    #[inline]
    #[must_use]
    pub fn reconcile_state(&self) -> Option<ReconcileState> {
        self.reconcile_state
    }

    /// Draft fields
    #[inline]
    #[must_use]
    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// Mutable draft fields
    #[inline]
    pub fn draft_mut(&mut self) -> &mut Draft {
        &mut self.draft
    }

    /// Staged attachments
    #[inline]
    #[must_use]
    pub fn staging(&self) -> &StagingList {
        &self.staging
    }

    /// Gate used for staging
    #[inline]
    #[must_use]
    pub fn gate(&self) -> &ValidationGate {
        &self.gate
    }

    /// Gate, decode and stage one file, returning its ordinal
    ///
    /// # Errors
    /// `SessionError::Rejected` or `SessionError::Preview`; the staging list is
    /// unchanged and a notice is raised.
    pub async fn stage(&mut self, file: LocalFile) -> Result<usize, SessionError> {
        if let Err(rejection) = self.gate.check(&file, &self.staging, self.edit_context()) {
            return Err(self.reject(rejection));
        }
        self.decode_and_add(file).await
    }

    /// Stage several files selected together
    ///
    /// Capacity is checked for the whole batch first; if it would overflow,
    /// nothing is staged. Otherwise each file is gated on its own, in order,
    /// and one rejection does not stop the rest.
    ///
    /// # Errors
    /// `SessionError::Rejected` with `CapacityExceeded` for an oversized batch
    pub async fn stage_batch(
        &mut self,
        files: Vec<LocalFile>,
    ) -> Result<Vec<Result<usize, SessionError>>, SessionError> {
        if let Err(rejection) = self.gate.check_capacity(self.staging.len(), files.len()) {
            return Err(self.reject(rejection));
        }

        let mut verdicts = Vec::with_capacity(files.len());
        for file in files {
            let verdict = match self.gate.check_file(&file, &self.staging, self.edit_context()) {
                Ok(()) => self.decode_and_add(file).await,
                Err(rejection) => Err(self.reject(rejection)),
            };
            verdicts.push(verdict);
        }
        Ok(verdicts)
    }

    async fn decode_and_add(&mut self, file: LocalFile) -> Result<usize, SessionError> {
        match self.decoder.decode(&file).await {
            Ok(preview) => {
                let ordinal = self.staging.add(NewAttachment::new(file, preview));
                tracing::debug!(draft = %self.id, ordinal, "staged attachment");
                Ok(ordinal)
            }
            Err(e) => {
                tracing::warn!(draft = %self.id, error = %e, "preview decoding failed");
                self.notice = Some(Notice::message(e.to_string(), self.notice_ttl));
                Err(SessionError::Preview(e))
            }
        }
    }

    fn reject(&mut self, rejection: Rejection) -> SessionError {
        tracing::debug!(draft = %self.id, code = ?rejection.code(), "staging rejected: {}", rejection);
        self.notice = Some(Notice::rejected(&rejection, self.notice_ttl));
        SessionError::Rejected(rejection)
    }

    /// Remove the attachment at `ordinal`
    ///
    /// Removing a resolved PERSISTED attachment issues a detached delete of
    /// its asset. The local removal stands whatever the delete's outcome.
    /// Without an actor, or outside a tokio runtime, no delete is issued.
    ///
    /// # Errors
    /// `SessionError::Staging` if `ordinal` is out of range
    pub fn remove(&mut self, ordinal: usize, actor: Option<&Actor>) -> Result<Removal, SessionError> {
        let attachment = self.staging.remove(ordinal)?;

        let delete_task = match (attachment.remote_asset_id(), actor) {
            (Some(asset_id), Some(actor)) => {
                spawn_asset_delete(Arc::clone(&self.assets), asset_id.clone(), actor.clone())
            }
            (Some(asset_id), None) => {
                tracing::warn!(asset = %asset_id, "no actor, skipping remote asset delete");
                None
            }
            (None, _) => None,
        };

        Ok(Removal {
            attachment,
            delete_task,
        })
    }

    /// Swap with the previous attachment; no-op at the first position
    #[inline]
    pub fn move_up(&mut self, ordinal: usize) -> bool {
        self.staging.move_up(ordinal)
    }

    /// Swap with the next attachment; no-op at the last position
    #[inline]
    pub fn move_down(&mut self, ordinal: usize) -> bool {
        self.staging.move_down(ordinal)
    }

    /// Current notice, if it has not expired
    #[must_use]
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref().filter(|n| n.is_active())
    }

    /// Dismiss the notice
    #[inline]
    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    /// Drop all local state (cancel, or after a successful submission)
    pub fn discard(&mut self) {
        self.draft.clear();
        self.staging.clear();
        self.notice = None;
    }
}

impl fmt::Debug for DraftSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DraftSession")
            .field("id", &self.id)
            .field("mode", &self.mode)
            .field("draft", &self.draft)
            .field("staging", &self.staging)
            .field("notice", &self.notice)
            .finish_non_exhaustive()
    }
}

/// Fire-and-forget asset delete; outcome goes to logs and metrics only
fn spawn_asset_delete(
    assets: Arc<dyn AssetService>,
    asset_id: AssetId,
    actor: Actor,
) -> Option<JoinHandle<()>> {
    let Ok(handle) = tokio::runtime::Handle::try_current() else {
        tracing::warn!(asset = %asset_id, "no runtime, skipping remote asset delete");
        return None;
    };

    Some(handle.spawn(async move {
        match assets.delete(&asset_id, &actor).await {
            Ok(()) => {
                metrics::counter!("listing_asset_deletes_total").increment(1);
                tracing::debug!(asset = %asset_id, "asset deleted");
            }
            Err(e) => {
                metrics::counter!("listing_asset_delete_failures_total").increment(1);
                tracing::warn!(asset = %asset_id, error = %e, "asset delete failed");
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::MockPreviewDecoder;
    use crate::preview::PreviewError;
    use crate::services::{MockAssetService, MockCatalogService, ServiceError};
    use listing_model::{ActorId, CategoryId, EntryId, Origin, PersistedAttachment, Preview};
    use listing_staging::RejectionCode;

    fn services(assets: MockAssetService) -> Services {
        Services::new(Arc::new(MockCatalogService::new()), Arc::new(assets))
    }

    fn png(name: &str, size: usize) -> LocalFile {
        LocalFile::new(name, "image/png", vec![7u8; size])
    }

    #[tokio::test]
    async fn stage_rejects_unsupported_type_with_notice() {
        let mut session = DraftSession::create(&services(MockAssetService::new()), &ListingConfig::default());
        let err = session
            .stage(LocalFile::new("a.gif", "image/gif", vec![1u8]))
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::Rejected(Rejection::UnsupportedType { .. })));
        assert!(session.staging().is_empty());
        assert_eq!(session.notice().and_then(Notice::code), Some(RejectionCode::UnsupportedType));
    }

    #[tokio::test]
    async fn decode_failure_leaves_list_unchanged() {
        let mut decoder = MockPreviewDecoder::new();
        decoder
            .expect_decode()
            .returning(|f| Err(PreviewError::Unreadable { name: f.name().to_string(), reason: "corrupt".into() }));
        let services = services(MockAssetService::new()).with_decoder(Arc::new(decoder));

        let mut session = DraftSession::create(&services, &ListingConfig::default());
        let err = session.stage(png("a.png", 4)).await.unwrap_err();

        assert!(matches!(err, SessionError::Preview(_)));
        assert!(session.staging().is_empty());
        assert!(session.notice().is_some());
    }

    #[tokio::test]
    async fn batch_over_capacity_stages_nothing() {
        let config = ListingConfig::default().with_max_attachments(2);
        let mut session = DraftSession::create(&services(MockAssetService::new()), &config);
        session.stage(png("a.png", 1)).await.unwrap();

        let err = session
            .stage_batch(vec![png("b.png", 1), png("c.png", 1)])
            .await
            .unwrap_err();

        assert_eq!(err, SessionError::Rejected(Rejection::CapacityExceeded { max: 2 }));
        assert_eq!(session.staging().len(), 1);
    }

    #[tokio::test]
    async fn batch_continues_past_rejected_file() {
        let mut session = DraftSession::create(&services(MockAssetService::new()), &ListingConfig::default());
        let verdicts = session
            .stage_batch(vec![
                png("a.png", 1),
                LocalFile::new("b.bmp", "image/bmp", vec![1u8]),
                png("c.png", 1),
            ])
            .await
            .unwrap();

        assert_eq!(verdicts.len(), 3);
        assert_eq!(verdicts[0], Ok(0));
        assert!(verdicts[1].is_err());
        assert_eq!(verdicts[2], Ok(1));
        assert_eq!(session.staging().count(Origin::New), 2);
    }

    #[tokio::test]
    async fn remove_unresolved_persisted_issues_no_delete() {
        let entry = CatalogEntry {
            id: EntryId::new("p1"),
            owner_id: ActorId::new("s1"),
            name: "n".into(),
            description: "d".into(),
            price: 3.0,
            quantity: 1,
            category_id: CategoryId::new("c"),
            image_urls: vec!["u1".into()],
        };
        let mut assets = MockAssetService::new();
        assets.expect_list().returning(|_| Err(ServiceError::Transport("down".into())));
        assets.expect_delete().never();

        let mut session = DraftSession::edit(entry, &services(assets), &ListingConfig::default()).await;
        let removal = session.remove(0, Some(&Actor::seller("s1"))).unwrap();

        assert_eq!(removal.attachment, Attachment::Persisted(PersistedAttachment::unresolved("u1")));
        assert!(removal.delete_task.is_none());
        assert!(session.staging().is_empty());
    }

    #[test]
    fn remove_out_of_range_is_error() {
        let mut session = DraftSession::create(&services(MockAssetService::new()), &ListingConfig::default());
        assert!(matches!(session.remove(0, None), Err(SessionError::Staging(_))));
    }

    #[tokio::test]
    async fn discard_clears_everything() {
        let mut session = DraftSession::create(&services(MockAssetService::new()), &ListingConfig::default());
        session.draft_mut().name = "Lamp".into();
        session.stage(png("a.png", 2)).await.unwrap();
        session.discard();

        assert!(session.staging().is_empty());
        assert_eq!(session.draft(), &Draft::new());
    }

    #[test]
    fn preview_is_required_for_new_attachments() {
        let attachment = NewAttachment::new(png("a.png", 1), Preview::new("data:image/png;base64,Bw=="));
        assert_eq!(attachment.preview().data_url(), "data:image/png;base64,Bw==");
    }
}
