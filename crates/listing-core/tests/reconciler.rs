//! Entering edit mode

use listing_core::{DraftSession, EditReconciler, Mode, ReconcileState, SubmitState};
use listing_model::{AssetRecord, PersistedAttachment};
use listing_test_utils::{entry, seller, Harness};
use pretty_assertions::assert_eq;

fn persisted(session: &DraftSession) -> Vec<PersistedAttachment> {
    session
        .staging()
        .as_slice()
        .iter()
        .filter_map(|a| match a {
            listing_model::Attachment::Persisted(p) => Some(p.clone()),
            listing_model::Attachment::New(_) => None,
        })
        .collect()
}

#[tokio::test]
async fn urls_resolve_to_asset_ids_in_entry_order() {
    let h = Harness::new();
    let entry = entry("p1", &["urlX", "urlY"]);
    h.catalog.insert(entry.clone());
    h.assets.seed(AssetRecord::new("2", "urlY", "p1"));
    h.assets.seed(AssetRecord::new("1", "urlX", "p1"));
    h.assets.seed(AssetRecord::new("9", "urlX", "other"));

    let session = DraftSession::edit(entry.clone(), &h.services, &h.config).await;

    assert_eq!(
        persisted(&session),
        vec![
            PersistedAttachment::resolved("urlX", "1"),
            PersistedAttachment::resolved("urlY", "2"),
        ]
    );
    assert_eq!(session.reconcile_state(), Some(ReconcileState::Hydrated));
    assert_eq!(session.mode(), &Mode::Edit(Box::new(entry)));
    assert!(session.draft().is_submittable());
}

#[tokio::test]
async fn unknown_url_stays_unresolved() {
    let h = Harness::new();
    let entry = entry("p1", &["urlX", "gone"]);
    h.assets.seed(AssetRecord::new("1", "urlX", "p1"));

    let result = EditReconciler::new(h.assets.clone()).reconcile(&entry).await;

    assert_eq!(result.outcome, ReconcileState::Resolved);
    assert_eq!(result.resolved_count(), 1);
    assert_eq!(result.staging.get(1).and_then(|a| a.remote_asset_id()), None);
}

#[tokio::test]
async fn listing_failure_still_allows_editing() {
    let h = Harness::new();
    let entry = entry("p1", &["A", "B"]);
    h.seed_entry(&entry);
    h.assets.set_fail_list(true);

    let result = EditReconciler::new(h.assets.clone()).reconcile(&entry).await;
    assert_eq!(
        result.states,
        vec![
            ReconcileState::EnterEdit,
            ReconcileState::FetchingAssets,
            ReconcileState::FetchFailed,
            ReconcileState::Hydrated,
        ]
    );

    let mut session = DraftSession::edit(entry, &h.services, &h.config).await;
    assert_eq!(
        persisted(&session),
        vec![PersistedAttachment::unresolved("A"), PersistedAttachment::unresolved("B")]
    );

    // unresolved images can be removed locally, with no remote delete
    let removal = session.remove(0, Some(&seller())).unwrap();
    assert!(removal.delete_task.is_none());

    let report = h.coordinator.submit(&mut session, Some(&seller())).await.unwrap();
    assert_eq!(report.entry.image_urls, vec!["B"]);
    assert_eq!(report.states[1], SubmitState::DirectUpdate);
    assert!(h.assets.delete_attempts().is_empty());
    assert_eq!(h.assets.records().len(), 2);
}
