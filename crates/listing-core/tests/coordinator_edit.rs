//! Edit-mode submissions against the in-memory services

use listing_core::{CatalogCall, SubmitError, SubmitState};
use listing_model::EntryId;
use listing_staging::StagingError;
use listing_test_utils::{png, seller, Harness};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn persisted_first_then_new() {
    let h = Harness::new();
    let mut session = h.edit_session(&["https://cdn/A.png", "https://cdn/B.png"]).await;

    // staged order becomes [A, C(new), B]
    let c = session.stage(png("c.png", 16)).await.unwrap();
    assert_eq!(c, 2);
    assert!(session.move_up(2));

    let report = h.coordinator.submit(&mut session, Some(&seller())).await.unwrap();

    assert_eq!(
        report.entry.image_urls,
        vec![
            "https://cdn/A.png",
            "https://cdn/B.png",
            "memory://assets/p1/asset-1-c.png",
        ]
    );
    assert_eq!(
        report.states,
        vec![
            SubmitState::Idle,
            SubmitState::UploadAssets,
            SubmitState::Merge,
            SubmitState::UpdateEntry,
            SubmitState::Done,
        ]
    );
}

#[tokio::test]
async fn reordering_persisted_images_is_kept() {
    let h = Harness::new();
    let mut session = h.edit_session(&["A", "B", "C"]).await;
    assert!(session.move_down(0));

    let report = h.coordinator.submit(&mut session, Some(&seller())).await.unwrap();

    assert_eq!(report.entry.image_urls, vec!["B", "A", "C"]);
    assert_eq!(report.states.last(), Some(&SubmitState::Done));
    assert!(report.states.contains(&SubmitState::DirectUpdate));
}

#[tokio::test]
async fn failed_join_in_edit_mode_changes_nothing() {
    let h = Harness::new();
    h.assets.fail_upload_at(2);
    let mut session = h.edit_session(&["A"]).await;
    for name in ["c.png", "d.png", "e.png"] {
        session.stage(png(name, 16)).await.unwrap();
    }

    let err = h.coordinator.submit(&mut session, Some(&seller())).await.unwrap_err();

    assert!(matches!(err, SubmitError::Failed { step: SubmitState::UploadAssets, .. }));
    assert!(!err.remote_changed());
    assert_eq!(err.orphaned().len(), 2);

    let stored = h.catalog.get(&EntryId::new("p1")).unwrap();
    assert_eq!(stored.image_urls, vec!["A"]);
    assert!(h.catalog.calls().is_empty());
    assert!(h.assets.delete_attempts().is_empty());
    assert_eq!(session.staging().len(), 4);
}

#[tokio::test]
async fn update_failure_reports_uploaded_orphans() {
    let h = Harness::new();
    h.catalog.fail_update();
    let mut session = h.edit_session(&["A"]).await;
    session.stage(png("c.png", 16)).await.unwrap();

    let err = h.coordinator.submit(&mut session, Some(&seller())).await.unwrap_err();

    assert!(matches!(err, SubmitError::Failed { step: SubmitState::UpdateEntry, .. }));
    assert_eq!(err.orphaned().len(), 1);
    assert_eq!(h.catalog.calls(), vec![CatalogCall::Update(EntryId::new("p1"))]);
    assert_eq!(session.staging().len(), 2);
}

#[tokio::test]
async fn removing_every_image_blocks_submit() {
    let h = Harness::new();
    let mut session = h.edit_session(&["A"]).await;
    session.remove(0, None).unwrap();

    let err = h.coordinator.submit(&mut session, Some(&seller())).await.unwrap_err();

    assert!(matches!(err, SubmitError::Attachments(_)));
    assert!(h.catalog.calls().is_empty());
}

#[tokio::test]
async fn too_many_existing_images_blocks_submit() {
    let h = Harness::new();
    let mut session = h.edit_session(&["A", "B", "C", "D", "E", "F"]).await;
    assert_eq!(session.staging().len(), 6);

    let err = h.coordinator.submit(&mut session, Some(&seller())).await.unwrap_err();

    assert!(matches!(
        err,
        SubmitError::Attachments(StagingError::OverCapacity { count: 6, max: 5 })
    ));
    assert!(h.catalog.calls().is_empty());
    assert_eq!(h.assets.upload_attempts(), 0);
    assert_eq!(session.staging().len(), 6);
}

#[tokio::test]
async fn other_sellers_cannot_update() {
    let h = Harness::new();
    let mut session = h.edit_session(&["A"]).await;

    let intruder = listing_model::Actor::seller("seller-2");
    let err = h.coordinator.submit(&mut session, Some(&intruder)).await.unwrap_err();

    assert!(matches!(
        err,
        SubmitError::Failed {
            step: SubmitState::DirectUpdate,
            source: listing_core::ServiceError::Rejected { status: 403, .. },
            ..
        }
    ));
}

#[tokio::test]
async fn delete_entry_removes_it() {
    let h = Harness::new();
    let _session = h.edit_session(&["A"]).await;
    let id = EntryId::new("p1");

    h.coordinator.delete_entry(&id, Some(&seller())).await.unwrap();

    assert!(h.catalog.get(&id).is_none());
}
