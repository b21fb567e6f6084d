//! Create-mode submissions against the in-memory services

use listing_core::{CatalogCall, SubmitError, SubmitState};
use listing_test_utils::{png, seller, Harness};
use pretty_assertions::assert_eq;
use std::time::Duration;

#[tokio::test]
async fn create_runs_to_done_and_clears_session() {
    let h = Harness::new();
    let mut session = h.create_session();
    session.stage(png("a.png", 16)).await.unwrap();
    session.stage(png("b.png", 16)).await.unwrap();

    let report = h.coordinator.submit(&mut session, Some(&seller())).await.unwrap();

    assert_eq!(report.entry.id.as_str(), "entry-1");
    assert_eq!(
        report.entry.image_urls,
        vec![
            "memory://assets/entry-1/asset-1-a.png",
            "memory://assets/entry-1/asset-2-b.png",
        ]
    );
    assert_eq!(h.catalog.get(&report.entry.id), Some(report.entry.clone()));
    assert_eq!(
        h.catalog.calls(),
        vec![CatalogCall::Create, CatalogCall::Update(report.entry.id.clone())]
    );
    assert!(session.staging().is_empty());
    assert!(!session.draft().is_submittable());
}

#[tokio::test]
async fn create_failure_leaves_nothing_remote() {
    let h = Harness::new();
    h.catalog.fail_create();
    let mut session = h.create_session();
    session.stage(png("a.png", 16)).await.unwrap();

    let err = h.coordinator.submit(&mut session, Some(&seller())).await.unwrap_err();

    assert!(matches!(err, SubmitError::Failed { step: SubmitState::CreateEntry, .. }));
    assert_eq!(h.assets.upload_attempts(), 0);
    assert!(h.catalog.entries().is_empty());
    assert_eq!(session.staging().len(), 1);
}

#[tokio::test]
async fn failed_join_is_partial_and_keeps_uploaded_assets() {
    let h = Harness::new();
    h.assets.fail_upload_at(2);
    let mut session = h.create_session();
    for name in ["a.png", "b.png", "c.png"] {
        session.stage(png(name, 16)).await.unwrap();
    }

    let err = h.coordinator.submit(&mut session, Some(&seller())).await.unwrap_err();

    let SubmitError::Partial { entry, step, orphaned, .. } = &err else {
        panic!("expected partial success, got {err:?}");
    };
    assert_eq!(*step, SubmitState::UploadAssets);
    assert!(err.remote_changed());

    // the entry exists, without images
    let stored = h.catalog.get(&entry.id).unwrap();
    assert!(stored.image_urls.is_empty());

    // first and third uploads stay orphaned; nothing is deleted
    assert_eq!(orphaned.len(), 2);
    assert!(orphaned[0].url.ends_with("a.png"));
    assert!(orphaned[1].url.ends_with("c.png"));
    assert_eq!(h.assets.records().len(), 2);
    assert!(h.assets.delete_attempts().is_empty());

    // draft and staging kept for a retry
    assert_eq!(session.staging().len(), 3);
    assert!(session.draft().is_submittable());
    assert_eq!(h.coordinator.in_flight_count(), 0);
}

#[tokio::test]
async fn retry_after_failed_join_uploads_everything_again() {
    let h = Harness::new();
    h.assets.fail_upload_at(2);
    let mut session = h.create_session();
    for name in ["a.png", "b.png", "c.png"] {
        session.stage(png(name, 16)).await.unwrap();
    }

    let first = h.coordinator.submit(&mut session, Some(&seller())).await;
    assert!(first.unwrap_err().is_partial());

    let report = h.coordinator.submit(&mut session, Some(&seller())).await.unwrap();
    assert_eq!(report.uploaded.len(), 3);
    assert_eq!(h.assets.upload_attempts(), 6);
    assert_eq!(h.catalog.entries().len(), 2);
}

#[tokio::test]
async fn link_failure_is_partial() {
    let h = Harness::new();
    h.catalog.fail_update();
    let mut session = h.create_session();
    session.stage(png("a.png", 16)).await.unwrap();

    let err = h.coordinator.submit(&mut session, Some(&seller())).await.unwrap_err();

    assert!(matches!(err, SubmitError::Partial { step: SubmitState::LinkEntry, .. }));
    assert_eq!(err.orphaned().len(), 1);
    assert_eq!(session.staging().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn uploads_are_reassembled_in_request_order() {
    let h = Harness::new();
    h.assets.delay_upload_at(1, Duration::from_millis(500));
    let mut session = h.create_session();
    for name in ["a.png", "b.png", "c.png"] {
        session.stage(png(name, 16)).await.unwrap();
    }

    let report = h.coordinator.submit(&mut session, Some(&seller())).await.unwrap();

    // a.png completed last
    let completion: Vec<_> = h.assets.records().into_iter().map(|r| r.url).collect();
    assert!(completion[2].ends_with("a.png"));

    let names: Vec<_> = report
        .entry
        .image_urls
        .iter()
        .map(|u| u.rsplit('-').next().unwrap_or_default().to_string())
        .collect();
    assert_eq!(names, vec!["a.png", "b.png", "c.png"]);
}

#[tokio::test(start_paused = true)]
async fn second_submit_of_same_draft_is_refused() {
    let h = Harness::with_latency(Duration::from_millis(100));
    let mut session = h.create_session();
    session.stage(png("a.png", 16)).await.unwrap();

    let actor = seller();
    let first = h.coordinator.prepare(&session, Some(&actor)).unwrap();
    let second = h.coordinator.prepare(&session, Some(&actor)).unwrap();

    let (a, b) = tokio::join!(h.coordinator.execute(first), h.coordinator.execute(second));

    assert!(a.is_ok());
    assert!(matches!(b, Err(SubmitError::SubmissionInFlight(id)) if id == session.id()));
    assert_eq!(h.catalog.entries().len(), 1);
    assert_eq!(h.assets.upload_attempts(), 1);
    assert_eq!(h.coordinator.in_flight_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn state_is_observable_while_in_flight() {
    let h = Harness::with_latency(Duration::from_millis(100));
    let mut session = h.create_session();
    session.stage(png("a.png", 16)).await.unwrap();

    let submission = h.coordinator.prepare(&session, Some(&seller())).unwrap();
    let id = submission.draft_id();
    let run = h.coordinator.execute(submission);
    tokio::pin!(run);

    tokio::select! {
        biased;
        _ = &mut run => panic!("finished before the service answered"),
        () = tokio::time::sleep(Duration::from_millis(50)) => {}
    }
    assert_eq!(h.coordinator.state_of(id), Some(SubmitState::CreateEntry));

    run.await.unwrap();
    assert_eq!(h.coordinator.state_of(id), None);
}

#[tokio::test]
async fn missing_actor_makes_no_remote_call() {
    let h = Harness::new();
    let mut session = h.create_session();
    session.stage(png("a.png", 16)).await.unwrap();

    let err = h.coordinator.submit(&mut session, None).await.unwrap_err();

    assert!(matches!(err, SubmitError::NotLoggedIn));
    assert!(h.catalog.calls().is_empty());
    assert_eq!(h.assets.upload_attempts(), 0);
}
