//! Integration tests for the worker side of app refresh.
//!
//! These run the real worker loop against a real controller over an
//! anonymous channel, with a temp-directory bundle library.

use std::fs;
use std::path::Path;
use std::time::Duration;

use harbor_core::channel::{ChannelEvent, CompletionResult, RemoteController};
use harbor_core::library::BundleLibrary;
use harbor_core::refresh::{REFRESH_ALL_ACTION, run_worker};
use harbor_core::signing::CommandSigner;

const PEER_TIMEOUT: Duration = Duration::from_secs(2);

fn test_library(dir: &Path, bundle_ids: &[&str]) -> BundleLibrary {
    let library = BundleLibrary::new(dir.join("apps"), dir.join("containers"));
    for bundle_id in bundle_ids {
        let path = dir.join("apps").join(bundle_id);
        fs::create_dir_all(&path).unwrap();
        fs::write(
            path.join("bundle.toml"),
            format!("display_name = \"{}\"\nexecutable = \"bin/app\"\n", bundle_id),
        )
        .unwrap();
    }
    library
}

async fn drain_events(controller: &mut RemoteController) -> Vec<ChannelEvent> {
    let mut events = Vec::new();
    loop {
        let event = controller.next_event().await.unwrap();
        let done = matches!(event, ChannelEvent::Completed { .. });
        events.push(event);
        if done {
            return events;
        }
    }
}

#[tokio::test]
async fn test_worker_refreshes_all_bundles() {
    let dir = tempfile::tempdir().unwrap();
    let library = test_library(dir.path(), &["com.example.mail", "com.example.notes"]);

    let mut controller = RemoteController::open().unwrap();
    let bookmark = controller.bookmark();
    let worker_library = library.clone();
    let worker = tokio::spawn(async move { run_worker(&bookmark, &worker_library, None).await });

    controller.wait_for_peer(PEER_TIMEOUT).await.unwrap();
    controller.invoke(REFRESH_ALL_ACTION).await.unwrap();

    let events = drain_events(&mut controller).await;
    assert_eq!(
        events,
        vec![
            ChannelEvent::Progress { value: 0.5 },
            ChannelEvent::Progress { value: 1.0 },
            ChannelEvent::Completed {
                result: CompletionResult::Success
            },
        ]
    );

    worker.await.unwrap().unwrap();

    // Bundles survived their transactions intact.
    let bundles = library.list_bundles().unwrap();
    assert_eq!(bundles.len(), 2);
    for bundle in bundles {
        assert!(bundle.path.join("bundle.toml").exists());
    }
}

#[tokio::test]
async fn test_worker_reports_signing_failure_and_cancels() {
    let dir = tempfile::tempdir().unwrap();
    let library = test_library(dir.path(), &["com.example.notes"]);

    let mut controller = RemoteController::open().unwrap();
    let bookmark = controller.bookmark();
    let worker_library = library.clone();
    let worker = tokio::spawn(async move {
        let signer = CommandSigner::new("false");
        run_worker(&bookmark, &worker_library, Some(&signer)).await
    });

    controller.wait_for_peer(PEER_TIMEOUT).await.unwrap();
    controller.invoke(REFRESH_ALL_ACTION).await.unwrap();

    let events = drain_events(&mut controller).await;
    assert_eq!(events.len(), 1);
    match &events[0] {
        ChannelEvent::Completed {
            result: CompletionResult::Failure { message },
        } => assert!(message.contains("com.example.notes")),
        other => panic!("expected failure completion, got {:?}", other),
    }

    worker.await.unwrap().unwrap();

    // The failed transaction was cancelled; the original bundle remains.
    assert!(
        dir.path()
            .join("apps/com.example.notes/bundle.toml")
            .exists()
    );
}

#[tokio::test]
async fn test_worker_rejects_unknown_action() {
    let dir = tempfile::tempdir().unwrap();
    let library = test_library(dir.path(), &["com.example.notes"]);

    let mut controller = RemoteController::open().unwrap();
    let bookmark = controller.bookmark();
    let worker = tokio::spawn(async move { run_worker(&bookmark, &library, None).await });

    controller.wait_for_peer(PEER_TIMEOUT).await.unwrap();
    controller.invoke("reticulate_splines").await.unwrap();

    let events = drain_events(&mut controller).await;
    match &events[0] {
        ChannelEvent::Completed {
            result: CompletionResult::Failure { message },
        } => assert!(message.contains("unknown action")),
        other => panic!("expected failure completion, got {:?}", other),
    }

    worker.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_worker_with_empty_library_succeeds_immediately() {
    let dir = tempfile::tempdir().unwrap();
    let library = test_library(dir.path(), &[]);

    let mut controller = RemoteController::open().unwrap();
    let bookmark = controller.bookmark();
    let worker = tokio::spawn(async move { run_worker(&bookmark, &library, None).await });

    controller.wait_for_peer(PEER_TIMEOUT).await.unwrap();
    controller.invoke(REFRESH_ALL_ACTION).await.unwrap();

    let events = drain_events(&mut controller).await;
    assert_eq!(
        events,
        vec![ChannelEvent::Completed {
            result: CompletionResult::Success
        }]
    );

    worker.await.unwrap().unwrap();
}
