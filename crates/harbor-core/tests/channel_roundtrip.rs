//! Integration tests for the remote-control channel.
//!
//! These run a real reporter and controller over a Unix socket bound at an
//! anonymous endpoint and exercise the full wire protocol.

use std::time::Duration;

use harbor_core::channel::{
    ChannelError, ChannelEvent, CompletionResult, ProgressReporter, RemoteController,
};

const PEER_TIMEOUT: Duration = Duration::from_secs(2);

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
async fn test_progress_sequence_then_success() {
    let mut controller = RemoteController::open().unwrap();
    let bookmark = controller.bookmark();

    let reporter_task = tokio::spawn(async move {
        let mut reporter = ProgressReporter::connect(&bookmark).await.unwrap();
        reporter.report_progress(0.3).await.unwrap();
        reporter.report_progress(0.8).await.unwrap();
        reporter.report_completion(None).await.unwrap();

        // The channel accepts nothing after its completion.
        assert!(matches!(
            reporter.report_progress(0.9).await,
            Err(ChannelError::Closed)
        ));
        assert!(matches!(
            reporter.report_completion(None).await,
            Err(ChannelError::Closed)
        ));
    });

    controller.wait_for_peer(PEER_TIMEOUT).await.unwrap();
    let events = drain_events(&mut controller).await;
    assert_eq!(
        events,
        vec![
            ChannelEvent::Progress { value: 0.3 },
            ChannelEvent::Progress { value: 0.8 },
            ChannelEvent::Completed {
                result: CompletionResult::Success
            },
        ]
    );

    reporter_task.await.unwrap();
}

#[tokio::test]
async fn test_progress_must_be_monotonic() {
    let mut controller = RemoteController::open().unwrap();
    let bookmark = controller.bookmark();

    let reporter_task = tokio::spawn(async move {
        let mut reporter = ProgressReporter::connect(&bookmark).await.unwrap();
        reporter.report_progress(0.5).await.unwrap();

        // Regressions and out-of-range values fail without updating state.
        assert!(matches!(
            reporter.report_progress(0.4).await,
            Err(ChannelError::InvalidArgument { .. })
        ));
        assert!(matches!(
            reporter.report_progress(1.5).await,
            Err(ChannelError::InvalidArgument { .. })
        ));
        assert!(matches!(
            reporter.report_progress(f64::NAN).await,
            Err(ChannelError::InvalidArgument { .. })
        ));

        // Equal and increasing values still work after a rejection.
        reporter.report_progress(0.5).await.unwrap();
        reporter.report_progress(1.0).await.unwrap();
        reporter.report_completion(None).await.unwrap();
    });

    controller.wait_for_peer(PEER_TIMEOUT).await.unwrap();
    let events = drain_events(&mut controller).await;
    assert_eq!(
        events,
        vec![
            ChannelEvent::Progress { value: 0.5 },
            ChannelEvent::Progress { value: 0.5 },
            ChannelEvent::Progress { value: 1.0 },
            ChannelEvent::Completed {
                result: CompletionResult::Success
            },
        ]
    );

    reporter_task.await.unwrap();
}

#[tokio::test]
async fn test_failure_completion_carries_message() {
    let mut controller = RemoteController::open().unwrap();
    let bookmark = controller.bookmark();

    let reporter_task = tokio::spawn(async move {
        let mut reporter = ProgressReporter::connect(&bookmark).await.unwrap();
        reporter
            .report_completion(Some("signing failed".to_string()))
            .await
            .unwrap();
    });

    controller.wait_for_peer(PEER_TIMEOUT).await.unwrap();
    let events = drain_events(&mut controller).await;
    assert_eq!(
        events,
        vec![ChannelEvent::Completed {
            result: CompletionResult::Failure {
                message: "signing failed".to_string()
            }
        }]
    );

    reporter_task.await.unwrap();
}

#[tokio::test]
async fn test_peer_disconnect_synthesizes_completion() {
    let mut controller = RemoteController::open().unwrap();
    let bookmark = controller.bookmark();

    let reporter_task = tokio::spawn(async move {
        let mut reporter = ProgressReporter::connect(&bookmark).await.unwrap();
        reporter.report_progress(0.5).await.unwrap();
        // Dropped without a completion: the peer dies mid-operation.
    });

    controller.wait_for_peer(PEER_TIMEOUT).await.unwrap();
    let events = drain_events(&mut controller).await;
    assert_eq!(
        events,
        vec![
            ChannelEvent::Progress { value: 0.5 },
            ChannelEvent::Completed {
                result: CompletionResult::PeerDisconnected
            },
        ]
    );

    reporter_task.await.unwrap();
}

#[tokio::test]
async fn test_invoke_reaches_reporter() {
    let mut controller = RemoteController::open().unwrap();
    let bookmark = controller.bookmark();

    let reporter_task = tokio::spawn(async move {
        let mut reporter = ProgressReporter::connect(&bookmark).await.unwrap();
        let action = reporter.next_command().await.unwrap();
        assert_eq!(action.as_deref(), Some("refresh_all"));
        reporter.report_completion(None).await.unwrap();
    });

    controller.wait_for_peer(PEER_TIMEOUT).await.unwrap();
    controller.invoke("refresh_all").await.unwrap();

    let events = drain_events(&mut controller).await;
    assert_eq!(
        events,
        vec![ChannelEvent::Completed {
            result: CompletionResult::Success
        }]
    );

    reporter_task.await.unwrap();
}

#[tokio::test]
async fn test_invoke_without_peer_fails_not_connected() {
    let mut controller = RemoteController::open().unwrap();
    assert!(matches!(
        controller.invoke("refresh_all").await,
        Err(ChannelError::NotConnected)
    ));
}

#[tokio::test]
async fn test_fresh_channel_per_operation() {
    // Two concurrent operations get distinct endpoints; no cross-talk.
    let controller_a = RemoteController::open().unwrap();
    let controller_b = RemoteController::open().unwrap();
    assert_ne!(controller_a.bookmark(), controller_b.bookmark());
}
