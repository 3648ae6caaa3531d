//! End-to-end capture session tests against the scripted mock backends

use std::time::Duration;

use scrollshot_core::{
    capture::{RecordingScroller, ScriptedCapture},
    error::CaptureError,
    model::{CaptureRegion, StitchMode},
    session::{SessionConfig, SessionEvent, SessionState, StopReason},
};
use scrollshot_test_utils::{
    frames::{distinct_frame, identical_frames, scrolling_page, with_changed_pixels},
    harness::{MockHarness, SLOW_SETTLE, fast_config},
    timing::{assert_duration_above, assert_duration_below, measure_async},
};
use tokio::sync::mpsc;

fn drain(events: &mut mpsc::UnboundedReceiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}

#[tokio::test]
async fn test_scroll_to_end_of_content() {
    // Frames 1-2 differ, frames 2-5 are identical
    let first = distinct_frame(800, 100, 1);
    let second = distinct_frame(800, 100, 2);
    let mut h = MockHarness::new(vec![first, second]);
    assert_eq!(h.controller.region(), Some(CaptureRegion::new(0, 0, 800, 100).unwrap()));

    let mut events = h.controller.start().unwrap();
    let session = h.controller.finish().await.unwrap().unwrap();

    assert_eq!(session.state(), SessionState::Stopped(StopReason::EndOfContent));
    assert_eq!(session.frame_count(), 5);
    assert_eq!(session.no_change_count(), 3);
    assert_eq!(session.region_height(), 100);
    assert_eq!(h.capture.call_count(), 5);
    assert_eq!(h.scroller.deltas(), vec![-100; 4]);

    let streaks: Vec<u32> = drain(&mut events)
        .into_iter()
        .filter_map(|event| match event {
            SessionEvent::FrameCaptured {
                no_change_count, ..
            } => Some(no_change_count),
            _ => None,
        })
        .collect();
    assert_eq!(streaks, vec![0, 0, 1, 2, 3]);
}

#[tokio::test]
async fn test_identical_frames_stop_after_fourth() {
    let mut h = MockHarness::new(identical_frames(64, 32, 10));

    h.controller.start().unwrap();
    let session = h.controller.finish().await.unwrap().unwrap();

    assert_eq!(session.frame_count(), 4);
    assert_eq!(h.capture.call_count(), 4);
    assert_eq!(h.controller.frame_count(), 4);
    assert!(!h.controller.is_running());
}

#[tokio::test]
async fn test_small_changes_count_as_unchanged() {
    let base = distinct_frame(10, 10, 0);
    // 5% of pixels change each time: 95% similar, above the 90% threshold
    let frames = vec![
        base.clone(),
        with_changed_pixels(&base, 5),
        base.clone(),
        with_changed_pixels(&base, 5),
    ];
    let mut h = MockHarness::new(frames);

    h.controller.start().unwrap();
    let session = h.controller.finish().await.unwrap().unwrap();
    assert_eq!(session.frame_count(), 4);
    assert_eq!(session.no_change_count(), 3);
}

#[tokio::test]
async fn test_capture_failures_do_not_change_counters() {
    let page = scrolling_page(40, 10, 2);
    let capture = ScriptedCapture::new(page).with_failures([1, 2, 4]);
    let mut h = MockHarness::with_backends(
        CaptureRegion::new(0, 0, 40, 10).unwrap(),
        capture,
        RecordingScroller::new(),
        fast_config(),
    );

    let mut events = h.controller.start().unwrap();
    let session = h.controller.finish().await.unwrap().unwrap();

    // Same outcome as without failures, three extra calls
    assert_eq!(session.frame_count(), 5);
    assert_eq!(session.no_change_count(), 3);
    assert_eq!(h.capture.call_count(), 8);

    let events = drain(&mut events);
    let failures = events
        .iter()
        .filter(|e| matches!(e, SessionEvent::CaptureFailed { .. }))
        .count();
    assert_eq!(failures, 3);
    // A failure never scrolls
    assert_eq!(h.scroller.scroll_count(), 4);
}

#[tokio::test]
async fn test_scroll_failures_do_not_end_session() {
    let mut h = MockHarness::with_backends(
        CaptureRegion::new(0, 0, 40, 10).unwrap(),
        ScriptedCapture::new(scrolling_page(40, 10, 3)),
        RecordingScroller::failing("XTEST missing"),
        fast_config(),
    );

    let mut events = h.controller.start().unwrap();
    let session = h.controller.finish().await.unwrap().unwrap();

    assert_eq!(session.state(), SessionState::Stopped(StopReason::EndOfContent));
    assert_eq!(session.frame_count(), 6);

    let scroll_failures = drain(&mut events)
        .into_iter()
        .filter(|e| matches!(e, SessionEvent::ScrollFailed { .. }))
        .count();
    assert_eq!(scroll_failures, 5);
}

#[tokio::test]
async fn test_failed_scroll_still_waits_settle_delay() {
    let config = SessionConfig {
        settle_delay_ms: SLOW_SETTLE.as_millis() as u64,
        ..fast_config()
    };
    let mut h = MockHarness::with_backends(
        CaptureRegion::new(0, 0, 40, 10).unwrap(),
        ScriptedCapture::new(scrolling_page(40, 10, 2)),
        RecordingScroller::failing("XTEST missing"),
        config,
    );

    h.controller.start().unwrap();
    let (session, elapsed) = measure_async("failing scrolls", h.controller.finish()).await;
    let frames = session.unwrap().unwrap().frame_count();

    assert_eq!(frames, 5);
    assert_eq!(h.scroller.scroll_count(), frames - 1);
    assert_duration_above(elapsed, SLOW_SETTLE * (frames as u32 - 1), "settle after failed scrolls");
}

#[tokio::test]
async fn test_lost_backend_ends_session() {
    let mut h = MockHarness::with_backends(
        CaptureRegion::new(0, 0, 40, 10).unwrap(),
        ScriptedCapture::new(scrolling_page(40, 10, 5)).with_backend_lost_at(3),
        RecordingScroller::new(),
        fast_config(),
    );

    let mut events = h.controller.start().unwrap();
    let result = h.controller.finish_and_stitch(&StitchMode::Vertical).await.unwrap().unwrap();

    // Frames captured before the loss are kept
    assert_eq!(result.frame_count(), 3);
    assert_eq!(h.capture.call_count(), 4);
    assert!(!h.controller.is_running());
    assert_eq!(
        h.controller.status().state,
        SessionState::Stopped(StopReason::BackendFailed)
    );

    let events = drain(&mut events);
    let failures = events
        .iter()
        .filter(|e| matches!(e, SessionEvent::CaptureFailed { .. }))
        .count();
    assert_eq!(failures, 1);
    assert_eq!(
        events.last(),
        Some(&SessionEvent::Stopped {
            reason:      StopReason::BackendFailed,
            frame_count: 3,
        })
    );
}

#[tokio::test]
async fn test_manual_mode_never_scrolls() {
    let config = SessionConfig {
        auto_scroll_enabled: false,
        ..fast_config()
    };
    let mut h = MockHarness::with_backends(
        CaptureRegion::new(0, 0, 40, 10).unwrap(),
        ScriptedCapture::new(scrolling_page(40, 10, 4)),
        RecordingScroller::new(),
        config,
    );

    h.controller.start().unwrap();
    let session = h.controller.finish().await.unwrap().unwrap();

    assert_eq!(session.frame_count(), 7);
    assert_eq!(h.scroller.scroll_count(), 0);
}

#[tokio::test]
async fn test_stop_takes_effect_within_one_iteration() {
    let config = SessionConfig {
        settle_delay_ms: SLOW_SETTLE.as_millis() as u64,
        ..fast_config()
    };
    let mut h = MockHarness::with_backends(
        CaptureRegion::new(0, 0, 8, 4).unwrap(),
        ScriptedCapture::new(scrolling_page(8, 4, 200)),
        RecordingScroller::new(),
        config,
    );

    h.controller.start().unwrap();
    let mut status = h.controller.subscribe_status();
    status.wait_for(|s| s.frame_count >= 2).await.unwrap();

    h.controller.stop_handle().stop();
    let (session, elapsed) = measure_async("stop", h.controller.finish()).await;
    let session = session.unwrap().unwrap();

    assert_eq!(session.state(), SessionState::Stopped(StopReason::StopRequested));
    assert!(session.frame_count() < 200);
    assert_duration_below(elapsed, SLOW_SETTLE * 10, "stop latency");
}

#[tokio::test]
async fn test_start_without_region() {
    let mut h = MockHarness::new(identical_frames(8, 4, 1));
    let mut controller = {
        // Same backend, no region
        let backend = scrollshot_core::capture::backend_from_mock(
            h.capture.clone(),
            h.scroller.clone(),
        );
        scrollshot_core::session::CaptureController::new(std::sync::Arc::new(backend), fast_config())
    };

    let err = controller.start().unwrap_err();
    assert!(matches!(err, CaptureError::NoRegion));
    assert!(!controller.is_running());
    assert_eq!(h.capture.call_count(), 0);

    // The harness controller has a region and starts normally
    h.controller.start().unwrap();
    h.controller.finish().await.unwrap();
}

#[tokio::test]
async fn test_second_start_is_rejected() {
    let config = SessionConfig {
        settle_delay_ms: SLOW_SETTLE.as_millis() as u64,
        ..fast_config()
    };
    let mut h = MockHarness::with_backends(
        CaptureRegion::new(0, 0, 8, 4).unwrap(),
        ScriptedCapture::new(scrolling_page(8, 4, 20)),
        RecordingScroller::new(),
        config,
    );

    h.controller.start().unwrap();
    assert!(matches!(h.controller.start(), Err(CaptureError::SessionAlreadyRunning)));

    h.controller.stop();
    let session = h.controller.finish().await.unwrap().unwrap();
    assert_eq!(session.state(), SessionState::Stopped(StopReason::StopRequested));
}

#[tokio::test]
async fn test_event_stream_order() {
    let mut h = MockHarness::new(scrolling_page(16, 8, 2));

    let mut events = h.controller.start().unwrap();
    h.controller.finish().await.unwrap();
    let events = drain(&mut events);

    assert_eq!(events.first(), Some(&SessionEvent::Started));
    let indices: Vec<usize> = events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::FrameCaptured { index, .. } => Some(*index),
            _ => None,
        })
        .collect();
    assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    assert_eq!(
        events.last(),
        Some(&SessionEvent::Stopped {
            reason:      StopReason::EndOfContent,
            frame_count: 5,
        })
    );
}

#[tokio::test]
async fn test_finish_and_stitch_vertical() {
    let mut h = MockHarness::new(scrolling_page(800, 100, 2));

    h.controller.start().unwrap();
    let result = h.controller.finish_and_stitch(&StitchMode::Vertical).await.unwrap().unwrap();

    assert_eq!(result.dimensions(), (800, 500));
    assert_eq!(result.frame_count(), 5);
}

#[tokio::test]
async fn test_finish_and_stitch_grid() {
    let mut h = MockHarness::new(scrolling_page(100, 100, 1));

    h.controller.start().unwrap();
    let result = h.controller.finish_and_stitch(&StitchMode::grid()).await.unwrap().unwrap();

    // 4 identical frames -> 2x2 grid with 20px gaps
    let layout = result.layout().unwrap();
    assert_eq!((layout.columns, layout.rows), (2, 2));
    assert_eq!(result.dimensions(), (260, 260));
}

#[tokio::test]
async fn test_stop_before_any_frame_stitches_nothing() {
    let capture = ScriptedCapture::new(scrolling_page(8, 4, 1)).with_delay(Duration::from_millis(20));
    let mut h = MockHarness::with_backends(
        CaptureRegion::new(0, 0, 8, 4).unwrap(),
        capture,
        RecordingScroller::new(),
        fast_config(),
    );

    let stop = h.controller.stop_handle();
    h.controller.start().unwrap();
    stop.stop();

    let result = h.controller.finish_and_stitch(&StitchMode::Vertical).await.unwrap();
    assert!(result.is_none());
    assert_eq!(h.capture.call_count(), 0);
}
