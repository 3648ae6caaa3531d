//! Controller wired to the scripted mock backends
//!
//! [`MockHarness`] keeps handles to both mocks so tests can inspect how the
//! loop drove them after the session ends.

use std::{sync::Arc, time::Duration};

use scrollshot_core::{
    capture::{Frame, RecordingScroller, ScriptedCapture, backend_from_mock},
    model::CaptureRegion,
    session::{CaptureController, SessionConfig},
};

/// Session config with millisecond delays and explicit defaults
///
/// Every field is set explicitly so environment overrides cannot leak in.
pub fn fast_config() -> SessionConfig {
    SessionConfig {
        similarity_threshold:       0.90,
        max_no_change_streak:       3,
        settle_delay_ms:            1,
        manual_capture_interval_ms: 1,
        capture_backoff_ms:         1,
        auto_scroll_enabled:        true,
    }
}

/// Mock backends plus a controller with its region already set
pub struct MockHarness {
    pub capture:    Arc<ScriptedCapture>,
    pub scroller:   Arc<RecordingScroller>,
    pub controller: CaptureController,
}

impl MockHarness {
    /// Harness replaying `frames` over a region the size of the first frame
    pub fn new(frames: Vec<Frame>) -> Self {
        let (width, height) = frames.first().map_or((1, 1), Frame::dimensions);
        let region = CaptureRegion::new(0, 0, width.max(1), height.max(1))
            .expect("non-zero fixture region");

        Self::with_backends(
            region,
            ScriptedCapture::new(frames),
            RecordingScroller::new(),
            fast_config(),
        )
    }

    /// Harness with explicit backends and config
    pub fn with_backends(
        region: CaptureRegion,
        capture: ScriptedCapture,
        scroller: RecordingScroller,
        config: SessionConfig,
    ) -> Self {
        let capture = Arc::new(capture);
        let scroller = Arc::new(scroller);
        let backend = backend_from_mock(capture.clone(), scroller.clone());

        let mut controller = CaptureController::new(Arc::new(backend), config);
        controller.set_region(region);

        Self {
            capture,
            scroller,
            controller,
        }
    }
}

/// Settle delay long enough that a test can act between two captures
pub const SLOW_SETTLE: Duration = Duration::from_millis(50);
