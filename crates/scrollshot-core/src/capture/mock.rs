//! Mock capture and scroll backends for testing
//!
//! [`ScriptedCapture`] returns a scripted sequence of frames and
//! [`RecordingScroller`] records every scroll request, so the capture loop
//! can be driven end to end without a display server.
//!
//! # Features
//!
//! - **Scripted Frames:** frames are returned in order; once the script runs
//!   out the last frame repeats, like a page that reached its end
//! - **Configurable Delay:** simulate slow captures
//! - **Error Injection:** fail specific capture calls, lose the display
//!   from some call on, or fail every scroll
//! - **Call Recording:** inspect how often capture ran and which deltas were
//!   requested
//!
//! # Examples
//!
//! ```
//! use scrollshot_core::{
//!     capture::{Frame, RegionCapture, ScrollTrigger, mock::{RecordingScroller, ScriptedCapture}},
//!     model::CaptureRegion,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let region = CaptureRegion::new(0, 0, 4, 4).unwrap();
//!     let capture = ScriptedCapture::new(vec![Frame::filled(4, 4, [0, 0, 0])]);
//!     let scroller = RecordingScroller::new();
//!
//!     let frame = capture.capture_region(&region).await.unwrap();
//!     assert_eq!(frame.dimensions(), (4, 4));
//!
//!     scroller.scroll(-4).await.unwrap();
//!     assert_eq!(scroller.deltas(), vec![-4]);
//! }
//! ```

use std::{collections::HashSet, time::Duration};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::sleep;

use super::{Frame, RegionCapture, ScrollTrigger};
use crate::{
    error::{CaptureError, CaptureResult},
    model::{BackendType, CaptureRegion},
};

/// Capture backend that replays a scripted frame sequence
///
/// Thread-safe; share it across tasks with `Arc`.
#[derive(Debug)]
pub struct ScriptedCapture {
    frames:        Vec<Frame>,
    delay:         Option<Duration>,
    /// Zero-based call indices that fail instead of consuming a frame
    failing_calls: HashSet<usize>,
    /// First call from which the backend reports itself unavailable
    lost_from:     Option<usize>,
    state:         Mutex<ScriptState>,
}

#[derive(Debug, Default)]
struct ScriptState {
    calls:    usize,
    next:     usize,
    captured: usize,
}

impl ScriptedCapture {
    /// Creates a capture backend that returns `frames` in order
    ///
    /// An empty script fails every call with `CaptureFailed`.
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames,
            delay: None,
            failing_calls: HashSet::new(),
            lost_from: None,
            state: Mutex::new(ScriptState::default()),
        }
    }

    /// Sleeps for `delay` before every capture
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fails the given zero-based calls with `CaptureFailed`
    ///
    /// A failed call does not consume a frame from the script.
    pub fn with_failures(mut self, calls: impl IntoIterator<Item = usize>) -> Self {
        self.failing_calls.extend(calls);
        self
    }

    /// Fails every call from the zero-based `call` on with
    /// `BackendNotAvailable`, like a display connection that went away
    pub fn with_backend_lost_at(mut self, call: usize) -> Self {
        self.lost_from = Some(call);
        self
    }

    /// Total capture calls so far, failed ones included
    pub fn call_count(&self) -> usize {
        self.state.lock().calls
    }

    /// Frames successfully returned so far
    pub fn captured_count(&self) -> usize {
        self.state.lock().captured
    }

    fn next_frame(&self) -> CaptureResult<Frame> {
        let mut state = self.state.lock();
        let call = state.calls;
        state.calls += 1;

        if self.lost_from.is_some_and(|from| call >= from) {
            return Err(CaptureError::BackendNotAvailable {
                backend: BackendType::X11,
            });
        }

        if self.failing_calls.contains(&call) {
            return Err(CaptureError::CaptureFailed {
                reason: format!("injected failure on call {}", call),
            });
        }

        let Some(last) = self.frames.len().checked_sub(1) else {
            return Err(CaptureError::CaptureFailed {
                reason: "no frames scripted".to_string(),
            });
        };

        let frame = self.frames[state.next.min(last)].clone();
        state.next += 1;
        state.captured += 1;
        Ok(frame)
    }
}

#[async_trait]
impl RegionCapture for ScriptedCapture {
    async fn capture_region(&self, region: &CaptureRegion) -> CaptureResult<Frame> {
        if let Some(delay) = self.delay {
            sleep(delay).await;
        }

        let frame = self.next_frame()?;
        tracing::trace!("Scripted capture of {} -> {:?}", region, frame.dimensions());
        Ok(frame)
    }
}

/// Scroll backend that records every requested delta
#[derive(Debug, Default)]
pub struct RecordingScroller {
    deltas:    Mutex<Vec<i32>>,
    fail_with: Option<String>,
}

impl RecordingScroller {
    /// Creates a scroller that accepts every request
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every scroll fail with `ScrollFailed`
    ///
    /// Failed requests are still recorded.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            deltas:    Mutex::new(Vec::new()),
            fail_with: Some(reason.into()),
        }
    }

    /// All deltas requested so far, in order
    pub fn deltas(&self) -> Vec<i32> {
        self.deltas.lock().clone()
    }

    /// Number of scroll requests so far
    pub fn scroll_count(&self) -> usize {
        self.deltas.lock().len()
    }
}

#[async_trait]
impl ScrollTrigger for RecordingScroller {
    async fn scroll(&self, delta: i32) -> CaptureResult<()> {
        self.deltas.lock().push(delta);

        match &self.fail_with {
            Some(reason) => Err(CaptureError::ScrollFailed {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}
