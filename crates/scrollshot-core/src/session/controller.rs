//! Control surface for capture sessions
//!
//! [`CaptureController`] owns the backend and configuration, spawns one
//! [`CaptureLoop`] per session and collects the frozen session when the loop
//! ends.
//!
//! # Examples
//!
//! ```
//! use std::{sync::Arc, time::Duration};
//!
//! use scrollshot_core::{
//!     capture::{Frame, RecordingScroller, ScriptedCapture, backend_from_mock},
//!     model::{CaptureRegion, StitchMode},
//!     session::{CaptureController, SessionConfig},
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let frames = (0..3).map(|i| Frame::filled(80, 10, [i * 50, 0, 0])).collect();
//!     let backend = backend_from_mock(
//!         Arc::new(ScriptedCapture::new(frames)),
//!         Arc::new(RecordingScroller::new()),
//!     );
//!     let config = SessionConfig::builder()
//!         .similarity_threshold(0.9)
//!         .settle_delay(Duration::from_millis(1))
//!         .build()
//!         .unwrap();
//!
//!     let mut controller = CaptureController::new(Arc::new(backend), config);
//!     controller.set_region(CaptureRegion::new(0, 0, 80, 10).unwrap());
//!     controller.start().unwrap();
//!
//!     let result = controller.finish_and_stitch(&StitchMode::Vertical).await.unwrap();
//!     // 3 distinct frames, then the last one repeats until the streak hits 3
//!     assert_eq!(result.unwrap().dimensions(), (80, 60));
//! }
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};

use super::{CaptureLoop, CaptureSession, SessionConfig, SessionEvent, SessionStatus};
use crate::{
    capture::CaptureBackend,
    error::{CaptureError, CaptureResult},
    model::{CaptureRegion, StitchMode},
    stitch::{StitchResult, stitch},
};

/// Cloneable handle that requests a stop of the current session
///
/// Safe to move into signal handlers; stopping an idle controller is a
/// no-op.
#[derive(Debug, Clone)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.flag.store(true, Ordering::Release);
    }
}

/// Starts, stops and collects capture sessions
pub struct CaptureController {
    backend:      Arc<CaptureBackend>,
    config:       SessionConfig,
    region:       Option<CaptureRegion>,
    stop_flag:    Arc<AtomicBool>,
    status_rx:    watch::Receiver<SessionStatus>,
    task:         Option<JoinHandle<CaptureSession>>,
    last_session: Option<CaptureSession>,
}

impl CaptureController {
    pub fn new(backend: Arc<CaptureBackend>, config: SessionConfig) -> Self {
        let (_, status_rx) = watch::channel(SessionStatus::default());

        Self {
            backend,
            config,
            region: None,
            stop_flag: Arc::new(AtomicBool::new(false)),
            status_rx,
            task: None,
            last_session: None,
        }
    }

    /// Selects the rectangle captured by the next session
    pub fn set_region(&mut self, region: CaptureRegion) {
        self.region = Some(region);
    }

    pub fn region(&self) -> Option<CaptureRegion> {
        self.region
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Starts a session in the background
    ///
    /// Returns the session's event stream. Fails with `NoRegion` before a
    /// region is set, `InvalidParameter` for an invalid config, and
    /// `SessionAlreadyRunning` while a session records. A previous, finished
    /// session that was never collected is discarded.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) -> CaptureResult<mpsc::UnboundedReceiver<SessionEvent>> {
        if self.is_running() {
            return Err(CaptureError::SessionAlreadyRunning);
        }
        let region = self.region.ok_or(CaptureError::NoRegion)?;
        self.config.validate()?;

        let mut session = CaptureSession::new(region, &self.config);
        session.begin()?;

        self.stop_flag.store(false, Ordering::Release);
        let (status_tx, status_rx) = watch::channel(session.status());
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let runner = CaptureLoop::new(
            self.backend.clone(),
            self.config.clone(),
            session,
            self.stop_flag.clone(),
            status_tx,
            events_tx,
        );

        tracing::info!("Starting capture of {} on {} backend", region, self.backend.name);
        self.status_rx = status_rx;
        self.last_session = None;
        self.task = Some(tokio::spawn(runner.run()));

        Ok(events_rx)
    }

    /// Requests a stop; the loop exits at the top of its next iteration
    pub fn stop(&self) {
        if self.is_running() {
            tracing::info!("Stop requested");
        }
        self.stop_flag.store(true, Ordering::Release);
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            flag: self.stop_flag.clone(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.status_rx.borrow().state.is_recording()
    }

    /// Frames recorded by the current or last session
    pub fn frame_count(&self) -> usize {
        self.status_rx.borrow().frame_count
    }

    pub fn status(&self) -> SessionStatus {
        *self.status_rx.borrow()
    }

    /// Watches status changes of the current session
    pub fn subscribe_status(&self) -> watch::Receiver<SessionStatus> {
        self.status_rx.clone()
    }

    /// Waits for the session to stop and returns it
    ///
    /// Does not request a stop; call [`stop`](Self::stop) first to end a
    /// session early. Returns `None` if no session was ever started or the
    /// last one was cleared.
    pub async fn finish(&mut self) -> CaptureResult<Option<&CaptureSession>> {
        if let Some(task) = self.task.take() {
            let session = task.await.map_err(|e| {
                tracing::error!("Capture task failed: {}", e);
                CaptureError::SessionTaskFailed {
                    reason: e.to_string(),
                }
            })?;
            self.last_session = Some(session);
        }

        Ok(self.last_session.as_ref())
    }

    /// Waits for the session to stop and stitches its frames
    ///
    /// Returns `None` when there is nothing to stitch.
    pub async fn finish_and_stitch(
        &mut self,
        mode: &StitchMode,
    ) -> CaptureResult<Option<StitchResult>> {
        match self.finish().await? {
            Some(session) if session.frame_count() > 0 => {
                stitch(session.frames(), mode).map(Some)
            }
            _ => {
                tracing::info!("No frames captured, nothing to stitch");
                Ok(None)
            }
        }
    }

    /// Discards the last session's frames
    ///
    /// Fails with `SessionAlreadyRunning` while a session records.
    pub fn clear(&mut self) -> CaptureResult<()> {
        if self.is_running() {
            return Err(CaptureError::SessionAlreadyRunning);
        }

        self.task = None;
        self.last_session = None;
        let (_, status_rx) = watch::channel(SessionStatus::default());
        self.status_rx = status_rx;
        Ok(())
    }
}

impl Drop for CaptureController {
    fn drop(&mut self) {
        // Let a detached loop exit instead of capturing forever
        self.stop_flag.store(true, Ordering::Release);
    }
}

impl std::fmt::Debug for CaptureController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureController")
            .field("backend", &self.backend.name)
            .field("region", &self.region)
            .field("status", &self.status())
            .finish()
    }
}
