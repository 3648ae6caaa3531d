//! The capture loop
//!
//! [`CaptureLoop::run`] owns a recording [`CaptureSession`] and iterates:
//!
//! 1. stop requested? -> `Stopped(StopRequested)`
//! 2. capture the region; on a transient failure back off and retry, on
//!    any other failure -> `Stopped(BackendFailed)`
//! 3. record the frame (compare with the previous one, update the streak)
//! 4. streak at its limit? -> `Stopped(EndOfContent)`
//! 5. scroll by one region height and wait for the settle delay, or in
//!    manual mode just wait for the capture interval
//!
//! The stop flag is polled once per iteration, so a stop takes effect after
//! at most one capture plus one delay.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use tokio::sync::{mpsc, watch};

use super::{CaptureSession, SessionConfig, SessionEvent, SessionStatus, StopReason};
use crate::capture::CaptureBackend;

/// Async driver for one capture session
pub struct CaptureLoop {
    backend:   Arc<CaptureBackend>,
    config:    SessionConfig,
    session:   CaptureSession,
    stop_flag: Arc<AtomicBool>,
    status_tx: watch::Sender<SessionStatus>,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
}

impl CaptureLoop {
    /// Creates a loop over a session that is already recording
    pub fn new(
        backend: Arc<CaptureBackend>,
        config: SessionConfig,
        session: CaptureSession,
        stop_flag: Arc<AtomicBool>,
        status_tx: watch::Sender<SessionStatus>,
        events_tx: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            backend,
            config,
            session,
            stop_flag,
            status_tx,
            events_tx,
        }
    }

    /// Runs until end of content or a stop request, returning the frozen
    /// session
    #[tracing::instrument(
        skip_all,
        fields(region = %self.session.region(), backend = self.backend.name)
    )]
    pub async fn run(mut self) -> CaptureSession {
        tracing::info!(
            "Capture session started (threshold {:.2}, streak {}, auto-scroll {})",
            self.config.similarity_threshold,
            self.config.max_no_change_streak,
            self.config.auto_scroll_enabled
        );
        self.publish_status();
        self.emit(SessionEvent::Started);

        let region = self.session.region();

        loop {
            if self.stop_flag.load(Ordering::Acquire) {
                return self.finish(StopReason::StopRequested);
            }

            let captured = self.backend.capture.capture_region(&region).await;
            let frame = match captured {
                Ok(frame) => frame,
                Err(e) if !e.is_transient() => {
                    tracing::error!("Capture failed permanently: {} ({})", e, e.remediation_hint());
                    self.emit(SessionEvent::CaptureFailed {
                        reason: e.to_string(),
                    });
                    return self.finish(StopReason::BackendFailed);
                }
                Err(e) => {
                    self.capture_failed(e.to_string()).await;
                    continue;
                }
            };

            let outcome = match self.session.record(frame) {
                Ok(outcome) => outcome,
                Err(e) => {
                    self.capture_failed(e.to_string()).await;
                    continue;
                }
            };

            self.publish_status();
            self.emit(SessionEvent::FrameCaptured {
                index:           outcome.index,
                similarity:      outcome.similarity,
                no_change_count: outcome.no_change_count,
            });

            if outcome.end_of_content {
                return self.finish(StopReason::EndOfContent);
            }

            let region_height = self.session.region_height();
            if self.config.auto_scroll_enabled && region_height > 0 {
                let delta = scroll_delta(region_height);
                if let Err(e) = self.backend.scroll.scroll(delta).await {
                    tracing::warn!("Scroll by {} failed, continuing: {}", delta, e);
                    self.emit(SessionEvent::ScrollFailed {
                        reason: e.to_string(),
                    });
                }
                tokio::time::sleep(self.config.settle_delay()).await;
            } else {
                tokio::time::sleep(self.config.manual_capture_interval()).await;
            }
        }
    }

    async fn capture_failed(&self, reason: String) {
        tracing::warn!("Capture failed, retrying: {}", reason);
        self.emit(SessionEvent::CaptureFailed { reason });
        tokio::time::sleep(self.config.capture_backoff()).await;
    }

    fn finish(mut self, reason: StopReason) -> CaptureSession {
        self.session.stop(reason);
        self.publish_status();

        let frame_count = self.session.frame_count();
        tracing::info!("Capture session stopped ({}) with {} frames", reason, frame_count);
        self.emit(SessionEvent::Stopped {
            reason,
            frame_count,
        });

        self.session
    }

    fn publish_status(&self) {
        self.status_tx.send_replace(self.session.status());
    }

    fn emit(&self, event: SessionEvent) {
        // Nobody listening is fine
        let _ = self.events_tx.send(event);
    }
}

/// Wheel-down delta covering one region height
fn scroll_delta(region_height: u32) -> i32 {
    match i32::try_from(region_height) {
        Ok(height) => -height,
        Err(_) => {
            tracing::warn!("Region height {} exceeds the scroll range, clamping", region_height);
            -i32::MAX
        }
    }
}
