//! Owned session state machine
//!
//! [`CaptureSession`] holds the frames and counters of one session and
//! enforces its lifecycle. It does no I/O; the capture loop feeds it frames
//! and acts on the returned [`FrameOutcome`].

use super::{SessionConfig, SessionState, SessionStatus, StopReason};
use crate::{
    capture::Frame,
    error::{CaptureError, CaptureResult},
    model::CaptureRegion,
    similarity::{NoChangeDetector, Similarity},
};

/// What recording one frame did to the session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameOutcome {
    /// Zero-based index of the appended frame
    pub index:           usize,
    /// Similarity to the previous frame; `None` for the first frame
    pub similarity:      Option<Similarity>,
    /// Streak after this frame
    pub no_change_count: u32,
    /// The streak reached its limit; the caller should stop the session
    pub end_of_content:  bool,
}

/// Frames and counters of one capture session
#[derive(Debug, Clone)]
pub struct CaptureSession {
    region:               CaptureRegion,
    state:                SessionState,
    frames:               Vec<Frame>,
    no_change_count:      u32,
    region_height:        u32,
    detector:             NoChangeDetector,
    max_no_change_streak: u32,
}

impl CaptureSession {
    /// Creates an idle session for `region`
    pub fn new(region: CaptureRegion, config: &SessionConfig) -> Self {
        Self {
            region,
            state: SessionState::Idle,
            frames: Vec::new(),
            no_change_count: 0,
            region_height: 0,
            detector: NoChangeDetector::new(config.similarity_threshold),
            max_no_change_streak: config.max_no_change_streak.max(1),
        }
    }

    /// `Idle -> Recording`
    ///
    /// Fails with `SessionAlreadyRunning` if the session is recording and
    /// with `InvalidParameter` once it has stopped. A stopped session stays
    /// frozen until [`clear`](Self::clear) returns it to `Idle`.
    pub fn begin(&mut self) -> CaptureResult<()> {
        match self.state {
            SessionState::Idle => {
                self.state = SessionState::Recording;
                Ok(())
            }
            SessionState::Recording => Err(CaptureError::SessionAlreadyRunning),
            SessionState::Stopped(reason) => Err(CaptureError::InvalidParameter {
                parameter: "session_state".to_string(),
                reason:    format!("session already stopped ({})", reason),
            }),
        }
    }

    /// Appends a frame and updates the no-change streak
    ///
    /// The first frame sets the region height and resets the streak. Every
    /// later frame is compared with its predecessor: a match at or above the
    /// threshold extends the streak, anything else resets it. The frame is
    /// appended either way.
    ///
    /// Fails without changing anything if the session is not recording or
    /// the frame's size differs from the first frame.
    pub fn record(&mut self, frame: Frame) -> CaptureResult<FrameOutcome> {
        if !self.state.is_recording() {
            return Err(CaptureError::InvalidParameter {
                parameter: "session_state".to_string(),
                reason:    format!("cannot record frames while {:?}", self.state),
            });
        }

        let similarity = match self.frames.last() {
            None => {
                self.region_height = frame.height();
                self.no_change_count = 0;
                None
            }
            Some(previous) => {
                if previous.dimensions() != frame.dimensions() {
                    return Err(CaptureError::FrameSizeMismatch {
                        index:    self.frames.len(),
                        expected: previous.dimensions(),
                        actual:   frame.dimensions(),
                    });
                }

                let (similarity, unchanged) = self.detector.compare(previous, &frame);
                if unchanged {
                    self.no_change_count += 1;
                } else {
                    self.no_change_count = 0;
                }
                Some(similarity)
            }
        };

        self.frames.push(frame);

        Ok(FrameOutcome {
            index: self.frames.len() - 1,
            similarity,
            no_change_count: self.no_change_count,
            end_of_content: self.no_change_count >= self.max_no_change_streak,
        })
    }

    /// Freezes the session; further `record` calls fail
    pub fn stop(&mut self, reason: StopReason) {
        self.state = SessionState::Stopped(reason);
    }

    /// Discards all frames and returns to `Idle`
    pub fn clear(&mut self) {
        self.frames.clear();
        self.no_change_count = 0;
        self.region_height = 0;
        self.state = SessionState::Idle;
    }

    pub fn region(&self) -> CaptureRegion {
        self.region
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Hands the frames over, typically to the stitcher
    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn no_change_count(&self) -> u32 {
        self.no_change_count
    }

    /// Height of the first frame, or 0 before any frame
    pub fn region_height(&self) -> u32 {
        self.region_height
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            state:           self.state,
            frame_count:     self.frames.len(),
            no_change_count: self.no_change_count,
        }
    }
}
