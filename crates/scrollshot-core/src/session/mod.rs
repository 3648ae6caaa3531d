//! Capture sessions
//!
//! A session records frames of one [`CaptureRegion`] until the content stops
//! changing or a stop is requested.
//!
//! - [`CaptureSession`] - the owned state machine (`Idle -> Recording -> Stopped`)
//! - [`CaptureLoop`] - the async task driving capture, compare, scroll and settle
//! - [`CaptureController`] - start/stop control surface for callers
//!
//! The loop task is the only writer of the session. The controller observes
//! it through a [`SessionStatus`] watch channel and a [`SessionEvent`]
//! stream, and gets the frozen session back when the task ends.
//!
//! [`CaptureRegion`]: crate::model::CaptureRegion

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    capture::constants,
    error::{CaptureError, CaptureResult},
    similarity::Similarity,
};

pub mod controller;
pub mod runner;
pub mod state;

pub use controller::{CaptureController, StopHandle};
pub use runner::CaptureLoop;
pub use state::{CaptureSession, FrameOutcome};

/// Tunables for one capture session
///
/// Missing fields in a deserialized config take their defaults, so a JSON
/// config file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Similarity at or above which a frame counts as unchanged
    pub similarity_threshold:       f64,
    /// Consecutive unchanged frames that end the session
    pub max_no_change_streak:       u32,
    /// Wait after each scroll, in milliseconds
    pub settle_delay_ms:            u64,
    /// Capture interval when auto-scroll is off, in milliseconds
    pub manual_capture_interval_ms: u64,
    /// Wait before retrying a failed capture, in milliseconds
    pub capture_backoff_ms:         u64,
    /// Scroll by one region height after each capture
    pub auto_scroll_enabled:        bool,
}

impl Default for SessionConfig {
    /// Defaults, with timing and threshold read through the
    /// `SCROLLSHOT_*` environment overrides
    fn default() -> Self {
        Self {
            similarity_threshold:       constants::similarity_threshold(),
            max_no_change_streak:       constants::DEFAULT_MAX_NO_CHANGE_STREAK,
            settle_delay_ms:            constants::settle_delay_ms(),
            manual_capture_interval_ms: constants::manual_capture_interval_ms(),
            capture_backoff_ms:         constants::capture_backoff_ms(),
            auto_scroll_enabled:        true,
        }
    }
}

impl SessionConfig {
    /// Starts a builder from the defaults
    ///
    /// # Examples
    ///
    /// ```
    /// use scrollshot_core::session::SessionConfig;
    ///
    /// let config = SessionConfig::builder()
    ///     .similarity_threshold(0.95)
    ///     .auto_scroll(false)
    ///     .build()
    ///     .unwrap();
    /// assert!(!config.auto_scroll_enabled);
    /// ```
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Checks the threshold range and the streak length
    pub fn validate(&self) -> CaptureResult<()> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(CaptureError::InvalidParameter {
                parameter: "similarity_threshold".to_string(),
                reason:    format!("{} is outside 0.0..=1.0", self.similarity_threshold),
            });
        }

        if self.max_no_change_streak == 0 {
            return Err(CaptureError::InvalidParameter {
                parameter: "max_no_change_streak".to_string(),
                reason:    "must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn manual_capture_interval(&self) -> Duration {
        Duration::from_millis(self.manual_capture_interval_ms)
    }

    pub fn capture_backoff(&self) -> Duration {
        Duration::from_millis(self.capture_backoff_ms)
    }
}

/// Builder for [`SessionConfig`]
#[derive(Debug, Clone)]
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    pub fn similarity_threshold(mut self, threshold: f64) -> Self {
        self.config.similarity_threshold = threshold;
        self
    }

    pub fn max_no_change_streak(mut self, streak: u32) -> Self {
        self.config.max_no_change_streak = streak;
        self
    }

    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.config.settle_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn manual_capture_interval(mut self, interval: Duration) -> Self {
        self.config.manual_capture_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn capture_backoff(mut self, backoff: Duration) -> Self {
        self.config.capture_backoff_ms = backoff.as_millis() as u64;
        self
    }

    pub fn auto_scroll(mut self, enabled: bool) -> Self {
        self.config.auto_scroll_enabled = enabled;
        self
    }

    /// Validates and returns the config
    pub fn build(self) -> CaptureResult<SessionConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Why a session stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The no-change streak reached its limit
    EndOfContent,
    /// A caller asked the session to stop
    StopRequested,
    /// The capture backend failed in a way retrying cannot fix
    BackendFailed,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::EndOfContent => write!(f, "end of content"),
            StopReason::StopRequested => write!(f, "stop requested"),
            StopReason::BackendFailed => write!(f, "backend failed"),
        }
    }
}

/// Lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    Recording,
    Stopped(StopReason),
}

impl SessionState {
    pub fn is_recording(&self) -> bool {
        matches!(self, SessionState::Recording)
    }
}

/// Snapshot of a session, published after every change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SessionStatus {
    pub state:           SessionState,
    pub frame_count:     usize,
    pub no_change_count: u32,
}

/// Progress notifications from the capture loop
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// The loop entered `Recording`
    Started,
    /// A frame was appended
    FrameCaptured {
        /// Zero-based position of the frame
        index:           usize,
        /// Similarity to the previous frame; `None` for the first frame
        similarity:      Option<Similarity>,
        /// Streak after this frame
        no_change_count: u32,
    },
    /// A capture attempt failed and will be retried
    CaptureFailed { reason: String },
    /// A scroll failed; capture continues
    ScrollFailed { reason: String },
    /// The loop entered `Stopped`
    Stopped {
        reason:      StopReason,
        frame_count: usize,
    },
}
