//! Capability traits for capture backends
//!
//! The capture loop needs exactly two things from the platform: a way to
//! grab the pixels of a screen rectangle and a way to scroll whatever is
//! under it. Each is its own trait so tests can script one while recording
//! the other, and so a platform with capture but no synthetic input can
//! still run in manual mode.
//!
//! - [`RegionCapture`]: capture a screen rectangle (X11, mock)
//! - [`ScrollTrigger`]: scroll the surface under the region (X11, mock)

use async_trait::async_trait;

use super::Frame;
use crate::{error::CaptureResult, model::CaptureRegion};

/// Capability: backend can capture a screen rectangle.
#[async_trait]
pub trait RegionCapture: Send + Sync {
    /// Captures the pixels currently inside `region`.
    ///
    /// The returned frame is exactly `region.width x region.height`.
    /// Failures are reported as [`CaptureError::CaptureFailed`] or
    /// [`CaptureError::CaptureTimeout`]; the capture loop treats both as
    /// transient.
    ///
    /// [`CaptureError::CaptureFailed`]: crate::error::CaptureError::CaptureFailed
    /// [`CaptureError::CaptureTimeout`]: crate::error::CaptureError::CaptureTimeout
    async fn capture_region(&self, region: &CaptureRegion) -> CaptureResult<Frame>;
}

/// Capability: backend can scroll the surface under the capture region.
#[async_trait]
pub trait ScrollTrigger: Send + Sync {
    /// Scrolls by `delta` pixels; negative scrolls the content down (reveals
    /// what is below), positive scrolls up.
    async fn scroll(&self, delta: i32) -> CaptureResult<()>;
}
