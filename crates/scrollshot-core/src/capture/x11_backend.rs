//! X11 backend using xcap for capture and XTEST for scrolling
//!
//! # Capture
//!
//! xcap captures whole monitors, so [`XcapRegionCapture`] grabs the monitor
//! containing the region's top-left corner and crops the region out of it.
//! A region that spans monitors fails with `CaptureFailed`; the capture loop
//! retries and the caller should pick a region on one monitor.
//!
//! # Scrolling
//!
//! [`XtestScroller`] synthesizes mouse wheel clicks through the XTEST
//! extension: button 4 scrolls up, button 5 scrolls down. A pixel delta is
//! converted to wheel notches with `pixels_per_notch`. When an anchor is set
//! the pointer is first moved there, so the wheel events land on the
//! content under the capture region.
//!
//! # Threading
//!
//! xcap and x11rb are blocking. Every operation runs on the blocking pool
//! and is bounded by the X11 capture timeout
//! (`SCROLLSHOT_X11_CAPTURE_TIMEOUT_MS`).

use async_trait::async_trait;
use x11rb::{
    connection::Connection,
    protocol::{
        xproto::{BUTTON_PRESS_EVENT, BUTTON_RELEASE_EVENT, MOTION_NOTIFY_EVENT},
        xtest::ConnectionExt as XtestConnectionExt,
    },
};

use super::{Frame, RegionCapture, ScrollTrigger, constants};
use crate::{
    error::{CaptureError, CaptureResult},
    model::{BackendType, CaptureRegion},
};

/// Wheel-up button
const BUTTON_WHEEL_UP: u8 = 4;

/// Wheel-down button
const BUTTON_WHEEL_DOWN: u8 = 5;

/// Wraps a future with the X11 timeout
async fn with_timeout<F, T>(future: F, timeout_ms: u64) -> CaptureResult<T>
where
    F: std::future::Future<Output = CaptureResult<T>>,
{
    tokio::time::timeout(std::time::Duration::from_millis(timeout_ms), future)
        .await
        .map_err(|_| {
            tracing::warn!("X11 operation timed out after {}ms", timeout_ms);
            CaptureError::CaptureTimeout {
                duration_ms: timeout_ms,
            }
        })?
}

fn require_display() -> CaptureResult<()> {
    match std::env::var("DISPLAY") {
        Ok(display) if !display.is_empty() => Ok(()),
        _ => Err(CaptureError::BackendNotAvailable {
            backend: BackendType::X11,
        }),
    }
}

/// Region capture via xcap monitor screenshots
#[derive(Debug)]
pub struct XcapRegionCapture {
    timeout_ms: u64,
}

impl XcapRegionCapture {
    /// Creates the capture backend
    ///
    /// Fails with `BackendNotAvailable` when `$DISPLAY` is not set. No X
    /// connection is opened until the first capture.
    pub fn new() -> CaptureResult<Self> {
        require_display()?;

        Ok(Self {
            timeout_ms: constants::x11_capture_timeout_ms(),
        })
    }

    fn capture_blocking(region: CaptureRegion) -> CaptureResult<Frame> {
        let capture_failed = |reason: String| CaptureError::CaptureFailed { reason };

        let monitor = xcap::Monitor::from_point(region.x, region.y)
            .map_err(|e| capture_failed(format!("no monitor at ({}, {}): {}", region.x, region.y, e)))?;
        let monitor_x = monitor.x().map_err(|e| capture_failed(e.to_string()))?;
        let monitor_y = monitor.y().map_err(|e| capture_failed(e.to_string()))?;

        let screenshot = monitor.capture_image().map_err(|e| {
            tracing::error!("xcap monitor capture failed: {}", e);
            capture_failed(e.to_string())
        })?;
        let (width, height) = (screenshot.width(), screenshot.height());

        let rgba = image::RgbaImage::from_raw(width, height, screenshot.into_raw())
            .ok_or_else(|| capture_failed("monitor buffer size mismatch".to_string()))?;
        let full = Frame::from_rgba(rgba);

        // Both offsets are non-negative: from_point returned the monitor
        // containing the corner.
        let local_x = region.x.saturating_sub(monitor_x).max(0) as u32;
        let local_y = region.y.saturating_sub(monitor_y).max(0) as u32;

        full.crop(local_x, local_y, region.width, region.height)
            .map_err(|e| capture_failed(format!("region {} not on one monitor: {}", region, e)))
    }
}

#[async_trait]
impl RegionCapture for XcapRegionCapture {
    async fn capture_region(&self, region: &CaptureRegion) -> CaptureResult<Frame> {
        let region = *region;
        tracing::debug!("X11 capture_region: {}", region);

        let task = tokio::task::spawn_blocking(move || Self::capture_blocking(region));

        with_timeout(
            async {
                task.await.map_err(|e| {
                    tracing::error!("Region capture task panicked: {}", e);
                    CaptureError::CaptureFailed {
                        reason: e.to_string(),
                    }
                })?
            },
            self.timeout_ms,
        )
        .await
    }
}

/// Wheel scrolling via the XTEST extension
#[derive(Debug)]
pub struct XtestScroller {
    pixels_per_notch: u32,
    anchor:           Option<(i32, i32)>,
    timeout_ms:       u64,
}

impl XtestScroller {
    /// Creates the scroller
    ///
    /// `pixels_per_notch` below 1 is treated as 1. Fails with
    /// `BackendNotAvailable` when `$DISPLAY` is not set.
    pub fn new(pixels_per_notch: u32) -> CaptureResult<Self> {
        require_display()?;

        Ok(Self {
            pixels_per_notch: pixels_per_notch.max(1),
            anchor:           None,
            timeout_ms:       constants::x11_capture_timeout_ms(),
        })
    }

    /// Moves the pointer to `point` before each scroll
    pub fn with_anchor(mut self, point: (i32, i32)) -> Self {
        self.anchor = Some(point);
        self
    }

    fn scroll_blocking(
        button: u8,
        notches: u32,
        anchor: Option<(i32, i32)>,
    ) -> Result<(), String> {
        let (conn, screen_num) = x11rb::connect(None).map_err(|e| e.to_string())?;
        let root = conn
            .setup()
            .roots
            .get(screen_num)
            .map(|screen| screen.root)
            .ok_or_else(|| format!("screen {} not found", screen_num))?;

        if let Some((x, y)) = anchor {
            conn.xtest_fake_input(
                MOTION_NOTIFY_EVENT,
                0,
                x11rb::CURRENT_TIME,
                root,
                clamp_i16(x),
                clamp_i16(y),
                0,
            )
            .map_err(|e| e.to_string())?;
        }

        for _ in 0..notches {
            for event in [BUTTON_PRESS_EVENT, BUTTON_RELEASE_EVENT] {
                conn.xtest_fake_input(event, button, x11rb::CURRENT_TIME, root, 0, 0, 0)
                    .map_err(|e| e.to_string())?;
            }
            conn.flush().map_err(|e| e.to_string())?;
        }

        conn.flush().map_err(|e| e.to_string())
    }
}

#[async_trait]
impl ScrollTrigger for XtestScroller {
    async fn scroll(&self, delta: i32) -> CaptureResult<()> {
        let (button, notches) = wheel_clicks(delta, self.pixels_per_notch);
        if notches == 0 {
            return Ok(());
        }

        tracing::debug!("XTEST scroll: {} notches on button {}", notches, button);
        let anchor = self.anchor;
        let task = tokio::task::spawn_blocking(move || Self::scroll_blocking(button, notches, anchor));

        with_timeout(
            async {
                task.await
                    .map_err(|e| e.to_string())
                    .and_then(|result| result)
                    .map_err(|reason| {
                        tracing::warn!("XTEST scroll failed: {}", reason);
                        CaptureError::ScrollFailed { reason }
                    })
            },
            self.timeout_ms,
        )
        .await
    }
}

/// Converts a pixel delta to (wheel button, notch count)
///
/// Negative deltas scroll down. Partial notches round up so any non-zero
/// delta moves the content.
fn wheel_clicks(delta: i32, pixels_per_notch: u32) -> (u8, u32) {
    let button = if delta < 0 {
        BUTTON_WHEEL_DOWN
    } else {
        BUTTON_WHEEL_UP
    };
    (button, delta.unsigned_abs().div_ceil(pixels_per_notch.max(1)))
}

fn clamp_i16(value: i32) -> i16 {
    value.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}
