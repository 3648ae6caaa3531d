//! Backend facade pairing a capture capability with a scroll capability
//!
//! The capture loop takes one [`CaptureBackend`] and reaches the platform
//! only through its two trait objects. Factory functions below assemble the
//! facade for each supported platform and for tests.

use std::sync::Arc;

use super::{RegionCapture, ScrollTrigger};

/// Capture and scroll capabilities for one session
#[derive(Clone)]
pub struct CaptureBackend {
    /// Screen rectangle capture
    pub capture: Arc<dyn RegionCapture>,

    /// Scroll injection, used only when auto-scroll is enabled
    pub scroll: Arc<dyn ScrollTrigger>,

    /// Backend name for diagnostics
    pub name: &'static str,
}

impl CaptureBackend {
    /// Creates a backend from its two capabilities
    pub fn new(
        capture: Arc<dyn RegionCapture>,
        scroll: Arc<dyn ScrollTrigger>,
        name: &'static str,
    ) -> Self {
        Self {
            capture,
            scroll,
            name,
        }
    }
}

impl std::fmt::Debug for CaptureBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureBackend").field("name", &self.name).finish()
    }
}

// ============================================================================
// Factory Functions
// ============================================================================

/// Creates a backend from the scripted mocks.
pub fn backend_from_mock(
    capture: Arc<super::ScriptedCapture>,
    scroll: Arc<super::RecordingScroller>,
) -> CaptureBackend {
    CaptureBackend::new(capture, scroll, "mock")
}

/// Creates a backend for X11 (xcap capture, XTEST scrolling).
#[cfg(target_os = "linux")]
pub fn backend_from_x11(
    capture: Arc<super::XcapRegionCapture>,
    scroll: Arc<super::XtestScroller>,
) -> CaptureBackend {
    CaptureBackend::new(capture, scroll, "x11")
}
