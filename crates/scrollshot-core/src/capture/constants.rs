//! Centralized defaults and timing constants for scrolling capture.
//!
//! Every knob of the capture loop and the stitcher has its default here, so
//! the session config, the stitcher and the CLI agree on one set of values.
//!
//! # Runtime Configuration
//!
//! Timing values and the similarity threshold can be overridden at runtime
//! via environment variables:
//!
//! | Environment Variable | Default | Description |
//! |---------------------|---------|-------------|
//! | `SCROLLSHOT_SIMILARITY_THRESHOLD` | 0.90 | Ratio at which two frames count as unchanged |
//! | `SCROLLSHOT_SETTLE_DELAY_MS` | 500 | Wait after each scroll before the next capture |
//! | `SCROLLSHOT_MANUAL_INTERVAL_MS` | 200 | Capture interval when auto-scroll is off |
//! | `SCROLLSHOT_CAPTURE_BACKOFF_MS` | 200 | Wait before retrying a failed capture |
//! | `SCROLLSHOT_X11_CAPTURE_TIMEOUT_MS` | 2000 | X11 capture timeout |
//!
//! Values that fail to parse, or a threshold outside `0.0..=1.0`, fall back
//! to the default.

/// Similarity at or above which two consecutive frames count as unchanged.
///
/// Frames come from the same rectangle a fraction of a second apart, so
/// anything above 90% identical pixels means the scroll did not move new
/// content into view.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.90;

/// Consecutive unchanged frames that end a session.
///
/// Three rather than one, so a single slow repaint does not stop recording.
pub const DEFAULT_MAX_NO_CHANGE_STREAK: u32 = 3;

/// Wait after a scroll so the surface can finish rendering.
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 500;

/// Capture interval when auto-scroll is disabled.
pub const DEFAULT_MANUAL_CAPTURE_INTERVAL_MS: u64 = 200;

/// Wait before retrying after a failed capture.
pub const DEFAULT_CAPTURE_BACKOFF_MS: u64 = 200;

/// Capture timeout for the X11 backend.
///
/// xcap grabs the whole monitor and the region is cropped afterwards; on a
/// local display this takes well under 100ms.
pub const X11_CAPTURE_TIMEOUT_MS: u64 = 2000;

/// Pixels of scroll delta per emitted wheel notch on X11.
///
/// One notch per pixel reproduces the classic wheel-click behavior of
/// passing the region height straight through as the click count.
pub const DEFAULT_PIXELS_PER_NOTCH: u32 = 1;

/// Gap between grid cells, in pixels.
pub const DEFAULT_GRID_GAP: u32 = 20;

/// Largest column count the grid layout search tries.
pub const DEFAULT_GRID_MAX_COLUMNS: u32 = 6;

/// Grid background (white).
pub const DEFAULT_GRID_BACKGROUND: [u8; 3] = [255, 255, 255];

/// Smallest column count the grid layout uses.
pub const MIN_GRID_COLUMNS: u32 = 2;

/// Width previews are scaled down to.
pub const PREVIEW_MAX_WIDTH: u32 = 800;

// =============================================================================
// Environment Variable Overrides
// =============================================================================

/// Helper to get a value from an environment variable or fall back to default.
fn get_from_env<T: std::str::FromStr>(env_var: &str, default: T) -> T {
    std::env::var(env_var)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Get the similarity threshold, checking environment variable override.
///
/// Override with: `SCROLLSHOT_SIMILARITY_THRESHOLD`
pub fn similarity_threshold() -> f64 {
    let value = get_from_env("SCROLLSHOT_SIMILARITY_THRESHOLD", DEFAULT_SIMILARITY_THRESHOLD);
    if (0.0..=1.0).contains(&value) {
        value
    } else {
        DEFAULT_SIMILARITY_THRESHOLD
    }
}

/// Get the post-scroll settle delay, checking environment variable override.
///
/// Override with: `SCROLLSHOT_SETTLE_DELAY_MS`
///
/// # Example
///
/// ```bash
/// # Give slow web pages a full second to render after each scroll
/// export SCROLLSHOT_SETTLE_DELAY_MS=1000
/// ```
pub fn settle_delay_ms() -> u64 {
    get_from_env("SCROLLSHOT_SETTLE_DELAY_MS", DEFAULT_SETTLE_DELAY_MS)
}

/// Get the manual-mode capture interval, checking environment variable override.
///
/// Override with: `SCROLLSHOT_MANUAL_INTERVAL_MS`
pub fn manual_capture_interval_ms() -> u64 {
    get_from_env("SCROLLSHOT_MANUAL_INTERVAL_MS", DEFAULT_MANUAL_CAPTURE_INTERVAL_MS)
}

/// Get the capture retry backoff, checking environment variable override.
///
/// Override with: `SCROLLSHOT_CAPTURE_BACKOFF_MS`
pub fn capture_backoff_ms() -> u64 {
    get_from_env("SCROLLSHOT_CAPTURE_BACKOFF_MS", DEFAULT_CAPTURE_BACKOFF_MS)
}

/// Get the X11 capture timeout, checking environment variable override.
///
/// Override with: `SCROLLSHOT_X11_CAPTURE_TIMEOUT_MS`
///
/// # Example
///
/// ```bash
/// # Set timeout to 5 seconds for remote X11 connections
/// export SCROLLSHOT_X11_CAPTURE_TIMEOUT_MS=5000
/// ```
pub fn x11_capture_timeout_ms() -> u64 {
    get_from_env("SCROLLSHOT_X11_CAPTURE_TIMEOUT_MS", X11_CAPTURE_TIMEOUT_MS)
}
