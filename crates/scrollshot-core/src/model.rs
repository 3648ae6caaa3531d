//! Data models and type definitions for scrollshot
//!
//! This module defines the value types shared across the crate:
//! - Platform and backend detection types
//! - The capture region selected before a session starts
//! - Stitch modes and grid parameters
//! - Export formats and options

use serde::{Deserialize, Serialize};

use crate::{
    capture::constants::{DEFAULT_GRID_BACKGROUND, DEFAULT_GRID_GAP, DEFAULT_GRID_MAX_COLUMNS},
    error::{CaptureError, CaptureResult},
};

/// Represents the display backend type for the current platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    /// No backend detected or not yet initialized
    None,
    /// Wayland display server (Linux)
    Wayland,
    /// X11 display server (Linux)
    X11,
    /// Windows desktop
    Windows,
    /// macOS desktop
    #[serde(rename = "macos")]
    MacOS,
}

impl BackendType {
    /// Returns the backend type as a lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendType::None => "none",
            BackendType::Wayland => "wayland",
            BackendType::X11 => "x11",
            BackendType::Windows => "windows",
            BackendType::MacOS => "macos",
        }
    }
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Platform information including OS and display backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformInfo {
    /// Operating system name (e.g., "linux", "windows", "macos")
    pub os:      String,
    /// Detected display backend
    pub backend: BackendType,
}

impl PlatformInfo {
    /// Creates a new PlatformInfo instance
    pub fn new(os: String, backend: BackendType) -> Self {
        Self { os, backend }
    }
}

/// Fixed screen rectangle sampled during one capture session
///
/// Coordinates are in screen space and may be negative on multi-monitor
/// layouts. Width and height are always positive; use [`CaptureRegion::new`]
/// or [`CaptureRegion::from_corners`] to construct one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRegion {
    /// Left edge in screen coordinates
    pub x:      i32,
    /// Top edge in screen coordinates
    pub y:      i32,
    /// Width in pixels (> 0)
    pub width:  u32,
    /// Height in pixels (> 0)
    pub height: u32,
}

impl CaptureRegion {
    /// Creates a region, rejecting zero width or height
    ///
    /// # Examples
    ///
    /// ```
    /// use scrollshot_core::model::CaptureRegion;
    ///
    /// let region = CaptureRegion::new(0, 0, 800, 100).unwrap();
    /// assert_eq!(region.dimensions(), (800, 100));
    ///
    /// assert!(CaptureRegion::new(0, 0, 0, 100).is_err());
    /// ```
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> CaptureResult<Self> {
        if width == 0 || height == 0 {
            return Err(CaptureError::InvalidRegion {
                reason: format!("{}x{} has no area", width, height),
            });
        }

        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// Creates a region from two opposite corners of a drag selection
    ///
    /// The corners may be given in any order; the rectangle spans from the
    /// smaller to the larger coordinate on each axis.
    ///
    /// # Examples
    ///
    /// ```
    /// use scrollshot_core::model::CaptureRegion;
    ///
    /// // Dragged from bottom-right to top-left
    /// let region = CaptureRegion::from_corners((500, 400), (100, 300)).unwrap();
    /// assert_eq!((region.x, region.y), (100, 300));
    /// assert_eq!(region.dimensions(), (400, 100));
    /// ```
    pub fn from_corners(start: (i32, i32), end: (i32, i32)) -> CaptureResult<Self> {
        let left = start.0.min(end.0);
        let top = start.1.min(end.1);
        let width = start.0.abs_diff(end.0);
        let height = start.1.abs_diff(end.1);

        Self::new(left, top, width, height)
    }

    /// Returns (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the center point, useful for aiming scroll events
    pub fn center(&self) -> (i32, i32) {
        (
            self.x.saturating_add((self.width / 2) as i32),
            self.y.saturating_add((self.height / 2) as i32),
        )
    }
}

impl std::fmt::Display for CaptureRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{} at ({}, {})", self.width, self.height, self.x, self.y)
    }
}

/// Layout parameters for grid stitching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridParams {
    /// Gap between cells and around the border, in pixels
    pub gap:         u32,
    /// Largest column count considered by the layout search
    pub max_columns: u32,
    /// RGB fill for gaps and empty cells
    pub background:  [u8; 3],
}

impl Default for GridParams {
    fn default() -> Self {
        Self {
            gap:         DEFAULT_GRID_GAP,
            max_columns: DEFAULT_GRID_MAX_COLUMNS,
            background:  DEFAULT_GRID_BACKGROUND,
        }
    }
}

/// Composite layout applied to the captured frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum StitchMode {
    /// One long strip, frames stacked top to bottom
    #[default]
    Vertical,
    /// Rows of frames, left to right then top to bottom
    Grid(GridParams),
}

impl StitchMode {
    /// Grid mode with default gap, column limit and white background
    pub fn grid() -> Self {
        StitchMode::Grid(GridParams::default())
    }

    /// Returns the mode name ("vertical" or "grid")
    pub fn as_str(&self) -> &'static str {
        match self {
            StitchMode::Vertical => "vertical",
            StitchMode::Grid(_) => "grid",
        }
    }
}

impl std::fmt::Display for StitchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Output image format for exported composites
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// Lossless PNG
    Png,
    /// Lossy JPEG (no alpha)
    Jpeg,
}

impl ImageFormat {
    /// Returns the preferred file extension, without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
        }
    }

    /// Picks a format from a file extension
    ///
    /// `.jpg` and `.jpeg` select JPEG; every other extension (or none)
    /// falls back to PNG.
    pub fn from_extension(ext: Option<&str>) -> Self {
        match ext.map(|e| e.to_ascii_lowercase()).as_deref() {
            Some("jpg") | Some("jpeg") => ImageFormat::Jpeg,
            _ => ImageFormat::Png,
        }
    }
}

/// PNG compression effort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PngCompression {
    /// Fastest encoding, largest files
    #[default]
    Fast,
    /// Balanced
    Default,
    /// Smallest files, slowest encoding
    Best,
}

/// Options for encoding and saving a composite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Explicit format; `None` infers it from the output path
    pub format:          Option<ImageFormat>,
    /// JPEG quality (1-100)
    pub jpeg_quality:    u8,
    /// PNG compression effort
    pub png_compression: PngCompression,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format:          None,
            jpeg_quality:    100,
            png_compression: PngCompression::Fast,
        }
    }
}
