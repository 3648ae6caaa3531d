//! Error types for scrolling capture and stitching
//!
//! This module defines the error type shared by the capture loop, the
//! stitcher and the export helpers. Each variant carries enough context to
//! produce a user-facing message, and [`CaptureError::remediation_hint`]
//! suggests what to do next.

use crate::model::BackendType;

/// Result type alias for capture operations
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Error type for capture, session and stitch operations
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// A session was started before any capture region was selected
    #[error("No capture region selected")]
    NoRegion,

    /// The capture region is degenerate or otherwise unusable
    #[error("Invalid capture region: {reason}")]
    InvalidRegion {
        /// Why the region was rejected
        reason: String,
    },

    /// A session is already recording
    #[error("A capture session is already running")]
    SessionAlreadyRunning,

    /// The background capture task ended abnormally
    #[error("Capture session task failed: {reason}")]
    SessionTaskFailed {
        /// Join error or panic message
        reason: String,
    },

    /// The capture capability returned no image
    #[error("Screen capture failed: {reason}")]
    CaptureFailed {
        /// Reason reported by the backend
        reason: String,
    },

    /// Capture operation timed out
    #[error("Capture operation timed out after {duration_ms}ms")]
    CaptureTimeout {
        /// Timeout duration in milliseconds
        duration_ms: u64,
    },

    /// The scroll capability could not scroll the target surface
    #[error("Scroll failed: {reason}")]
    ScrollFailed {
        /// Reason reported by the backend
        reason: String,
    },

    /// Stitching was requested with no frames
    #[error("Cannot stitch an empty frame sequence")]
    EmptyInput,

    /// A frame does not match the dimensions of the first frame
    #[error(
        "Frame {index} is {}x{}, expected {}x{}",
        .actual.0, .actual.1, .expected.0, .expected.1
    )]
    FrameSizeMismatch {
        /// Position of the offending frame in the sequence
        index:    usize,
        /// Dimensions of the first frame
        expected: (u32, u32),
        /// Dimensions of the offending frame
        actual:   (u32, u32),
    },

    /// Image encoding failed
    #[error("Failed to encode image as {format}: {reason}")]
    EncodingFailed {
        /// Image format that failed
        format: String,
        /// Reason for encoding failure
        reason: String,
    },

    /// Invalid parameter provided
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: String,
        /// Reason why it's invalid
        reason:    String,
    },

    /// No capture/scroll backend exists for this platform or session
    #[error("Backend {backend} is not available on this platform")]
    BackendNotAvailable {
        /// Backend type that's unavailable
        backend: BackendType,
    },

    /// I/O error occurred
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Image processing error
    #[error("Image processing error: {0}")]
    ImageError(String),
}

impl CaptureError {
    /// Returns true for failures the capture loop retries or tolerates
    ///
    /// Capture failures, timeouts and scroll failures never end a session;
    /// everything else is terminal for the operation that produced it.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CaptureError::CaptureFailed { .. }
                | CaptureError::CaptureTimeout { .. }
                | CaptureError::ScrollFailed { .. }
        )
    }

    /// Returns an actionable remediation hint for this error
    ///
    /// # Examples
    ///
    /// ```
    /// use scrollshot_core::error::CaptureError;
    ///
    /// let hint = CaptureError::NoRegion.remediation_hint();
    /// assert!(hint.contains("region"));
    /// ```
    pub fn remediation_hint(&self) -> &str {
        match self {
            CaptureError::NoRegion => {
                "Select a capture region (x, y, width, height) before starting a session."
            }
            CaptureError::InvalidRegion { .. } => {
                "The region must have a positive width and height. Drag a larger rectangle or \
                 check the coordinates."
            }
            CaptureError::SessionAlreadyRunning => {
                "Stop the running session and wait for it to finish before starting another one."
            }
            CaptureError::SessionTaskFailed { .. } => {
                "The background capture task stopped unexpectedly. Check the logs and start a \
                 new session."
            }
            CaptureError::CaptureFailed { .. } => {
                "Screen capture failed. The capture loop retries automatically; if this persists \
                 check display permissions and that the region is on screen."
            }
            CaptureError::CaptureTimeout { .. } => {
                "The capture took too long. The display server may be busy or unreachable. \
                 Increase SCROLLSHOT_X11_CAPTURE_TIMEOUT_MS on slow connections."
            }
            CaptureError::ScrollFailed { .. } => {
                "Scrolling failed. Make sure the pointer is over the scrollable content and the \
                 XTEST extension is available. Capture continues without scrolling."
            }
            CaptureError::EmptyInput => {
                "No frames were captured. Record at least one frame before stitching."
            }
            CaptureError::FrameSizeMismatch { .. } => {
                "All frames must share the first frame's size. Capture every frame from the same \
                 region."
            }
            CaptureError::EncodingFailed { format, .. } => match format.as_str() {
                "jpeg" | "jpg" => {
                    "JPEG encoding failed. Try a lower quality value or save as PNG instead."
                }
                _ => "Image encoding failed. Try a different format (PNG or JPEG).",
            },
            CaptureError::InvalidParameter { parameter, .. } => match parameter.as_str() {
                "similarity_threshold" => "The similarity threshold must be between 0.0 and 1.0.",
                "max_no_change_streak" => "The no-change streak must be at least 1.",
                "jpeg_quality" => "JPEG quality must be between 1 and 100.",
                _ => "Check the parameter value against the documentation.",
            },
            CaptureError::BackendNotAvailable { backend } => match backend {
                BackendType::Wayland => {
                    "Wayland does not allow synthetic scrolling from ordinary clients. Run the \
                     target application under XWayland or an X11 session."
                }
                BackendType::X11 => {
                    "X11 backend not available. Ensure you're running in an X11 session with \
                     DISPLAY environment variable set."
                }
                BackendType::Windows | BackendType::MacOS => {
                    "Live capture is only implemented for X11. Use the stitch command with \
                     screenshots taken by another tool."
                }
                BackendType::None => "No display server detected. Set DISPLAY for X11 capture.",
            },
            CaptureError::IoError(_) => {
                "An I/O error occurred. Check file permissions, disk space, and system resources."
            }
            CaptureError::ImageError(_) => {
                "Image processing failed. Ensure the image data is valid and the requested \
                 operations are supported."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_region_message() {
        let error = CaptureError::NoRegion;

        assert!(error.to_string().contains("No capture region"));
        assert!(error.remediation_hint().contains("Select a capture region"));
    }

    #[test]
    fn test_frame_size_mismatch_message() {
        let error = CaptureError::FrameSizeMismatch {
            index:    3,
            expected: (800, 100),
            actual:   (800, 90),
        };

        let msg = error.to_string();
        assert!(msg.contains("Frame 3"));
        assert!(msg.contains("800x90"));
        assert!(msg.contains("800x100"));
    }

    #[test]
    fn test_empty_input_message() {
        let error = CaptureError::EmptyInput;

        assert!(error.to_string().contains("empty"));
        assert!(error.remediation_hint().contains("at least one frame"));
    }

    #[test]
    fn test_transient_classification() {
        assert!(
            CaptureError::CaptureFailed {
                reason: "busy".to_string(),
            }
            .is_transient()
        );
        assert!(CaptureError::CaptureTimeout { duration_ms: 2000 }.is_transient());
        assert!(
            CaptureError::ScrollFailed {
                reason: "no xtest".to_string(),
            }
            .is_transient()
        );

        assert!(!CaptureError::NoRegion.is_transient());
        assert!(!CaptureError::EmptyInput.is_transient());
        assert!(!CaptureError::SessionAlreadyRunning.is_transient());
    }

    #[test]
    fn test_invalid_parameter_threshold_hint() {
        let error = CaptureError::InvalidParameter {
            parameter: "similarity_threshold".to_string(),
            reason:    "1.5 is out of range".to_string(),
        };

        assert!(error.to_string().contains("similarity_threshold"));
        assert!(error.remediation_hint().contains("0.0 and 1.0"));
    }

    #[test]
    fn test_backend_not_available_x11() {
        let error = CaptureError::BackendNotAvailable {
            backend: BackendType::X11,
        };

        assert!(error.to_string().contains("x11"));
        assert!(error.remediation_hint().contains("DISPLAY"));
    }

    #[test]
    fn test_backend_not_available_wayland() {
        let error = CaptureError::BackendNotAvailable {
            backend: BackendType::Wayland,
        };

        assert!(error.remediation_hint().contains("XWayland"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: CaptureError = io_error.into();

        assert!(error.to_string().contains("I/O error"));
        assert!(error.remediation_hint().contains("permissions"));
    }

    #[test]
    fn test_encoding_failed_jpeg_hint() {
        let error = CaptureError::EncodingFailed {
            format: "jpeg".to_string(),
            reason: "bad quality".to_string(),
        };

        assert!(error.to_string().contains("jpeg"));
        assert!(error.remediation_hint().contains("PNG"));
    }
}
