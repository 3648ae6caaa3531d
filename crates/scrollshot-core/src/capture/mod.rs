//! Capture backend traits and implementations
//!
//! The capture loop talks to the platform through two capability traits:
//!
//! - [`RegionCapture`] - capture a fixed screen rectangle
//! - [`ScrollTrigger`] - scroll the surface under it
//!
//! [`CaptureBackend`] pairs one of each. Use [`create_default_backend()`]
//! for the current platform, or [`backend_from_mock`] in tests:
//!
//! ```rust,ignore
//! use scrollshot_core::capture::create_default_backend;
//!
//! let backend = create_default_backend(region, 1)?;
//! let frame = backend.capture.capture_region(&region).await?;
//! backend.scroll.scroll(-(region.height as i32)).await?;
//! ```
//!
//! ## Backend Support
//!
//! | Backend | RegionCapture | ScrollTrigger |
//! |---------|---------------|---------------|
//! | X11     | ✓ (xcap)      | ✓ (XTEST)     |
//! | Wayland | -             | -             |
//! | Mock    | ✓ (scripted)  | ✓ (recording) |

use std::sync::Arc;

use crate::{error::CaptureResult, model::CaptureRegion};

pub mod composite;
pub mod constants;
pub mod frame;
pub mod mock;
pub mod traits;

#[cfg(target_os = "linux")]
pub mod x11_backend;

pub use composite::{CaptureBackend, backend_from_mock};
#[cfg(target_os = "linux")]
pub use composite::backend_from_x11;
pub use frame::Frame;
pub use mock::{RecordingScroller, ScriptedCapture};
pub use traits::{RegionCapture, ScrollTrigger};
#[cfg(target_os = "linux")]
pub use x11_backend::{XcapRegionCapture, XtestScroller};

/// Creates the capture backend for the current platform.
///
/// Scroll events are aimed at the center of `region`, and each wheel notch
/// stands for `pixels_per_notch` pixels of scroll delta.
///
/// - **Linux/X11**: xcap capture with XTEST scrolling
/// - **Linux/Wayland**: `BackendNotAvailable` (no synthetic input for
///   ordinary clients)
/// - **Other platforms**: `BackendNotAvailable`
pub fn create_default_backend(
    region: CaptureRegion,
    pixels_per_notch: u32,
) -> CaptureResult<Arc<CaptureBackend>> {
    #[cfg(target_os = "linux")]
    {
        use crate::{error::CaptureError, model::BackendType};

        let platform = crate::util::detect::detect_platform();
        tracing::debug!("Detected {} display backend", platform.backend);

        match platform.backend {
            BackendType::X11 => {
                let capture = Arc::new(XcapRegionCapture::new()?);
                let scroll =
                    Arc::new(XtestScroller::new(pixels_per_notch)?.with_anchor(region.center()));
                Ok(Arc::new(backend_from_x11(capture, scroll)))
            }
            backend => Err(CaptureError::BackendNotAvailable { backend }),
        }
    }

    #[cfg(target_os = "windows")]
    {
        let _ = (region, pixels_per_notch);
        Err(crate::error::CaptureError::BackendNotAvailable {
            backend: crate::model::BackendType::Windows,
        })
    }

    #[cfg(target_os = "macos")]
    {
        let _ = (region, pixels_per_notch);
        Err(crate::error::CaptureError::BackendNotAvailable {
            backend: crate::model::BackendType::MacOS,
        })
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
    {
        let _ = (region, pixels_per_notch);
        Err(crate::error::CaptureError::BackendNotAvailable {
            backend: crate::model::BackendType::None,
        })
    }
}
