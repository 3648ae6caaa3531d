//! Captured frame type
//!
//! A [`Frame`] is one RGB snapshot of the capture region. Frames are
//! immutable once captured: similarity checks borrow them, the stitcher
//! copies them onto a canvas, and crop returns a new frame.
//!
//! # Examples
//!
//! ```
//! use scrollshot_core::capture::Frame;
//!
//! let frame = Frame::from_test_pattern(1920, 1080);
//!
//! let strip = frame.crop(0, 100, 1920, 100).unwrap();
//! assert_eq!(strip.dimensions(), (1920, 100));
//! ```

use image::{DynamicImage, RgbImage, RgbaImage};

use crate::error::{CaptureError, CaptureResult};

/// One RGB snapshot of the capture region
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    inner: RgbImage,
}

impl Frame {
    /// Wraps an RGB image
    pub fn new(image: RgbImage) -> Self {
        Self { inner: image }
    }

    /// Converts any decoded image to RGB, dropping alpha
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self::new(image.to_rgb8())
    }

    /// Converts an RGBA screen grab to RGB
    ///
    /// Capture backends hand back RGBA; similarity and stitching only look at
    /// the color channels.
    pub fn from_rgba(image: RgbaImage) -> Self {
        Self::from_dynamic(DynamicImage::ImageRgba8(image))
    }

    /// Creates a frame filled with a single color
    ///
    /// # Examples
    ///
    /// ```
    /// use scrollshot_core::capture::Frame;
    ///
    /// let frame = Frame::filled(4, 2, [255, 0, 0]);
    /// assert_eq!(frame.as_raw()[..3], [255, 0, 0]);
    /// ```
    pub fn filled(width: u32, height: u32, color: [u8; 3]) -> Self {
        Self::new(RgbImage::from_pixel(width, height, image::Rgb(color)))
    }

    /// Creates a gradient test pattern
    ///
    /// Red increases left to right, green top to bottom, blue is fixed.
    pub fn from_test_pattern(width: u32, height: u32) -> Self {
        let image = RgbImage::from_fn(width, height, |x, y| {
            let r = ((x as f32 / width.max(1) as f32) * 255.0) as u8;
            let g = ((y as f32 / height.max(1) as f32) * 255.0) as u8;
            image::Rgb([r, g, 128])
        });
        Self::new(image)
    }

    /// Returns (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        self.inner.dimensions()
    }

    /// Returns the frame width in pixels
    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    /// Returns the frame height in pixels
    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    /// Row-major RGB bytes, three per pixel
    pub fn as_raw(&self) -> &[u8] {
        self.inner.as_raw()
    }

    /// Borrows the underlying image
    pub fn as_image(&self) -> &RgbImage {
        &self.inner
    }

    /// Consumes the frame, returning the underlying image
    pub fn into_image(self) -> RgbImage {
        self.inner
    }

    /// Crops to a rectangle inside the frame
    ///
    /// Returns `InvalidParameter` if the rectangle is empty or reaches past
    /// the frame edges.
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> CaptureResult<Self> {
        let (frame_width, frame_height) = self.dimensions();

        if width == 0 || height == 0 {
            return Err(CaptureError::InvalidParameter {
                parameter: "crop".to_string(),
                reason:    format!("{}x{} has no area", width, height),
            });
        }

        let fits_x = x.checked_add(width).is_some_and(|right| right <= frame_width);
        let fits_y = y.checked_add(height).is_some_and(|bottom| bottom <= frame_height);
        if !fits_x || !fits_y {
            return Err(CaptureError::InvalidParameter {
                parameter: "crop".to_string(),
                reason:    format!(
                    "{}x{} at ({}, {}) extends beyond frame bounds ({}x{})",
                    width, height, x, y, frame_width, frame_height
                ),
            });
        }

        let cropped = image::imageops::crop_imm(&self.inner, x, y, width, height).to_image();
        Ok(Self::new(cropped))
    }
}

impl From<RgbImage> for Frame {
    fn from(image: RgbImage) -> Self {
        Self::new(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filled_frame() {
        let frame = Frame::filled(3, 2, [10, 20, 30]);
        assert_eq!(frame.dimensions(), (3, 2));
        assert_eq!(frame.as_raw().len(), 3 * 2 * 3);
        assert!(frame.as_raw().chunks_exact(3).all(|px| px == [10, 20, 30]));
    }

    #[test]
    fn test_from_rgba_drops_alpha() {
        let rgba = RgbaImage::from_pixel(2, 2, image::Rgba([1, 2, 3, 0]));
        let frame = Frame::from_rgba(rgba);
        assert_eq!(frame.as_raw(), &[1, 2, 3, 1, 2, 3, 1, 2, 3, 1, 2, 3]);
    }

    #[test]
    fn test_test_pattern_gradient() {
        let frame = Frame::from_test_pattern(100, 100);
        let left = frame.as_image().get_pixel(0, 0);
        let right = frame.as_image().get_pixel(99, 0);
        assert!(right[0] > left[0]);
        assert_eq!(left[2], 128);
    }

    #[test]
    fn test_crop_within_bounds() {
        let frame = Frame::from_test_pattern(200, 100);
        let cropped = frame.crop(50, 25, 100, 50).unwrap();
        assert_eq!(cropped.dimensions(), (100, 50));
        assert_eq!(cropped.as_image().get_pixel(0, 0), frame.as_image().get_pixel(50, 25));
    }

    #[test]
    fn test_crop_full_frame() {
        let frame = Frame::from_test_pattern(64, 32);
        assert_eq!(frame.crop(0, 0, 64, 32).unwrap(), frame);
    }

    #[test]
    fn test_crop_out_of_bounds() {
        let frame = Frame::from_test_pattern(100, 100);

        assert!(frame.crop(100, 0, 1, 1).is_err());
        assert!(frame.crop(50, 50, 51, 10).is_err());
        assert!(frame.crop(0, 0, 0, 10).is_err());
        assert!(frame.crop(u32::MAX, 0, 2, 2).is_err());

        let err = frame.crop(90, 90, 20, 20).unwrap_err();
        assert!(matches!(err, CaptureError::InvalidParameter { .. }));
    }
}
