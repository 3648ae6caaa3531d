//! Image encoding for composites
//!
//! Composites are RGB, so both formats encode the raw buffer directly with
//! no alpha handling.
//!
//! - **PNG**: lossless, three compression levels (Fast, Default, Best)
//! - **JPEG**: lossy, quality 1-100
//!
//! # Examples
//!
//! ```
//! use image::RgbImage;
//! use scrollshot_core::{model::ExportOptions, model::ImageFormat, util::encode::encode_image};
//!
//! let image = RgbImage::new(64, 64);
//! let png = encode_image(&image, ImageFormat::Png, &ExportOptions::default()).unwrap();
//! assert_eq!(&png[1..4], b"PNG");
//! ```

use std::io::Cursor;

use image::{
    ImageEncoder, RgbImage,
    codecs::{
        jpeg::JpegEncoder,
        png::{CompressionType, FilterType, PngEncoder},
    },
};

use crate::{
    error::{CaptureError, CaptureResult},
    model::{ExportOptions, ImageFormat, PngCompression},
};

fn compression_type(compression: PngCompression) -> CompressionType {
    match compression {
        PngCompression::Fast => CompressionType::Fast,
        PngCompression::Default => CompressionType::Default,
        PngCompression::Best => CompressionType::Best,
    }
}

fn check_dimensions(image: &RgbImage) -> CaptureResult<()> {
    if image.width() == 0 || image.height() == 0 {
        return Err(CaptureError::InvalidParameter {
            parameter: "dimensions".to_string(),
            reason:    "Image dimensions must be > 0".to_string(),
        });
    }
    Ok(())
}

/// Encodes an image as PNG
///
/// Uses the adaptive filter, which picks a filter per scanline.
pub fn encode_png(image: &RgbImage, compression: PngCompression) -> CaptureResult<Vec<u8>> {
    check_dimensions(image)?;

    let mut output = Vec::new();
    let encoder = PngEncoder::new_with_quality(
        Cursor::new(&mut output),
        compression_type(compression),
        FilterType::Adaptive,
    );

    encoder
        .write_image(image.as_raw(), image.width(), image.height(), image::ExtendedColorType::Rgb8)
        .map_err(|e| CaptureError::EncodingFailed {
            format: "png".to_string(),
            reason: e.to_string(),
        })?;

    Ok(output)
}

/// Encodes an image as JPEG
///
/// `quality` is clamped to 1-100.
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> CaptureResult<Vec<u8>> {
    check_dimensions(image)?;

    let quality = quality.clamp(1, 100);
    let mut output = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut output), quality);

    encoder
        .write_image(image.as_raw(), image.width(), image.height(), image::ExtendedColorType::Rgb8)
        .map_err(|e| CaptureError::EncodingFailed {
            format: "jpeg".to_string(),
            reason: e.to_string(),
        })?;

    Ok(output)
}

/// Encodes an image in `format` using the PNG/JPEG settings in `opts`
pub fn encode_image(
    image: &RgbImage,
    format: ImageFormat,
    opts: &ExportOptions,
) -> CaptureResult<Vec<u8>> {
    match format {
        ImageFormat::Png => encode_png(image, opts.png_compression),
        ImageFormat::Jpeg => encode_jpeg(image, opts.jpeg_quality),
    }
}

#[cfg(test)]
mod tests {
    use image::{GenericImageView, Rgb};

    use super::*;

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]))
    }

    #[test]
    fn test_encode_png_lossless() {
        let image = gradient(100, 50);
        let encoded = encode_png(&image, PngCompression::Fast).unwrap();

        let decoded = image::load_from_memory(&encoded).unwrap();
        assert_eq!(decoded.dimensions(), (100, 50));
        assert_eq!(decoded.to_rgb8(), image);
    }

    #[test]
    fn test_encode_png_compression_levels() {
        let image = gradient(200, 200);
        for level in [PngCompression::Fast, PngCompression::Default, PngCompression::Best] {
            let encoded = encode_png(&image, level).unwrap();
            assert_eq!(&encoded[1..4], b"PNG");
        }
    }

    #[test]
    fn test_encode_jpeg_signature() {
        let encoded = encode_jpeg(&gradient(64, 64), 80).unwrap();
        assert_eq!(&encoded[0..2], &[0xff, 0xd8]);
    }

    #[test]
    fn test_encode_jpeg_quality_clamped() {
        assert!(encode_jpeg(&gradient(16, 16), 0).is_ok());
        assert!(encode_jpeg(&gradient(16, 16), 255).is_ok());
    }

    #[test]
    fn test_encode_rejects_empty_image() {
        let empty = RgbImage::new(0, 0);
        assert!(matches!(
            encode_png(&empty, PngCompression::Fast),
            Err(CaptureError::InvalidParameter { .. })
        ));
        assert!(encode_jpeg(&empty, 90).is_err());
    }

    #[test]
    fn test_encode_image_dispatch() {
        let image = gradient(32, 32);
        let opts = ExportOptions::default();

        let png = encode_image(&image, ImageFormat::Png, &opts).unwrap();
        let jpeg = encode_image(&image, ImageFormat::Jpeg, &opts).unwrap();
        assert_eq!(&png[1..4], b"PNG");
        assert_eq!(&jpeg[0..2], &[0xff, 0xd8]);
    }
}
