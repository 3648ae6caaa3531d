//! Saving composites to disk
//!
//! The output format follows the file extension unless
//! [`ExportOptions::format`] overrides it: `.jpg`/`.jpeg` write JPEG,
//! anything else writes PNG. Without an explicit path the composite goes to
//! a timestamped `long_screenshot_*.png` in the given directory.

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Local};
use image::RgbImage;

use super::encode::encode_image;
use crate::{
    error::CaptureResult,
    model::{ExportOptions, ImageFormat},
    stitch::StitchResult,
};

/// Prefix of generated file names
const FILE_NAME_PREFIX: &str = "long_screenshot";

/// Default file name for a composite saved at `timestamp`
///
/// # Examples
///
/// ```
/// use chrono::{Local, TimeZone};
/// use scrollshot_core::util::export::default_file_name;
///
/// let at = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
/// assert_eq!(default_file_name(at), "long_screenshot_20240309_140507.png");
/// ```
pub fn default_file_name(timestamp: DateTime<Local>) -> String {
    format!("{}_{}.png", FILE_NAME_PREFIX, timestamp.format("%Y%m%d_%H%M%S"))
}

/// `dir` joined with a default file name for the current time
pub fn default_output_path(dir: &Path) -> PathBuf {
    dir.join(default_file_name(Local::now()))
}

/// Format written for `path` under `opts`
pub fn format_for_path(path: &Path, opts: &ExportOptions) -> ImageFormat {
    opts.format.unwrap_or_else(|| {
        ImageFormat::from_extension(path.extension().and_then(|ext| ext.to_str()))
    })
}

/// Encodes the composite and writes it to `path`
///
/// Parent directories are created as needed. Returns the number of bytes
/// written.
pub fn export_to_file(
    result: &StitchResult,
    path: &Path,
    opts: &ExportOptions,
) -> CaptureResult<u64> {
    let bytes = write_image(result.image(), path, opts)?;
    tracing::info!(
        "Saved {}x{} composite to {} ({} bytes)",
        result.width(),
        result.height(),
        path.display(),
        bytes
    );
    Ok(bytes)
}

/// Writes a copy of the composite scaled down to at most `max_width`
///
/// Narrower composites are written at full size. Returns the number of
/// bytes written.
pub fn export_preview(
    result: &StitchResult,
    path: &Path,
    max_width: u32,
    opts: &ExportOptions,
) -> CaptureResult<u64> {
    let preview = result.preview(max_width);
    let bytes = write_image(&preview, path, opts)?;
    tracing::info!(
        "Saved {}x{} preview to {} ({} bytes)",
        preview.width(),
        preview.height(),
        path.display(),
        bytes
    );
    Ok(bytes)
}

fn write_image(image: &RgbImage, path: &Path, opts: &ExportOptions) -> CaptureResult<u64> {
    let format = format_for_path(path, opts);
    let bytes = encode_image(image, format, opts)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, &bytes)?;

    tracing::debug!("Wrote {} bytes of {} to {}", bytes.len(), format.extension(), path.display());
    Ok(bytes.len() as u64)
}
