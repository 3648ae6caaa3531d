//! Frame fixtures
//!
//! Frames here are built so similarity between any two of them is known
//! exactly: [`solid_frame`]s of different colors share no pixels, and
//! [`distinct_frame`]s with different seeds differ in every pixel.

use image::{Rgb, RgbImage};
use scrollshot_core::capture::Frame;

/// Frame filled with one color
pub fn solid_frame(width: u32, height: u32, color: [u8; 3]) -> Frame {
    Frame::filled(width, height, color)
}

/// Patterned frame whose every pixel differs from any other seed's
///
/// The blue channel carries the seed, so frames with different seeds are 0%
/// similar while still having visible structure.
pub fn distinct_frame(width: u32, height: u32, seed: u8) -> Frame {
    Frame::new(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, seed])
    }))
}

/// Frame that differs from `base` in exactly `changed` pixels
///
/// Pixels are changed in row-major order by inverting them.
pub fn with_changed_pixels(base: &Frame, changed: u32) -> Frame {
    let mut image = base.as_image().clone();
    let width = image.width().max(1);
    for i in 0..changed.min(image.width() * image.height()) {
        let pixel = image.get_pixel_mut(i % width, i / width);
        pixel.0 = pixel.0.map(|c| 255 - c);
    }
    Frame::new(image)
}

/// Capture script of a page with `pages` screens of content
///
/// Returns `pages` distinct frames. A scripted capture repeats the last one
/// once the script runs out, which is what a real page does at its end.
pub fn scrolling_page(width: u32, height: u32, pages: u8) -> Vec<Frame> {
    (0..pages).map(|seed| distinct_frame(width, height, seed)).collect()
}

/// `count` copies of one frame
pub fn identical_frames(width: u32, height: u32, count: usize) -> Vec<Frame> {
    vec![solid_frame(width, height, [40, 40, 40]); count]
}
