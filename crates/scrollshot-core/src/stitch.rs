//! Composite image assembly
//!
//! [`stitch`] turns an ordered frame sequence into one image:
//!
//! - **Vertical**: frames stacked top to bottom with no gaps. The canvas is
//!   as wide as the first frame and as tall as all frames together.
//! - **Grid**: frames laid out left to right, top to bottom, with a gap
//!   around every cell. The column count is picked to make the canvas as
//!   close to square as possible.
//!
//! Stitching is pure: the frames are only read, and the same input always
//! gives the same output.

use image::{Rgb, RgbImage, imageops};
use serde::Serialize;

use crate::{
    capture::{Frame, constants::MIN_GRID_COLUMNS},
    error::{CaptureError, CaptureResult},
    model::{GridParams, StitchMode},
};

/// Column count, row count and canvas size of a grid composite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridLayout {
    pub columns:       u32,
    pub rows:          u32,
    pub cell_width:    u32,
    pub cell_height:   u32,
    pub gap:           u32,
    pub canvas_width:  u32,
    pub canvas_height: u32,
}

impl GridLayout {
    /// Computes the layout for `count` frames of `frame_width x frame_height`
    ///
    /// Fails with `InvalidParameter` if the canvas would not fit in `u32`.
    pub fn compute(
        count: u32,
        frame_width: u32,
        frame_height: u32,
        params: &GridParams,
    ) -> CaptureResult<Self> {
        let columns = choose_columns(count, frame_width, frame_height, params.max_columns);
        let rows = count.div_ceil(columns).max(1);

        let extent = |cell: u32, cells: u32| {
            cell.checked_mul(cells)?
                .checked_add(params.gap.checked_mul(cells.checked_add(1)?)?)
        };
        let overflow = || CaptureError::InvalidParameter {
            parameter: "grid".to_string(),
            reason:    format!(
                "{} frames of {}x{} with gap {} exceed the maximum canvas size",
                count, frame_width, frame_height, params.gap
            ),
        };

        Ok(Self {
            columns,
            rows,
            cell_width: frame_width,
            cell_height: frame_height,
            gap: params.gap,
            canvas_width: extent(frame_width, columns).ok_or_else(overflow)?,
            canvas_height: extent(frame_height, rows).ok_or_else(overflow)?,
        })
    }

    /// Top-left corner of cell `index` (row-major)
    pub fn cell_origin(&self, index: u32) -> (u32, u32) {
        let row = index / self.columns;
        let col = index % self.columns;
        (
            self.gap + col * (self.cell_width + self.gap),
            self.gap + row * (self.cell_height + self.gap),
        )
    }
}

/// Picks the grid column count for `count` frames
///
/// Two or fewer frames always use two columns. Otherwise every count from 2
/// to `max_columns` is tried and the one whose canvas aspect ratio (gaps
/// ignored) is closest to 1 wins; on a tie the smaller count wins.
/// `max_columns` below 2 is treated as 2.
///
/// # Examples
///
/// ```
/// use scrollshot_core::stitch::choose_columns;
///
/// // Four square frames form a 2x2 square
/// assert_eq!(choose_columns(4, 100, 100, 6), 2);
/// // Wide, short strips prefer fewer columns
/// assert_eq!(choose_columns(5, 800, 100, 6), 2);
/// ```
pub fn choose_columns(count: u32, frame_width: u32, frame_height: u32, max_columns: u32) -> u32 {
    if count <= 2 {
        return MIN_GRID_COLUMNS;
    }

    let mut best_columns = MIN_GRID_COLUMNS;
    let mut best_score = f64::INFINITY;

    for columns in MIN_GRID_COLUMNS..=max_columns.max(MIN_GRID_COLUMNS) {
        let rows = count.div_ceil(columns);
        let ratio = (frame_width as f64 * columns as f64) / (frame_height as f64 * rows as f64);
        let score = (ratio - 1.0).abs();

        if score < best_score {
            best_score = score;
            best_columns = columns;
        }
    }

    tracing::debug!(
        "Grid layout for {} frames of {}x{}: {} columns",
        count,
        frame_width,
        frame_height,
        best_columns
    );
    best_columns
}

/// A finished composite
#[derive(Debug, Clone, PartialEq)]
pub struct StitchResult {
    image:       RgbImage,
    mode:        StitchMode,
    layout:      Option<GridLayout>,
    frame_count: usize,
}

impl StitchResult {
    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    /// Mode the composite was built with
    pub fn mode(&self) -> &StitchMode {
        &self.mode
    }

    /// Grid layout, for grid composites
    pub fn layout(&self) -> Option<&GridLayout> {
        self.layout.as_ref()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Number of frames in the composite
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Scales the composite down to at most `max_width` pixels wide
    ///
    /// Keeps the aspect ratio and never upscales.
    pub fn preview(&self, max_width: u32) -> RgbImage {
        let (width, height) = self.dimensions();
        let max_width = max_width.max(1);
        if width <= max_width {
            return self.image.clone();
        }

        let scaled_height = ((height as u64 * max_width as u64) / width as u64).max(1) as u32;
        imageops::resize(&self.image, max_width, scaled_height, imageops::FilterType::Lanczos3)
    }
}

/// Stitches `frames` into one image
///
/// # Errors
///
/// - `EmptyInput` for an empty sequence
/// - `FrameSizeMismatch` when a vertical frame's width, or a grid frame's
///   width or height, differs from the first frame
/// - `InvalidParameter` when the canvas would not fit in `u32`
///
/// # Examples
///
/// ```
/// use scrollshot_core::{capture::Frame, model::StitchMode, stitch::stitch};
///
/// let frames = vec![Frame::filled(800, 100, [0, 0, 0]); 5];
///
/// let strip = stitch(&frames, &StitchMode::Vertical).unwrap();
/// assert_eq!(strip.dimensions(), (800, 500));
///
/// let grid = stitch(&frames, &StitchMode::grid()).unwrap();
/// assert_eq!(grid.layout().unwrap().columns, 2);
/// ```
pub fn stitch(frames: &[Frame], mode: &StitchMode) -> CaptureResult<StitchResult> {
    let first = frames.first().ok_or(CaptureError::EmptyInput)?;

    let (image, layout) = match mode {
        StitchMode::Vertical => (stitch_vertical(first, frames)?, None),
        StitchMode::Grid(params) => {
            let (image, layout) = stitch_grid(first, frames, params)?;
            (image, Some(layout))
        }
    };

    tracing::info!(
        "Stitched {} frames ({} mode) into {}x{}",
        frames.len(),
        mode,
        image.width(),
        image.height()
    );

    Ok(StitchResult {
        image,
        mode: *mode,
        layout,
        frame_count: frames.len(),
    })
}

fn stitch_vertical(first: &Frame, frames: &[Frame]) -> CaptureResult<RgbImage> {
    let width = first.width();
    let mut total_height: u32 = 0;

    for (index, frame) in frames.iter().enumerate() {
        if frame.width() != width {
            return Err(size_mismatch(index, first, frame));
        }
        total_height =
            total_height
                .checked_add(frame.height())
                .ok_or_else(|| CaptureError::InvalidParameter {
                    parameter: "frames".to_string(),
                    reason:    "total height exceeds the maximum canvas size".to_string(),
                })?;
    }

    let mut canvas = RgbImage::new(width, total_height);
    let mut offset: i64 = 0;
    for frame in frames {
        imageops::replace(&mut canvas, frame.as_image(), 0, offset);
        offset += frame.height() as i64;
    }

    Ok(canvas)
}

fn stitch_grid(
    first: &Frame,
    frames: &[Frame],
    params: &GridParams,
) -> CaptureResult<(RgbImage, GridLayout)> {
    if let Some((index, frame)) = frames
        .iter()
        .enumerate()
        .find(|(_, frame)| frame.dimensions() != first.dimensions())
    {
        return Err(size_mismatch(index, first, frame));
    }

    let count = u32::try_from(frames.len()).map_err(|_| CaptureError::InvalidParameter {
        parameter: "frames".to_string(),
        reason:    format!("{} frames is too many for a grid", frames.len()),
    })?;
    let layout = GridLayout::compute(count, first.width(), first.height(), params)?;

    let mut canvas =
        RgbImage::from_pixel(layout.canvas_width, layout.canvas_height, Rgb(params.background));
    for (index, frame) in (0..count).zip(frames) {
        let (x, y) = layout.cell_origin(index);
        imageops::replace(&mut canvas, frame.as_image(), x as i64, y as i64);
    }

    Ok((canvas, layout))
}

fn size_mismatch(index: usize, first: &Frame, frame: &Frame) -> CaptureError {
    CaptureError::FrameSizeMismatch {
        index,
        expected: first.dimensions(),
        actual: frame.dimensions(),
    }
}
