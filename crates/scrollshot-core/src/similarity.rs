//! Frame similarity and end-of-content detection
//!
//! Similarity is the fraction of pixels whose RGB values are exactly equal.
//! There is no tolerance and no perceptual weighting: the frames come from
//! the same rectangle moments apart, so unchanged content is bit-identical.

use serde::Serialize;

use crate::capture::Frame;

/// Result of comparing two frames
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Similarity {
    /// Fraction of identical pixels, in `0.0..=1.0`
    Ratio { value: f64 },
    /// Frames differ in size or are empty
    NotComparable {
        /// (width, height) of the first frame
        left:  (u32, u32),
        /// (width, height) of the second frame
        right: (u32, u32),
    },
}

impl Similarity {
    /// Returns the ratio, or `None` when the frames were not comparable
    pub fn ratio(&self) -> Option<f64> {
        match self {
            Similarity::Ratio { value } => Some(*value),
            Similarity::NotComparable { .. } => None,
        }
    }

    /// True if the ratio is at least `threshold`
    ///
    /// Frames that cannot be compared never meet a threshold; a size change
    /// counts as new content.
    pub fn meets(&self, threshold: f64) -> bool {
        self.ratio().is_some_and(|ratio| ratio >= threshold)
    }
}

impl std::fmt::Display for Similarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Similarity::Ratio { value } => write!(f, "{:.4}", value),
            Similarity::NotComparable { left, right } => {
                write!(f, "not comparable ({}x{} vs {}x{})", left.0, left.1, right.0, right.1)
            }
        }
    }
}

/// Compares two frames pixel by pixel
///
/// Symmetric and deterministic. Identical frames give `1.0`.
///
/// # Examples
///
/// ```
/// use scrollshot_core::{capture::Frame, similarity::similarity};
///
/// let a = Frame::filled(10, 10, [0, 0, 0]);
/// let b = Frame::filled(10, 10, [255, 255, 255]);
///
/// assert_eq!(similarity(&a, &a).ratio(), Some(1.0));
/// assert_eq!(similarity(&a, &b).ratio(), Some(0.0));
/// ```
pub fn similarity(a: &Frame, b: &Frame) -> Similarity {
    let (left, right) = (a.dimensions(), b.dimensions());
    let total = left.0 as u64 * left.1 as u64;

    if left != right || total == 0 {
        return Similarity::NotComparable { left, right };
    }

    let equal = a
        .as_raw()
        .chunks_exact(3)
        .zip(b.as_raw().chunks_exact(3))
        .filter(|(pa, pb)| pa == pb)
        .count() as u64;

    Similarity::Ratio {
        value: equal as f64 / total as f64,
    }
}

/// Decides whether consecutive frames show the same content
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoChangeDetector {
    threshold: f64,
}

impl NoChangeDetector {
    /// Creates a detector; `threshold` is clamped to `0.0..=1.0`
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    /// Returns the threshold in use
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Compares the frames, returning the similarity and whether it counts
    /// as "no change"
    pub fn compare(&self, previous: &Frame, current: &Frame) -> (Similarity, bool) {
        let result = similarity(previous, current);
        let unchanged = result.meets(self.threshold);
        tracing::debug!(
            "Frame similarity {} (threshold {:.2}, unchanged: {})",
            result,
            self.threshold,
            unchanged
        );
        (result, unchanged)
    }

    /// True iff the frames are comparable and at least `threshold` similar
    pub fn is_no_change(&self, previous: &Frame, current: &Frame) -> bool {
        self.compare(previous, current).1
    }
}

impl Default for NoChangeDetector {
    fn default() -> Self {
        Self::new(crate::capture::constants::DEFAULT_SIMILARITY_THRESHOLD)
    }
}
