//! scrollshot-core: scrolling screenshot capture and stitching
//!
//! This library repeatedly captures a fixed screen rectangle, scrolls the
//! surface underneath it between captures, stops once the content no longer
//! changes, and stitches the captured frames into one composite image
//! (vertical strip or square-ish grid).
//!
//! # Layout
//!
//! - [`capture`]: capability traits, the [`Frame`](capture::Frame) type,
//!   defaults, mock and platform backends
//! - [`similarity`]: exact pixel-match similarity and no-change detection
//! - [`session`]: session state machine, capture loop and controller
//! - [`stitch`]: vertical and grid composition
//! - [`util`]: encoding, export and platform detection

pub mod capture;
pub mod error;
pub mod model;
pub mod session;
pub mod similarity;
pub mod stitch;
pub mod util;
