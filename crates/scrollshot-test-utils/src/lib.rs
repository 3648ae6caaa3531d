//! Test utilities for scrollshot integration tests
//!
//! Shared fixtures for driving capture sessions without a display server.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! scrollshot-test-utils = { path = "../scrollshot-test-utils" }
//! ```
//!
//! # Modules
//!
//! - [`frames`]: solid, distinct and scripted frame sequences
//! - [`harness`]: a controller wired to the scripted mock backends
//! - [`timing`]: timing measurement and duration assertions
//!
//! # Example
//!
//! ```ignore
//! use scrollshot_test_utils::{frames::scrolling_page, harness::MockHarness};
//!
//! #[tokio::test]
//! async fn test_scroll_to_end() {
//!     let mut h = MockHarness::new(scrolling_page(800, 100, 5));
//!     h.controller.start().unwrap();
//!     let session = h.controller.finish().await.unwrap().unwrap();
//!     assert_eq!(session.frame_count(), 8);
//! }
//! ```

pub mod frames;
pub mod harness;
pub mod timing;
