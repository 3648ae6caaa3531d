//! Timing measurement utilities
//!
//! - [`measure_sync`]: time a synchronous operation
//! - [`measure_async`]: time a future
//! - [`assert_duration_below`]: assert a duration is under a threshold
//! - [`assert_duration_above`]: assert a duration exceeds a minimum

use std::{
    future::Future,
    time::{Duration, Instant},
};

/// Measure the duration of a synchronous operation
///
/// # Example
///
/// ```
/// use scrollshot_test_utils::timing::measure_sync;
///
/// let (sum, _elapsed) = measure_sync("sum", || (0..1000).sum::<u32>());
/// assert_eq!(sum, 499_500);
/// ```
pub fn measure_sync<F, T>(name: &str, f: F) -> (T, Duration)
where
    F: FnOnce() -> T,
{
    let start = Instant::now();
    let result = f();
    let elapsed = start.elapsed();
    println!("[TIMING] {}: {:.2}ms", name, elapsed.as_secs_f64() * 1000.0);
    (result, elapsed)
}

/// Measure the duration of a future
pub async fn measure_async<F, T>(name: &str, future: F) -> (T, Duration)
where
    F: Future<Output = T>,
{
    let start = Instant::now();
    let result = future.await;
    let elapsed = start.elapsed();
    println!("[TIMING] {}: {:.2}ms", name, elapsed.as_secs_f64() * 1000.0);
    (result, elapsed)
}

/// Asserts that a duration is below a threshold
///
/// # Example
///
/// ```
/// use scrollshot_test_utils::timing::assert_duration_below;
/// use std::time::Duration;
///
/// assert_duration_below(Duration::from_millis(500), Duration::from_secs(1), "stitch");
/// ```
///
/// # Panics
///
/// Panics if `actual > threshold` with a message showing the excess time.
pub fn assert_duration_below(actual: Duration, threshold: Duration, operation: &str) {
    assert!(
        actual <= threshold,
        "{} took {:.3}s, expected <={:.3}s ({}ms over threshold)",
        operation,
        actual.as_secs_f64(),
        threshold.as_secs_f64(),
        (actual.as_millis() as i128) - (threshold.as_millis() as i128)
    );
}

/// Asserts that a duration is above a minimum
///
/// Useful to check that configured delays were actually waited.
///
/// # Panics
///
/// Panics if `actual < minimum`.
pub fn assert_duration_above(actual: Duration, minimum: Duration, operation: &str) {
    assert!(
        actual >= minimum,
        "{} took {:.3}s, expected >={:.3}s (suspiciously fast)",
        operation,
        actual.as_secs_f64(),
        minimum.as_secs_f64()
    );
}
