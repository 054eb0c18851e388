/// Linearly decays from `start` to `end` over `duration` steps, then holds at `end`.
///
/// `duration` must be positive. With `start >= end` the result never leaves
/// `[end, start]`.
pub fn linear_schedule(start: f64, end: f64, duration: f64, step: usize) -> f64 {
    debug_assert!(duration > 0.0, "schedule duration must be positive");
    let slope = (end - start) / duration;
    (start + slope * step as f64).max(end)
}
