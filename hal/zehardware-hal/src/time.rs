//! Time sources for the cooperative loop

/// Monotonic uptime clock
pub trait Clock {
    /// Milliseconds since boot
    fn now_ms(&self) -> u64;
}

/// Fixed-period tick source
///
/// Each call to [`Ticker::next`] completes at the next period boundary,
/// so time spent handling a command is absorbed by the following wait.
pub trait Ticker {
    /// Wait for the next tick boundary
    fn next(&mut self) -> impl core::future::Future<Output = ()>;
}
