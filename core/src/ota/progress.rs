//! Progress reporting for OTA sessions.
//!
//! The engine calls the observer synchronously, on the caller's thread,
//! right after each acknowledged chunk.

use tracing::debug;

pub trait ProgressObserver {
    /// `bytes_per_sec` is averaged over the whole session so far.
    fn on_progress(&mut self, done: usize, total: usize, bytes_per_sec: f64);
}

impl<F> ProgressObserver for F
where
    F: FnMut(usize, usize, f64),
{
    fn on_progress(&mut self, done: usize, total: usize, bytes_per_sec: f64) {
        self(done, total, bytes_per_sec)
    }
}

/// Discards every update.
pub struct NullProgress;

impl ProgressObserver for NullProgress {
    fn on_progress(&mut self, _done: usize, _total: usize, _bytes_per_sec: f64) {}
}

/// Logs every update at DEBUG.
pub struct TracingProgress;

impl ProgressObserver for TracingProgress {
    fn on_progress(&mut self, done: usize, total: usize, bytes_per_sec: f64) {
        let pct = if total > 0 { done as f64 * 100.0 / total as f64 } else { 0.0 };
        debug!(
            done,
            total,
            progress = %format!("{pct:.2}%"),
            speed = %format!("{:.1} KiB/s", bytes_per_sec / 1024.0),
            "Progress"
        );
    }
}
