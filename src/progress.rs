//! Progress reporting and cancellation support.
//!
//! This module provides [`ProgressCallback`] for observing extraction
//! progress, [`CancellationToken`] for cooperative cancellation, and
//! [`ProgressInfo`] for progress snapshots.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use framedump::{ExtractionConfig, ProgressCallback, ProgressInfo, extract_frames_with_config};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         if let Some(total) = info.advisory_total {
//!             println!("Extracted {}/{total} frames...", info.frames_written);
//!         }
//!     }
//! }
//!
//! let config = ExtractionConfig::new().with_progress(Arc::new(PrintProgress));
//! let report = extract_frames_with_config("input.mp4", "frames", &config)?;
//! # Ok::<(), framedump::ExtractError>(())
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::{Duration, Instant};

/// A snapshot of extraction progress.
///
/// Delivered to [`ProgressCallback::on_progress`] at the cadence configured
/// by [`ExtractionConfig::with_progress_interval`](crate::ExtractionConfig::with_progress_interval)
/// — every 100 written frames by default.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// How many frames have been fully written so far.
    pub frames_written: u64,
    /// The container's declared frame count, when it reported one.
    ///
    /// Advisory only — the final count may legitimately differ.
    pub advisory_total: Option<u64>,
    /// Completion percentage (0.0 – 100.0), when `advisory_total` is known.
    pub percentage: Option<f32>,
    /// Wall-clock time elapsed since extraction started.
    pub elapsed: Duration,
}

/// Trait for receiving progress updates during extraction.
///
/// Implementations must be [`Send`] and [`Sync`] so a single callback can be
/// shared with, for example, a Ctrl-C handler thread.
///
/// Progress callbacks are **infallible** — they observe but cannot halt the
/// operation. Use [`CancellationToken`] for cooperative cancellation.
pub trait ProgressCallback: Send + Sync {
    /// Called at regular intervals while frames are being written.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Default callback that reports through the `log` crate.
///
/// Emits the classic `Extracted N/M frames...` line at the configured
/// cadence. Replace it via
/// [`ExtractionConfig::with_progress`](crate::ExtractionConfig::with_progress)
/// to render progress differently.
pub(crate) struct LogProgress;

impl ProgressCallback for LogProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        match info.advisory_total {
            Some(total) => {
                log::info!("Extracted {}/{total} frames...", info.frames_written);
            }
            None => log::info!("Extracted {} frames...", info.frames_written),
        }
    }
}

/// Cooperative cancellation token backed by an [`AtomicBool`].
///
/// Clone this token and share it between threads; call
/// [`cancel`](CancellationToken::cancel) from any thread (or a signal
/// handler) to request cancellation. The extraction loop checks
/// [`is_cancelled`](CancellationToken::is_cancelled) before each frame.
///
/// # Example
///
/// ```
/// use framedump::CancellationToken;
///
/// let token = CancellationToken::new();
/// assert!(!token.is_cancelled());
///
/// token.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation.
    ///
    /// All clones of this token will observe the cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Internal helper that tracks timing and fires the callback every
/// `interval` written frames.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    advisory_total: Option<u64>,
    interval: u64,
    frames_written: u64,
    frames_since_last_report: u64,
    start_time: Instant,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        advisory_total: Option<u64>,
        interval: u64,
    ) -> Self {
        Self {
            callback,
            advisory_total,
            interval: interval.max(1),
            frames_written: 0,
            frames_since_last_report: 0,
            start_time: Instant::now(),
        }
    }

    /// Record one written frame and fire the callback when the interval is
    /// reached — at frames `interval`, `2 * interval`, and so on.
    pub(crate) fn advance(&mut self) {
        self.frames_written += 1;
        self.frames_since_last_report += 1;

        if self.frames_since_last_report >= self.interval {
            self.report();
            self.frames_since_last_report = 0;
        }
    }

    fn report(&self) {
        // Advisory totals can under-declare, so cap at 100.
        let percentage = self
            .advisory_total
            .filter(|&total| total > 0)
            .map(|total| ((self.frames_written as f32 / total as f32) * 100.0).min(100.0));

        let info = ProgressInfo {
            frames_written: self.frames_written,
            advisory_total: self.advisory_total,
            percentage,
            elapsed: self.start_time.elapsed(),
        };

        self.callback.on_progress(&info);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct Recorder {
        reports: Mutex<Vec<u64>>,
    }

    impl Recorder {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                reports: Mutex::new(Vec::new()),
            })
        }

        fn frames(&self) -> Vec<u64> {
            self.reports.lock().unwrap().clone()
        }
    }

    impl ProgressCallback for Recorder {
        fn on_progress(&self, info: &ProgressInfo) {
            self.reports.lock().unwrap().push(info.frames_written);
        }
    }

    #[test]
    fn no_report_below_interval_boundary() {
        let recorder = Recorder::new();
        let mut tracker = ProgressTracker::new(recorder.clone(), Some(1000), 100);

        for _ in 0..99 {
            tracker.advance();
        }
        assert!(recorder.frames().is_empty(), "99 frames must not report");

        tracker.advance();
        assert_eq!(recorder.frames(), vec![100], "100th frame must report");
    }

    #[test]
    fn reports_only_on_interval_multiples() {
        let recorder = Recorder::new();
        let mut tracker = ProgressTracker::new(recorder.clone(), Some(250), 100);

        for _ in 0..250 {
            tracker.advance();
        }

        // No trailing report off the boundary, even when the run ends at 250.
        drop(tracker);
        assert_eq!(recorder.frames(), vec![100, 200]);
    }

    #[test]
    fn percentage_uses_advisory_total() {
        struct CheckPercentage;
        impl ProgressCallback for CheckPercentage {
            fn on_progress(&self, info: &ProgressInfo) {
                let percentage = info.percentage.expect("total known, percentage must be set");
                assert!((percentage - 50.0).abs() < f32::EPSILON);
            }
        }

        let mut tracker = ProgressTracker::new(Arc::new(CheckPercentage), Some(10), 5);
        for _ in 0..5 {
            tracker.advance();
        }
    }

    #[test]
    fn percentage_capped_when_container_under_declares() {
        struct CheckCap;
        impl ProgressCallback for CheckCap {
            fn on_progress(&self, info: &ProgressInfo) {
                let percentage = info.percentage.expect("total known, percentage must be set");
                assert!(percentage <= 100.0, "percentage above 100: {percentage}");
            }
        }

        // The container declared 2 frames but 5 decode.
        let mut tracker = ProgressTracker::new(Arc::new(CheckCap), Some(2), 1);
        for _ in 0..5 {
            tracker.advance();
        }
    }

    #[test]
    fn zero_interval_is_clamped() {
        let recorder = Recorder::new();
        let mut tracker = ProgressTracker::new(recorder.clone(), None, 0);

        tracker.advance();
        assert_eq!(recorder.frames(), vec![1]);
    }

    #[test]
    fn cancellation_token_clone_shares_state() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());

        token.cancel();
        assert!(clone.is_cancelled());
    }
}
