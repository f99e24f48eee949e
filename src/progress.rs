//! Scan progress reporting.
//!
//! A full scan visits every frame of every non-reference source, which can
//! mean hundreds of thousands of decodes. [`ScanObserver`] lets callers
//! watch that work without being able to influence it — observers are
//! informational only and cannot halt or alter the scan.
//!
//! # Example
//!
//! ```no_run
//! use framematch::{ScanObserver, ScanUpdate};
//!
//! struct PrintProgress;
//!
//! impl ScanObserver for PrintProgress {
//!     fn on_progress(&self, update: &ScanUpdate<'_>) {
//!         println!("{}: {}/{:?} frames scanned", update.source, update.scanned, update.total);
//!     }
//! }
//! ```

use std::time::Duration;

use crate::matcher::FrameMatch;

/// How many candidate frames are scanned between progress notifications.
pub const PROGRESS_INTERVAL: u64 = 1000;

/// A snapshot of one source's scan, delivered every
/// [`PROGRESS_INTERVAL`] candidate frames and once at completion.
#[derive(Debug)]
pub struct ScanUpdate<'a> {
    /// Basename of the source being scanned.
    pub source: &'a str,
    /// Candidate frames visited so far.
    pub scanned: u64,
    /// Total frames expected, if the container reports a frame count.
    pub total: Option<u64>,
    /// The current best match per reference position. Entries still at the
    /// sentinel have not seen a candidate yet.
    pub matches: &'a [FrameMatch],
    /// Wall-clock time since the scan of this source started.
    pub elapsed: Duration,
}

/// Trait for receiving scan progress updates.
///
/// Implementations must be [`Send`] and [`Sync`]: each non-reference source
/// is scanned on its own worker thread and all workers share one observer.
pub trait ScanObserver: Send + Sync {
    /// Called at a fixed cadence during a scan, and once when the scan of a
    /// source completes.
    fn on_progress(&self, update: &ScanUpdate<'_>);
}

/// A no-op implementation that discards all updates.
///
/// This is the default when no observer is configured.
#[derive(Debug, Default)]
pub struct NoOpObserver;

impl ScanObserver for NoOpObserver {
    fn on_progress(&self, _update: &ScanUpdate<'_>) {}
}
