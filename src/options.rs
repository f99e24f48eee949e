//! Matching configuration.
//!
//! [`MatchOptions`] is a builder that threads the downscale ratio, metric
//! mode, resize filter, and progress observer through the matching pipeline
//! without polluting every function signature.
//!
//! # Example
//!
//! ```
//! use framematch::{DiffMode, MatchOptions, ResizeFilter};
//!
//! let options = MatchOptions::new()
//!     .with_ratio(8)
//!     .with_diff_mode(DiffMode::Precision)
//!     .with_resize_filter(ResizeFilter::Lanczos);
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::{
    metric::DiffMode,
    progress::{NoOpObserver, ScanObserver},
    resizer::ResizeFilter,
};

/// Configuration for a matching run.
///
/// A default-constructed value mirrors the CLI defaults: ratio 5, fast
/// (luma-only) metric, spline resampling, no observer.
#[derive(Clone)]
pub struct MatchOptions {
    /// Comparison-downscale multiplier applied to the reduced reference
    /// aspect ratio.
    pub(crate) ratio: u32,
    /// Which planes the difference metric reads.
    pub(crate) diff_mode: DiffMode,
    /// Resampling filter used for both comparison downscaling and export
    /// resizing.
    pub(crate) resize_filter: ResizeFilter,
    /// Progress observer. Defaults to a no-op.
    pub(crate) observer: Arc<dyn ScanObserver>,
}

impl Debug for MatchOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("MatchOptions")
            .field("ratio", &self.ratio)
            .field("diff_mode", &self.diff_mode)
            .field("resize_filter", &self.resize_filter)
            .finish_non_exhaustive()
    }
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self {
            ratio: 5,
            diff_mode: DiffMode::Fast,
            resize_filter: ResizeFilter::default(),
            observer: Arc::new(NoOpObserver),
        }
    }

    /// Set the comparison-downscale multiplier.
    ///
    /// Validated when the comparison resolution is planned; zero is a
    /// configuration error there.
    #[must_use]
    pub fn with_ratio(mut self, ratio: u32) -> Self {
        self.ratio = ratio;
        self
    }

    /// Choose between luma-only and three-plane difference scoring.
    #[must_use]
    pub fn with_diff_mode(mut self, mode: DiffMode) -> Self {
        self.diff_mode = mode;
        self
    }

    /// Set the resampling filter used for downscaling and export.
    #[must_use]
    pub fn with_resize_filter(mut self, filter: ResizeFilter) -> Self {
        self.resize_filter = filter;
        self
    }

    /// Attach a progress observer.
    ///
    /// The observer is shared by all source workers and is invoked every
    /// [`PROGRESS_INTERVAL`](crate::progress::PROGRESS_INTERVAL) candidate
    /// frames.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn ScanObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// The configured downscale ratio.
    pub fn ratio(&self) -> u32 {
        self.ratio
    }

    /// The configured metric mode.
    pub fn diff_mode(&self) -> DiffMode {
        self.diff_mode
    }

    /// The configured resize filter.
    pub fn resize_filter(&self) -> ResizeFilter {
        self.resize_filter
    }
}
