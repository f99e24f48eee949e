//! Error types for the `framematch` crate.
//!
//! This module defines [`FrameMatchError`], the unified error type returned by
//! all fallible operations in the crate. Variants carry the context needed to
//! diagnose a failure — file paths, frame numbers, filter names — without
//! additional logging at the call site.
//!
//! Error kinds fall into four families, all of which are fatal except the
//! last:
//!
//! - configuration errors (degenerate dimensions, zero reference interval,
//!   malformed `WxH` strings, unknown resize filters) surface before any
//!   decoding starts;
//! - source-load errors abort the run immediately;
//! - match-computation errors (decode or metric failures mid-scan) abort the
//!   run with no partial export — a missing comparison is worse than none;
//! - export errors abort the affected file only; the caller may continue
//!   with the remaining images.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `framematch` operations.
///
/// Every public method that can fail returns `Result<T, FrameMatchError>`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FrameMatchError {
    /// The video source could not be opened.
    #[error("Failed to open video source at {path}: {reason}")]
    SourceOpen {
        /// Path that was passed to [`crate::VideoSource::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in {path}")]
    NoVideoStream {
        /// Path of the offending file.
        path: PathBuf,
    },

    /// The reference source has a zero dimension, so no comparison
    /// resolution can be derived from it.
    #[error("Degenerate source dimensions {width}x{height}: cannot derive a comparison resolution")]
    DegenerateDimensions {
        /// Reference source width.
        width: u32,
        /// Reference source height.
        height: u32,
    },

    /// The downscale ratio must be a positive integer.
    #[error("Downscale ratio must be greater than zero")]
    ZeroRatio,

    /// Too many reference frames were requested for the source length.
    #[error(
        "Cannot place {requested} evenly spaced reference frames in {total_frames} frames (interval would be zero)"
    )]
    ZeroInterval {
        /// Number of reference frames requested.
        requested: u64,
        /// Total frames available in the reference source.
        total_frames: u64,
    },

    /// An explicit reference index exceeds the reference source's length.
    #[error("Reference frame {frame_index} is out of range (source has {total_frames} frames)")]
    ReferenceOutOfRange {
        /// The requested frame index.
        frame_index: u64,
        /// Total frames in the reference source.
        total_frames: u64,
    },

    /// A `WxH` dimension string could not be parsed.
    #[error("Malformed dimension string {input:?}: expected WIDTHxHEIGHT, e.g. 1920x1080")]
    MalformedDimensions {
        /// The offending input.
        input: String,
    },

    /// A frame-list string could not be parsed.
    #[error("Malformed frame list {input:?}: expected comma-separated frame indices, e.g. 10,20,30")]
    MalformedFrameList {
        /// The offending input.
        input: String,
    },

    /// The requested resize filter name is not recognised.
    #[error("Unknown resize filter {name:?} (supported: {supported})")]
    UnknownResizeFilter {
        /// The requested name.
        name: String,
        /// Comma-separated list of supported names.
        supported: String,
    },

    /// A candidate or reference frame could not be decoded.
    #[error("Failed to decode frame {frame_index} of {path}: {reason}")]
    Decode {
        /// Path of the source being decoded.
        path: PathBuf,
        /// Index of the frame that failed.
        frame_index: u64,
        /// Underlying reason.
        reason: String,
    },

    /// Two frames handed to the difference metric do not share plane
    /// geometry. All sources are resampled to one comparison resolution
    /// before matching, so this indicates a scaling bug upstream.
    #[error("Plane geometry mismatch: {expected} vs {actual}")]
    PlaneMismatch {
        /// Geometry of the reference plane, as `WxH`.
        expected: String,
        /// Geometry of the candidate plane, as `WxH`.
        actual: String,
    },

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    Ffmpeg(String),

    /// Writing an exported image failed.
    #[error("Failed to write image {path}: {reason}")]
    ImageWrite {
        /// Destination path.
        path: PathBuf,
        /// Underlying reason.
        reason: String,
    },

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// An error from the `image` crate during frame conversion.
    #[error("Image processing error: {0}")]
    Image(#[from] ImageError),
}

impl From<FfmpegError> for FrameMatchError {
    fn from(error: FfmpegError) -> Self {
        FrameMatchError::Ffmpeg(error.to_string())
    }
}
