//! # framematch
//!
//! Find the frames that correspond to the same moment in time across
//! multiple differently-encoded video sources, and export matched frame
//! pairs as images for visual comparison.
//!
//! The first source is the *reference*: a small set of its frames is
//! selected (evenly spaced, or user-supplied indices), downscaled to a
//! cheap shared comparison resolution, and then every frame of every other
//! source is scored against every reference frame by mean absolute pixel
//! difference. The lowest-scoring candidate per reference per source wins,
//! and the matched frames are written back out at full resolution as PNGs.
//!
//! Decoding and scaling are powered by FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate; image
//! encoding by the [`image`](https://crates.io/crates/image) crate.
//!
//! ## Quick start
//!
//! ```no_run
//! use framematch::{
//!     ExportSettings, MatchOptions, PngWriter, VideoSource,
//!     comparison_dimensions, evenly_spaced, export_matches,
//!     load_reference_frames, match_all_sources,
//! };
//!
//! let options = MatchOptions::new();
//!
//! let mut reference = VideoSource::open("v1.mkv")?;
//! let mut others = vec![VideoSource::open("v2.mkv")?, VideoSource::open("v3.mkv")?];
//!
//! let metadata = reference.metadata().clone();
//! let (width, height) =
//!     comparison_dimensions(metadata.width, metadata.height, options.ratio())?;
//!
//! let indices = evenly_spaced(metadata.frame_count, 5)?;
//! let references =
//!     load_reference_frames(&reference, &indices, width, height, options.resize_filter())?;
//!
//! let table = match_all_sources(&others, &references, width, height, &options)?;
//!
//! export_matches(
//!     &mut reference,
//!     &mut others,
//!     &indices,
//!     &table,
//!     &PngWriter,
//!     &ExportSettings::default(),
//! )?;
//! # Ok::<(), framematch::FrameMatchError>(())
//! ```
//!
//! ## Guarantees
//!
//! - **Deterministic**: for fixed sources, ratio, and reference indices,
//!   re-running produces an identical match table. Ties go to the
//!   earlier-indexed frame.
//! - **All-or-nothing matching**: a decode or metric failure on any single
//!   candidate frame aborts the whole run; partial match tables are never
//!   produced.
//! - **Lock-free concurrency**: sources are scanned in parallel, each
//!   worker owning its own decoder and its own row of the match table.
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on the system.

pub mod coordinator;
pub mod error;
pub mod export;
pub mod ffmpeg;
pub mod matcher;
pub mod metric;
pub mod options;
pub mod plane;
pub mod planner;
pub mod progress;
pub mod reference;
pub mod resizer;
pub mod source;

pub use coordinator::{MatchTable, match_all_sources};
pub use error::FrameMatchError;
pub use export::{
    ExportReport, ExportSettings, ImageWriter, PngWriter, export_matches, match_file_name,
    parse_dimensions,
};
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use matcher::{FrameMatch, UNMATCHED, match_frames};
pub use metric::{DiffMode, frame_diff, plane_diff};
pub use options::MatchOptions;
pub use plane::{Plane, PlaneFrame};
pub use planner::comparison_dimensions;
pub use progress::{NoOpObserver, PROGRESS_INTERVAL, ScanObserver, ScanUpdate};
pub use reference::{ReferenceFrame, evenly_spaced, load_reference_frames, parse_frame_list};
pub use resizer::ResizeFilter;
pub use source::{FrameScanner, SourceMetadata, VideoSource};
