//! Matched-frame export.
//!
//! After matching, each matched index is mapped back to a full-resolution
//! frame and written as a PNG. Writing goes through the [`ImageWriter`]
//! capability so the encoding backend can be swapped or stubbed out in
//! tests; the default implementation encodes with the `image` crate.
//!
//! A failed write is reported and skipped — the remaining files are still
//! attempted, and the caller decides what a partial export means for the
//! exit code. Existing files are overwritten unconditionally.

use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::{
    coordinator::MatchTable,
    error::FrameMatchError,
    resizer::ResizeFilter,
    source::VideoSource,
};

/// Capability for writing one exported frame image to disk.
///
/// Implementations must be [`Send`] and [`Sync`] so a writer can be shared
/// across future parallel export paths.
pub trait ImageWriter: Send + Sync {
    /// Write `image` to `path`, replacing any existing file.
    fn write(&self, image: &DynamicImage, path: &Path) -> Result<(), FrameMatchError>;
}

/// The default writer: PNG encoding via the `image` crate.
#[derive(Debug, Default)]
pub struct PngWriter;

impl ImageWriter for PngWriter {
    fn write(&self, image: &DynamicImage, path: &Path) -> Result<(), FrameMatchError> {
        image.save(path).map_err(|error| FrameMatchError::ImageWrite {
            path: path.to_path_buf(),
            reason: error.to_string(),
        })
    }
}

/// Export-time settings.
#[derive(Debug, Clone)]
pub struct ExportSettings {
    /// Export resolution override. `None` uses the reference source's
    /// native resolution for every source.
    pub output_dimensions: Option<(u32, u32)>,
    /// Resampling filter for export-time resizing.
    pub filter: ResizeFilter,
    /// When `true`, file names lead with the reference index instead of the
    /// source name.
    pub grouping: bool,
    /// When `false`, frames of the reference source are neither decoded nor
    /// written.
    pub include_reference: bool,
    /// Directory receiving the images.
    pub out_dir: PathBuf,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_dimensions: None,
            filter: ResizeFilter::default(),
            grouping: false,
            include_reference: true,
            out_dir: PathBuf::from("."),
        }
    }
}

/// What the export phase accomplished.
#[derive(Debug, Default)]
pub struct ExportReport {
    /// Paths written successfully.
    pub written: Vec<PathBuf>,
    /// Files that failed, with the error that stopped each one.
    pub failed: Vec<(PathBuf, FrameMatchError)>,
}

impl ExportReport {
    /// Whether every attempted file was written.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Parse a `WxH` dimension string such as `1920x1080`.
///
/// # Errors
///
/// Returns [`FrameMatchError::MalformedDimensions`] unless the input is two
/// positive integers joined by `x`.
pub fn parse_dimensions(input: &str) -> Result<(u32, u32), FrameMatchError> {
    let malformed = || FrameMatchError::MalformedDimensions {
        input: input.to_string(),
    };

    let (width, height) = input.trim().split_once('x').ok_or_else(malformed)?;
    let width = width.trim().parse::<u32>().map_err(|_| malformed())?;
    let height = height.trim().parse::<u32>().map_err(|_| malformed())?;
    if width == 0 || height == 0 {
        return Err(malformed());
    }
    Ok((width, height))
}

/// Build the output file name for one matched frame.
///
/// Layout is `"<A>-<B>-(<matched>).png"`: with grouping off `A` is the
/// source basename and `B` the reference index; grouping on swaps them so
/// files for the same reference sort together.
pub fn match_file_name(
    source_name: &str,
    reference_index: u64,
    matched_index: u64,
    grouping: bool,
) -> String {
    if grouping {
        format!("{reference_index}-{source_name}-({matched_index}).png")
    } else {
        format!("{source_name}-{reference_index}-({matched_index}).png")
    }
}

/// Export every matched frame pair as images.
///
/// The reference source contributes one image per reference position
/// (unless [`include_reference`](ExportSettings::include_reference) is off);
/// each scanned source contributes its best match for every position. The
/// export resolution is the override from `settings` or the reference
/// source's native resolution.
///
/// # Errors
///
/// Only setup failures (unmatched table entries, which indicate the scan
/// never ran) return an error. Per-file decode or write failures are
/// recorded in the report and do not stop the remaining files.
pub fn export_matches(
    reference_source: &mut VideoSource,
    scanned_sources: &mut [VideoSource],
    reference_indices: &[u64],
    table: &MatchTable,
    writer: &dyn ImageWriter,
    settings: &ExportSettings,
) -> Result<ExportReport, FrameMatchError> {
    let (width, height) = settings.output_dimensions.unwrap_or((
        reference_source.metadata().width,
        reference_source.metadata().height,
    ));

    let mut report = ExportReport::default();

    if settings.include_reference {
        let name = reference_source.basename();
        for &reference_index in reference_indices {
            export_one(
                reference_source,
                &name,
                reference_index,
                reference_index,
                width,
                height,
                writer,
                settings,
                &mut report,
            );
        }
    } else {
        log::info!("Reference frames will not be saved");
    }

    for (source_index, source) in scanned_sources.iter_mut().enumerate() {
        let name = source.basename();
        for (position, &reference_index) in reference_indices.iter().enumerate() {
            let matched = table.row(source_index)[position];
            if !matched.is_matched() {
                return Err(FrameMatchError::Decode {
                    path: source.path().to_path_buf(),
                    frame_index: reference_index,
                    reason: "no candidate was evaluated for this reference".to_string(),
                });
            }
            export_one(
                source,
                &name,
                reference_index,
                matched.frame_index as u64,
                width,
                height,
                writer,
                settings,
                &mut report,
            );
        }
    }

    Ok(report)
}

#[allow(clippy::too_many_arguments)]
fn export_one(
    source: &mut VideoSource,
    source_name: &str,
    reference_index: u64,
    frame_index: u64,
    width: u32,
    height: u32,
    writer: &dyn ImageWriter,
    settings: &ExportSettings,
    report: &mut ExportReport,
) {
    let file_name = match_file_name(source_name, reference_index, frame_index, settings.grouping);
    let path = settings.out_dir.join(file_name);

    let result = source
        .fetch_frame(frame_index, width, height, settings.filter)
        .and_then(|image| writer.write(&image, &path));

    match result {
        Ok(()) => {
            log::debug!("Saved {}", path.display());
            report.written.push(path);
        }
        Err(error) => {
            log::warn!("Skipping {}: {error}", path.display());
            report.failed.push((path, error));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_layouts() {
        assert_eq!(match_file_name("sourceA", 16, 16, false), "sourceA-16-(16).png");
        assert_eq!(match_file_name("sourceA", 16, 16, true), "16-sourceA-(16).png");
        assert_eq!(
            match_file_name("v2.mkv", 48, 1207, false),
            "v2.mkv-48-(1207).png"
        );
    }

    #[test]
    fn dimension_strings_parse() {
        assert_eq!(parse_dimensions("1920x1080").unwrap(), (1920, 1080));
        assert_eq!(parse_dimensions(" 640x480 ").unwrap(), (640, 480));
    }

    #[test]
    fn bad_dimension_strings_are_rejected() {
        for input in ["", "1920", "1920x", "x1080", "ax b", "0x100", "100x0", "1920X1080"] {
            assert!(
                parse_dimensions(input).is_err(),
                "expected {input:?} to be rejected",
            );
        }
    }
}
