//! Reference frame selection and loading.
//!
//! The reference source anchors the comparison: a small, fixed set of its
//! frames is selected up front, downscaled to the comparison resolution, and
//! shared read-only with every scan worker. Positions come either from an
//! explicit user-supplied list or evenly spaced across the source, skipping
//! the head and tail where titles and credits make frames less
//! representative.

use std::collections::BTreeSet;

use crate::{
    error::FrameMatchError,
    plane::PlaneFrame,
    resizer::ResizeFilter,
    source::VideoSource,
};

/// One selected reference frame: its index in the reference source and its
/// downscaled pixel content.
///
/// The full set is built before matching starts and never mutated.
#[derive(Debug, Clone)]
pub struct ReferenceFrame {
    /// Frame index in the reference source.
    pub index: u64,
    /// Downscaled comparison content at that index.
    pub frame: PlaneFrame,
}

/// Compute `count` evenly spaced reference positions over `total_frames`.
///
/// The interval is `total_frames / (count + 1)` and positions are
/// `interval, 2 * interval, ..., count * interval`, which deliberately skips
/// the first and last `interval` frames.
///
/// # Errors
///
/// Returns [`FrameMatchError::ZeroInterval`] when `count + 1` exceeds the
/// frame count, which would otherwise degenerate into duplicate zero-index
/// references.
pub fn evenly_spaced(total_frames: u64, count: u64) -> Result<Vec<u64>, FrameMatchError> {
    let interval = total_frames / (count + 1);
    if interval == 0 {
        return Err(FrameMatchError::ZeroInterval {
            requested: count,
            total_frames,
        });
    }
    Ok((1..=count).map(|position| position * interval).collect())
}

/// Parse a comma-separated list of explicit reference frame indices.
///
/// Order is preserved and duplicates are kept; whitespace around entries is
/// tolerated.
///
/// # Errors
///
/// Returns [`FrameMatchError::MalformedFrameList`] if the list is empty or
/// any entry is not a non-negative integer.
pub fn parse_frame_list(input: &str) -> Result<Vec<u64>, FrameMatchError> {
    let malformed = || FrameMatchError::MalformedFrameList {
        input: input.to_string(),
    };

    let entries = input
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| entry.parse::<u64>().map_err(|_| malformed()))
        .collect::<Result<Vec<u64>, FrameMatchError>>()?;

    if entries.is_empty() {
        return Err(malformed());
    }
    Ok(entries)
}

/// Load the downscaled content of the given reference positions from the
/// reference source, in one ascending scan.
///
/// `indices` keeps its caller-supplied order in the result even though the
/// underlying scan is sequential.
///
/// # Errors
///
/// - [`FrameMatchError::ReferenceOutOfRange`] if an index exceeds the
///   source's known frame count (validated eagerly when the count is
///   available).
/// - [`FrameMatchError::Decode`] if an index past the end of the stream is
///   requested from a source with an unknown frame count, or decoding
///   fails.
pub fn load_reference_frames(
    source: &VideoSource,
    indices: &[u64],
    width: u32,
    height: u32,
    filter: ResizeFilter,
) -> Result<Vec<ReferenceFrame>, FrameMatchError> {
    let total_frames = source.metadata().frame_count;
    if total_frames > 0 {
        for &index in indices {
            if index >= total_frames {
                return Err(FrameMatchError::ReferenceOutOfRange {
                    frame_index: index,
                    total_frames,
                });
            }
        }
    }

    let wanted: BTreeSet<u64> = indices.iter().copied().collect();
    let Some(&last_wanted) = wanted.last() else {
        return Ok(Vec::new());
    };

    log::info!(
        "Loading {} reference frame(s) from {} at {}x{}",
        wanted.len(),
        source.basename(),
        width,
        height,
    );

    let mut collected: Vec<(u64, PlaneFrame)> = Vec::with_capacity(wanted.len());
    let mut scanner = source.scanner(width, height, filter)?;

    loop {
        let index = scanner.next_index();
        match scanner.next() {
            Some(Ok(frame)) => {
                if wanted.contains(&index) {
                    collected.push((index, frame));
                }
                if index >= last_wanted {
                    break;
                }
            }
            Some(Err(error)) => return Err(error),
            None => break,
        }
    }

    // Re-emit in caller order; a missing entry means the stream ended early.
    indices
        .iter()
        .map(|&index| {
            collected
                .iter()
                .find(|(collected_index, _)| *collected_index == index)
                .map(|(_, frame)| ReferenceFrame {
                    index,
                    frame: frame.clone(),
                })
                .ok_or_else(|| FrameMatchError::Decode {
                    path: source.path().to_path_buf(),
                    frame_index: index,
                    reason: "stream ended before the requested reference frame".to_string(),
                })
        })
        .collect()
}
