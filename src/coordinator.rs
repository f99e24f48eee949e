//! Match coordination across sources.
//!
//! Each non-reference source is scanned by its own worker on the rayon
//! thread pool. Workers share the reference set read-only and each one
//! opens its own demuxer and decoder, so there is no shared mutable state
//! and no locking: a worker owns its row of the match table outright and
//! hands it back when the scan completes.
//!
//! Export never starts until every row is in. A failure in any worker fails
//! the whole run — partial tables would produce misleading comparisons.

use std::path::PathBuf;

use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};

use crate::{
    error::FrameMatchError,
    matcher::{FrameMatch, match_frames},
    options::MatchOptions,
    reference::ReferenceFrame,
    source::{FrameScanner, VideoSource},
};

/// The completed result of matching every non-reference source against the
/// reference set.
///
/// Row `i` corresponds to `sources[i]` as passed to [`match_all_sources`];
/// column `j` corresponds to reference position `j`.
#[derive(Debug, Clone)]
pub struct MatchTable {
    rows: Vec<Vec<FrameMatch>>,
}

impl MatchTable {
    /// All rows, one per scanned source in input order.
    pub fn rows(&self) -> &[Vec<FrameMatch>] {
        &self.rows
    }

    /// One source's matches, in reference order.
    pub fn row(&self, source_index: usize) -> &[FrameMatch] {
        &self.rows[source_index]
    }

    /// Number of scanned sources.
    pub fn source_count(&self) -> usize {
        self.rows.len()
    }
}

/// Scan all non-reference sources concurrently and build the match table.
///
/// `width` and `height` are the shared comparison resolution from the
/// downscale planner; every worker resamples its source to exactly these
/// dimensions while scanning. The call returns only when every worker has
/// finished.
///
/// # Errors
///
/// The first error from any worker — open, decode, or metric — aborts the
/// run and is returned. Rows computed by other workers are discarded.
pub fn match_all_sources(
    sources: &[VideoSource],
    references: &[ReferenceFrame],
    width: u32,
    height: u32,
    options: &MatchOptions,
) -> Result<MatchTable, FrameMatchError> {
    log::info!(
        "Scanning {} source(s) against {} reference frame(s) at {width}x{height}",
        sources.len(),
        references.len(),
    );

    // Workers get plain owned data; each one opens its own demuxer from the
    // path rather than sharing an FFmpeg context across threads.
    let plans: Vec<(String, Option<u64>, PathBuf)> = sources
        .iter()
        .map(|source| {
            let total = match source.metadata().frame_count {
                0 => None,
                count => Some(count),
            };
            (source.basename(), total, source.path().to_path_buf())
        })
        .collect();

    let rows = plans
        .into_par_iter()
        .with_max_len(1)
        .map(|(name, total, path)| {
            let scanner = FrameScanner::open(&path, width, height, options.resize_filter)?;
            match_frames(
                &name,
                scanner,
                references,
                options.diff_mode,
                total,
                options.observer.as_ref(),
            )
        })
        .collect::<Result<Vec<Vec<FrameMatch>>, FrameMatchError>>()?;

    Ok(MatchTable { rows })
}
