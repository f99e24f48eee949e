//! Frame matching — the core of the crate.
//!
//! For one candidate source, [`match_frames`] visits every frame exactly
//! once in ascending index order and scores it against *every* reference
//! frame on the same pass. Decoding a candidate is the expensive step, so
//! all references are compared against each decoded frame before moving to
//! the next one, rather than one full pass per reference.
//!
//! The retained match per reference is deterministic: scores are compared
//! strictly-less, so the first frame to reach the minimum wins and later
//! equal-scoring frames never displace it. There is no early exit — even a
//! perfect zero score does not stop the scan, because a later frame might
//! beat the current best for a *different* reference.

use std::time::Instant;

use crate::{
    error::FrameMatchError,
    metric::{DiffMode, frame_diff},
    plane::PlaneFrame,
    progress::{PROGRESS_INTERVAL, ScanObserver, ScanUpdate},
    reference::ReferenceFrame,
};

/// Sentinel index meaning "no candidate evaluated yet".
pub const UNMATCHED: i64 = -1;

/// The best candidate found so far for one reference position.
///
/// Mutable while its source's scan runs, immutable afterwards. A fresh
/// entry holds the [`UNMATCHED`] sentinel until the first candidate is
/// scored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMatch {
    /// Index of the best-matching candidate frame, or [`UNMATCHED`].
    pub frame_index: i64,
    /// Difference score of that frame. Lower is more similar. Meaningless
    /// while `frame_index` is the sentinel.
    pub score: f64,
}

impl FrameMatch {
    /// A not-yet-matched entry.
    pub const fn unmatched() -> Self {
        Self {
            frame_index: UNMATCHED,
            score: -1.0,
        }
    }

    /// Whether any candidate has been evaluated for this entry.
    pub fn is_matched(&self) -> bool {
        self.frame_index != UNMATCHED
    }
}

impl Default for FrameMatch {
    fn default() -> Self {
        Self::unmatched()
    }
}

/// Apply the update rule for one scored candidate: overwrite iff the entry
/// is still unmatched or the new score is strictly lower.
fn update_best(entry: &mut FrameMatch, frame_index: u64, score: f64) {
    if entry.frame_index == UNMATCHED || score < entry.score {
        *entry = FrameMatch {
            frame_index: frame_index as i64,
            score,
        };
    }
}

/// Scan one candidate source and find the best-matching frame for every
/// reference.
///
/// `candidates` yields downscaled comparison frames in ascending index
/// order starting at zero; `total_frames` is used for progress reporting
/// only. The returned vector has one entry per reference, in reference
/// order, and after a completed scan over a non-empty source every entry
/// satisfies [`FrameMatch::is_matched`].
///
/// # Errors
///
/// The first decode or metric error aborts the scan immediately and is
/// returned as-is — partial match tables are never produced.
pub fn match_frames<I>(
    source_name: &str,
    candidates: I,
    references: &[ReferenceFrame],
    mode: DiffMode,
    total_frames: Option<u64>,
    observer: &dyn ScanObserver,
) -> Result<Vec<FrameMatch>, FrameMatchError>
where
    I: IntoIterator<Item = Result<PlaneFrame, FrameMatchError>>,
{
    let mut matches = vec![FrameMatch::unmatched(); references.len()];
    let started = Instant::now();
    let mut scanned: u64 = 0;

    for (frame_index, candidate) in candidates.into_iter().enumerate() {
        let candidate = candidate?;
        let frame_index = frame_index as u64;

        for (position, reference) in references.iter().enumerate() {
            let score = frame_diff(&reference.frame, &candidate, mode)?;
            update_best(&mut matches[position], frame_index, score);
        }

        scanned += 1;
        if frame_index % PROGRESS_INTERVAL == 0 {
            observer.on_progress(&ScanUpdate {
                source: source_name,
                scanned,
                total: total_frames,
                matches: &matches,
                elapsed: started.elapsed(),
            });
        }
    }

    observer.on_progress(&ScanUpdate {
        source: source_name,
        scanned,
        total: total_frames,
        matches: &matches,
        elapsed: started.elapsed(),
    });

    log::debug!(
        "Scan of {source_name} finished after {scanned} frame(s) in {:.2?}",
        started.elapsed(),
    );

    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plane::test_support::{solid_frame, split_frame};
    use crate::progress::NoOpObserver;

    fn reference(index: u64, frame: PlaneFrame) -> ReferenceFrame {
        ReferenceFrame { index, frame }
    }

    fn ok_frames(values: &[u8]) -> Vec<Result<PlaneFrame, FrameMatchError>> {
        values.iter().map(|&value| Ok(solid_frame(value))).collect()
    }

    #[test]
    fn finds_the_closest_candidate_per_reference() {
        let references = vec![
            reference(0, solid_frame(10)),
            reference(1, solid_frame(200)),
        ];
        // Frame 1 is closest to ref 0, frame 3 closest to ref 1.
        let candidates = ok_frames(&[120, 20, 90, 190]);

        let matches = match_frames(
            "synthetic",
            candidates,
            &references,
            DiffMode::Fast,
            None,
            &NoOpObserver,
        )
        .unwrap();

        assert_eq!(matches[0].frame_index, 1);
        assert_eq!(matches[1].frame_index, 3);
        assert!(matches.iter().all(FrameMatch::is_matched));
    }

    #[test]
    fn ties_keep_the_earlier_frame() {
        let references = vec![reference(0, solid_frame(100))];
        // Frames 1 and 2 score identically; frame 1 must win.
        let candidates = ok_frames(&[0, 90, 90, 0]);

        let matches = match_frames(
            "synthetic",
            candidates,
            &references,
            DiffMode::Fast,
            None,
            &NoOpObserver,
        )
        .unwrap();

        assert_eq!(matches[0].frame_index, 1);
    }

    #[test]
    fn empty_scan_leaves_the_sentinel() {
        let references = vec![reference(0, solid_frame(0))];
        let matches = match_frames(
            "synthetic",
            Vec::new(),
            &references,
            DiffMode::Fast,
            None,
            &NoOpObserver,
        )
        .unwrap();

        assert_eq!(matches[0].frame_index, UNMATCHED);
        assert!(!matches[0].is_matched());
    }

    #[test]
    fn precision_mode_can_change_the_winner() {
        // Both candidates share the reference's luma; only chroma differs.
        let references = vec![reference(0, split_frame(100, 50))];
        let frames = [split_frame(100, 255), split_frame(100, 50)];
        let candidates = || frames.iter().cloned().map(Ok).collect::<Vec<_>>();

        let fast = match_frames(
            "synthetic",
            candidates(),
            &references,
            DiffMode::Fast,
            None,
            &NoOpObserver,
        )
        .unwrap();
        // Fast mode sees a tie on luma; the earlier frame wins.
        assert_eq!(fast[0].frame_index, 0);

        let precise = match_frames(
            "synthetic",
            candidates(),
            &references,
            DiffMode::Precision,
            None,
            &NoOpObserver,
        )
        .unwrap();
        assert_eq!(precise[0].frame_index, 1);
    }

    #[test]
    fn decode_error_aborts_the_scan() {
        let references = vec![reference(0, solid_frame(0))];
        let candidates = vec![
            Ok(solid_frame(10)),
            Err(FrameMatchError::Decode {
                path: "broken.mkv".into(),
                frame_index: 1,
                reason: "simulated corruption".to_string(),
            }),
            Ok(solid_frame(0)),
        ];

        let error = match_frames(
            "synthetic",
            candidates,
            &references,
            DiffMode::Fast,
            None,
            &NoOpObserver,
        )
        .unwrap_err();

        assert!(matches!(error, FrameMatchError::Decode { frame_index: 1, .. }));
    }

    #[test]
    fn rerunning_the_scan_is_deterministic() {
        let references = vec![
            reference(0, solid_frame(33)),
            reference(1, solid_frame(77)),
        ];
        let values = [5u8, 40, 33, 80, 77, 33];

        let run = || {
            match_frames(
                "synthetic",
                ok_frames(&values),
                &references,
                DiffMode::Fast,
                None,
                &NoOpObserver,
            )
            .unwrap()
        };

        assert_eq!(run(), run());
    }
}
