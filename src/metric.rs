//! Frame difference metric.
//!
//! The metric is the mean absolute pixel difference between two frames'
//! plane data, normalised to `0.0..=1.0` per plane. Lower is more similar.
//! Fast mode reads only the luma plane; precision mode sums the statistic
//! across all three planes.

use crate::{
    error::FrameMatchError,
    plane::{PLANE_COUNT, Plane, PlaneFrame},
};

/// Which planes participate in the difference metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiffMode {
    /// Compare the luma plane only. This is the default; chroma rarely
    /// changes the winner and tripling the work seldom pays off.
    #[default]
    Fast,
    /// Sum the per-plane statistic across luma and both chroma planes.
    Precision,
}

/// Mean absolute sample difference between two planes, in `0.0..=1.0`.
///
/// # Errors
///
/// Returns [`FrameMatchError::PlaneMismatch`] if the planes do not share
/// geometry. All sources are resampled to one comparison resolution before
/// matching, so a mismatch indicates an upstream scaling bug and must abort
/// the run.
pub fn plane_diff(reference: &Plane, candidate: &Plane) -> Result<f64, FrameMatchError> {
    if reference.width != candidate.width
        || reference.height != candidate.height
        || reference.data.len() != candidate.data.len()
    {
        return Err(FrameMatchError::PlaneMismatch {
            expected: reference.geometry(),
            actual: candidate.geometry(),
        });
    }

    if reference.data.is_empty() {
        return Ok(0.0);
    }

    let total: u64 = reference
        .data
        .iter()
        .zip(&candidate.data)
        .map(|(&a, &b)| u64::from(a.abs_diff(b)))
        .sum();

    Ok(total as f64 / (reference.data.len() as f64 * 255.0))
}

/// Difference score between two comparison frames under the given mode.
///
/// # Errors
///
/// Propagates [`FrameMatchError::PlaneMismatch`] from [`plane_diff`].
pub fn frame_diff(
    reference: &PlaneFrame,
    candidate: &PlaneFrame,
    mode: DiffMode,
) -> Result<f64, FrameMatchError> {
    match mode {
        DiffMode::Fast => plane_diff(reference.luma(), candidate.luma()),
        DiffMode::Precision => {
            let mut score = 0.0;
            for plane in 0..PLANE_COUNT {
                score += plane_diff(&reference.planes[plane], &candidate.planes[plane])?;
            }
            Ok(score)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plane::test_support::{solid_frame, split_frame};

    #[test]
    fn identical_frames_score_zero() {
        let a = solid_frame(128);
        let b = solid_frame(128);
        assert_eq!(frame_diff(&a, &b, DiffMode::Fast).unwrap(), 0.0);
        assert_eq!(frame_diff(&a, &b, DiffMode::Precision).unwrap(), 0.0);
    }

    #[test]
    fn opposite_frames_score_one_per_plane() {
        let black = solid_frame(0);
        let white = solid_frame(255);
        assert_eq!(frame_diff(&black, &white, DiffMode::Fast).unwrap(), 1.0);
        assert_eq!(frame_diff(&black, &white, DiffMode::Precision).unwrap(), 3.0);
    }

    #[test]
    fn fast_mode_ignores_chroma() {
        let reference = split_frame(100, 0);
        let candidate = split_frame(100, 255);
        assert_eq!(frame_diff(&reference, &candidate, DiffMode::Fast).unwrap(), 0.0);
        let precise = frame_diff(&reference, &candidate, DiffMode::Precision).unwrap();
        assert!(precise > 0.0);
    }

    #[test]
    fn mean_is_normalised() {
        let reference = solid_frame(0);
        let candidate = solid_frame(51);
        let score = frame_diff(&reference, &candidate, DiffMode::Fast).unwrap();
        assert!((score - 0.2).abs() < 1e-9);
    }

    #[test]
    fn mismatched_geometry_is_an_error() {
        let reference = solid_frame(0);
        let mut candidate = solid_frame(0);
        candidate.planes[0].width = 8;
        candidate.planes[0].data = vec![0; 8 * 4];
        let error = frame_diff(&reference, &candidate, DiffMode::Fast).unwrap_err();
        assert!(matches!(error, FrameMatchError::PlaneMismatch { .. }));
    }
}
