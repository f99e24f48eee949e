//! Downscale planning.
//!
//! Matching cost is dominated by per-frame pixel work, so all sources are
//! resampled to one small shared resolution before scanning. The target is
//! derived from the reference source alone: every other source is forced to
//! the same dimensions regardless of its own aspect ratio. Mismatched-aspect
//! sources therefore compare distorted content; this is deliberate — the
//! metric only has to rank candidates within one source, not across sources.

use crate::error::FrameMatchError;

/// Compute the shared comparison resolution for all sources.
///
/// The reference dimensions are reduced by their greatest common divisor,
/// then multiplied by `ratio`. When the reduced aspect ratio has an odd
/// component the divisor is halved (equivalently, the reduced dimensions are
/// doubled) so the result stays even — 4:2:0 chroma subsampling needs even
/// luma dimensions.
///
/// For `(1920, 1080, 5)`: `gcd = 120`, reduced `16x9` has an odd component,
/// so the effective divisor is 60 and the target is `160x90`.
///
/// # Errors
///
/// - [`FrameMatchError::DegenerateDimensions`] if either dimension is zero.
/// - [`FrameMatchError::ZeroRatio`] if `ratio` is zero.
pub fn comparison_dimensions(
    width: u32,
    height: u32,
    ratio: u32,
) -> Result<(u32, u32), FrameMatchError> {
    if width == 0 || height == 0 {
        return Err(FrameMatchError::DegenerateDimensions { width, height });
    }
    if ratio == 0 {
        return Err(FrameMatchError::ZeroRatio);
    }

    let divisor = gcd(width, height);
    let mut reduced_width = width / divisor;
    let mut reduced_height = height / divisor;

    if reduced_width % 2 != 0 || reduced_height % 2 != 0 {
        // Halve the divisor: W / (g/2) == (W/g) * 2.
        reduced_width *= 2;
        reduced_height *= 2;
    }

    Ok((reduced_width * ratio, reduced_height * ratio))
}

/// Greatest common divisor by Euclid's algorithm. Inputs are non-zero.
fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_hd_reduces_to_160x90() {
        assert_eq!(comparison_dimensions(1920, 1080, 5).unwrap(), (160, 90));
    }

    #[test]
    fn odd_reduced_aspect_doubles_the_result() {
        // 1280x720 reduces to 16x9 (odd), same halving as 1080p.
        assert_eq!(comparison_dimensions(1280, 720, 5).unwrap(), (160, 90));
        // 640x480 reduces to 4x3, which has an odd component too.
        assert_eq!(comparison_dimensions(640, 480, 1).unwrap(), (8, 6));
        // 512x256 reduces to 2x1 (odd height), doubled to 4x2.
        assert_eq!(comparison_dimensions(512, 256, 1).unwrap(), (4, 2));
    }

    #[test]
    fn ratio_scales_linearly() {
        let (width_one, height_one) = comparison_dimensions(1920, 1080, 1).unwrap();
        let (width_ten, height_ten) = comparison_dimensions(1920, 1080, 10).unwrap();
        assert_eq!((width_ten, height_ten), (width_one * 10, height_one * 10));
    }

    #[test]
    fn zero_dimension_is_rejected() {
        let error = comparison_dimensions(0, 1080, 5).unwrap_err();
        assert!(matches!(
            error,
            FrameMatchError::DegenerateDimensions { width: 0, height: 1080 }
        ));
    }

    #[test]
    fn zero_ratio_is_rejected() {
        let error = comparison_dimensions(1920, 1080, 0).unwrap_err();
        assert!(matches!(error, FrameMatchError::ZeroRatio));
    }
}
