//! Resize filter selection.
//!
//! All downscaling and export-time resampling goes through FFmpeg's software
//! scaler. Rather than passing filter names through to FFmpeg as strings and
//! failing at scale time, the supported filters form a closed enum resolved
//! once at startup — an unrecognised name is a configuration error before
//! any decoding begins.

use std::{fmt, str::FromStr};

use ffmpeg_next::software::scaling::Flags as ScalingFlags;

use crate::error::FrameMatchError;

/// A resampling filter supported by the software scaler.
///
/// The default is [`Spline`](ResizeFilter::Spline), a high-quality spline
/// kernel well suited to comparison downscaling, where ringing artifacts
/// would pollute the difference metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeFilter {
    /// Nearest-neighbour sampling.
    Point,
    /// Bilinear interpolation.
    Bilinear,
    /// Bicubic interpolation.
    Bicubic,
    /// Averaging area resampling.
    Area,
    /// Natural bicubic spline. This is the default.
    #[default]
    Spline,
    /// Lanczos windowed sinc.
    Lanczos,
}

/// Names accepted by [`ResizeFilter::from_str`], for error messages.
const SUPPORTED_NAMES: &str = "point, bilinear, bicubic, area, spline, lanczos";

impl ResizeFilter {
    /// Map to the corresponding software-scaler flag.
    pub(crate) fn to_scaling_flags(self) -> ScalingFlags {
        match self {
            ResizeFilter::Point => ScalingFlags::POINT,
            ResizeFilter::Bilinear => ScalingFlags::BILINEAR,
            ResizeFilter::Bicubic => ScalingFlags::BICUBIC,
            ResizeFilter::Area => ScalingFlags::AREA,
            ResizeFilter::Spline => ScalingFlags::SPLINE,
            ResizeFilter::Lanczos => ScalingFlags::LANCZOS,
        }
    }

    /// The canonical lowercase name of this filter.
    pub fn name(self) -> &'static str {
        match self {
            ResizeFilter::Point => "point",
            ResizeFilter::Bilinear => "bilinear",
            ResizeFilter::Bicubic => "bicubic",
            ResizeFilter::Area => "area",
            ResizeFilter::Spline => "spline",
            ResizeFilter::Lanczos => "lanczos",
        }
    }
}

impl fmt::Display for ResizeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResizeFilter {
    type Err = FrameMatchError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "point" | "nearest" => Ok(ResizeFilter::Point),
            "bilinear" => Ok(ResizeFilter::Bilinear),
            "bicubic" => Ok(ResizeFilter::Bicubic),
            "area" => Ok(ResizeFilter::Area),
            "spline" | "spline36" => Ok(ResizeFilter::Spline),
            "lanczos" => Ok(ResizeFilter::Lanczos),
            _ => Err(FrameMatchError::UnknownResizeFilter {
                name: value.to_string(),
                supported: SUPPORTED_NAMES.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_names_case_insensitively() {
        assert_eq!("spline".parse::<ResizeFilter>().unwrap(), ResizeFilter::Spline);
        assert_eq!("Spline36".parse::<ResizeFilter>().unwrap(), ResizeFilter::Spline);
        assert_eq!("LANCZOS".parse::<ResizeFilter>().unwrap(), ResizeFilter::Lanczos);
        assert_eq!("nearest".parse::<ResizeFilter>().unwrap(), ResizeFilter::Point);
    }

    #[test]
    fn rejects_unknown_names() {
        let error = "gauss".parse::<ResizeFilter>().unwrap_err();
        assert!(matches!(
            error,
            FrameMatchError::UnknownResizeFilter { ref name, .. } if name == "gauss"
        ));
    }

    #[test]
    fn default_is_spline() {
        assert_eq!(ResizeFilter::default(), ResizeFilter::Spline);
    }
}
