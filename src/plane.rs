//! Comparison-frame data model.
//!
//! Matching never runs on full-resolution frames. Every source is resampled
//! to a shared comparison resolution in planar YUV 4:2:0, and the scan works
//! on [`PlaneFrame`] values — one owned pixel buffer per plane, stripped of
//! FFmpeg's per-row stride padding.

use ffmpeg_next::frame::Video as VideoFrame;

/// Number of planes carried by a comparison frame (Y, U, V).
pub const PLANE_COUNT: usize = 3;

/// One colour/luma channel of a downscaled frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plane {
    /// Plane width in pixels. Chroma planes of 4:2:0 content are half the
    /// luma width.
    pub width: u32,
    /// Plane height in pixels.
    pub height: u32,
    /// Tightly packed 8-bit samples, row-major, `width * height` long.
    pub data: Vec<u8>,
}

impl Plane {
    /// Geometry as a `WxH` string, for error messages.
    pub(crate) fn geometry(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

/// The planar pixel content of one downscaled frame.
///
/// Index 0 is luma; indices 1 and 2 are the chroma planes. Fast matching
/// reads only the luma plane, precision matching reads all three.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaneFrame {
    /// The three planes, luma first.
    pub planes: [Plane; PLANE_COUNT],
}

impl PlaneFrame {
    /// Copy the planes of a decoded YUV420P frame into owned, unpadded
    /// buffers.
    ///
    /// FFmpeg frames frequently carry per-row padding (stride > width), so
    /// each plane is copied row by row unless the stride already matches.
    pub(crate) fn from_yuv420(frame: &VideoFrame) -> Self {
        let luma_width = frame.width();
        let luma_height = frame.height();
        let chroma_width = luma_width.div_ceil(2);
        let chroma_height = luma_height.div_ceil(2);

        let planes = [
            copy_plane(frame, 0, luma_width, luma_height),
            copy_plane(frame, 1, chroma_width, chroma_height),
            copy_plane(frame, 2, chroma_width, chroma_height),
        ];

        Self { planes }
    }

    /// The luma plane.
    pub fn luma(&self) -> &Plane {
        &self.planes[0]
    }
}

/// Strip stride padding from one plane of a decoded frame.
fn copy_plane(frame: &VideoFrame, index: usize, width: u32, height: u32) -> Plane {
    let stride = frame.stride(index);
    let row_bytes = width as usize;
    let data = frame.data(index);

    let buffer = if stride == row_bytes {
        data[..row_bytes * height as usize].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(row_bytes * height as usize);
        for row in 0..height as usize {
            let start = row * stride;
            buffer.extend_from_slice(&data[start..start + row_bytes]);
        }
        buffer
    };

    Plane {
        width,
        height,
        data: buffer,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::{PLANE_COUNT, Plane, PlaneFrame};

    /// Build a comparison frame with every sample of every plane set to
    /// `value`, using a tiny 4x4 luma / 2x2 chroma geometry.
    pub(crate) fn solid_frame(value: u8) -> PlaneFrame {
        let dims = [(4u32, 4u32), (2, 2), (2, 2)];
        let planes: [Plane; PLANE_COUNT] = dims.map(|(width, height)| Plane {
            width,
            height,
            data: vec![value; (width * height) as usize],
        });
        PlaneFrame { planes }
    }

    /// Build a frame whose luma is `luma` but whose chroma planes are
    /// `chroma`, to distinguish fast and precision matching in tests.
    pub(crate) fn split_frame(luma: u8, chroma: u8) -> PlaneFrame {
        let mut frame = solid_frame(chroma);
        frame.planes[0] = Plane {
            width: 4,
            height: 4,
            data: vec![luma; 16],
        };
        frame
    }
}
