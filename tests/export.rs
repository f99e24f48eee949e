//! Image writer and export naming tests.

use std::path::Path;

use framematch::{FrameMatchError, ImageWriter, PngWriter, match_file_name, parse_dimensions};
use image::{DynamicImage, RgbImage};

fn test_image(width: u32, height: u32, value: u8) -> DynamicImage {
    let buffer = RgbImage::from_pixel(width, height, image::Rgb([value, value, value]));
    DynamicImage::ImageRgb8(buffer)
}

#[test]
fn png_writer_writes_and_overwrites_unconditionally() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir
        .path()
        .join(match_file_name("sourceA", 16, 16, false));

    let writer = PngWriter;
    writer.write(&test_image(8, 8, 0), &path).expect("first write");
    let first_size = std::fs::metadata(&path).unwrap().len();
    assert!(first_size > 0);

    // Second write replaces the file without complaint.
    writer.write(&test_image(32, 32, 255), &path).expect("overwrite");
    let second_size = std::fs::metadata(&path).unwrap().len();
    assert_ne!(first_size, second_size);
}

#[test]
fn png_writer_reports_unwritable_paths() {
    let writer = PngWriter;
    let path = Path::new("/nonexistent-directory-for-framematch-tests/frame.png");
    let error = writer.write(&test_image(4, 4, 0), path).unwrap_err();
    assert!(matches!(error, FrameMatchError::ImageWrite { .. }));
}

#[test]
fn file_names_follow_the_grouping_convention() {
    assert_eq!(match_file_name("sourceA", 16, 16, false), "sourceA-16-(16).png");
    assert_eq!(match_file_name("sourceA", 16, 16, true), "16-sourceA-(16).png");
    // Matched index differs from the reference index for non-reference
    // sources.
    assert_eq!(
        match_file_name("episode02.mkv", 4800, 4795, false),
        "episode02.mkv-4800-(4795).png"
    );
}

#[test]
fn dimension_strings_round_trip_through_the_cli_format() {
    assert_eq!(parse_dimensions("640x480").unwrap(), (640, 480));
    assert!(parse_dimensions("640by480").is_err());
    assert!(matches!(
        parse_dimensions("0x0").unwrap_err(),
        FrameMatchError::MalformedDimensions { .. }
    ));
}
