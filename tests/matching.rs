//! Matching behavior through the public API, driven by synthetic frames.
//!
//! No fixtures needed: `PlaneFrame` buffers are built by hand, so these
//! tests exercise the scan loop, the update rule, and the coordinator
//! contract without decoding any video.

use framematch::{
    DiffMode, FrameMatch, FrameMatchError, NoOpObserver, Plane, PlaneFrame, ReferenceFrame,
    UNMATCHED, match_frames,
};

/// A 4x4 luma / 2x2 chroma frame with every sample set to `value`.
fn solid(value: u8) -> PlaneFrame {
    let plane = |width: u32, height: u32| Plane {
        width,
        height,
        data: vec![value; (width * height) as usize],
    };
    PlaneFrame {
        planes: [plane(4, 4), plane(2, 2), plane(2, 2)],
    }
}

fn reference(index: u64, value: u8) -> ReferenceFrame {
    ReferenceFrame {
        index,
        frame: solid(value),
    }
}

fn candidates(values: &[u8]) -> Vec<Result<PlaneFrame, FrameMatchError>> {
    values.iter().map(|&value| Ok(solid(value))).collect()
}

#[test]
fn every_reference_gets_its_best_candidate() {
    let references = vec![reference(16, 10), reference(32, 128), reference(48, 250)];
    let frames = candidates(&[0, 12, 64, 130, 200, 251, 90]);

    let matches = match_frames(
        "synthetic",
        frames,
        &references,
        DiffMode::Fast,
        Some(7),
        &NoOpObserver,
    )
    .unwrap();

    assert_eq!(matches.len(), 3);
    assert_eq!(matches[0].frame_index, 1); // 12 is closest to 10
    assert_eq!(matches[1].frame_index, 3); // 130 is closest to 128
    assert_eq!(matches[2].frame_index, 5); // 251 is closest to 250
}

#[test]
fn sentinel_is_replaced_after_a_full_scan() {
    assert_eq!(FrameMatch::unmatched().frame_index, UNMATCHED);

    let references = vec![reference(0, 40), reference(1, 90)];
    let matches = match_frames(
        "synthetic",
        candidates(&[1, 2, 3]),
        &references,
        DiffMode::Fast,
        None,
        &NoOpObserver,
    )
    .unwrap();

    assert!(matches.iter().all(|entry| entry.frame_index >= 0));
}

#[test]
fn equal_scores_retain_the_earlier_frame() {
    // 95 and 105 are both 10 away from 100, as are the repeats.
    let references = vec![reference(0, 100)];
    let matches = match_frames(
        "synthetic",
        candidates(&[95, 105, 95, 105]),
        &references,
        DiffMode::Fast,
        None,
        &NoOpObserver,
    )
    .unwrap();

    assert_eq!(matches[0].frame_index, 0);
}

#[test]
fn one_pass_matches_match_per_reference_sequential_passes() {
    // Scanning all references in one pass must score identically to one
    // pass per reference.
    let references = vec![reference(0, 10), reference(1, 100), reference(2, 240)];
    let values = [7u8, 99, 150, 239, 11, 100];

    let combined = match_frames(
        "combined",
        candidates(&values),
        &references,
        DiffMode::Fast,
        None,
        &NoOpObserver,
    )
    .unwrap();

    for (position, single) in references.iter().enumerate() {
        let alone = match_frames(
            "single",
            candidates(&values),
            std::slice::from_ref(single),
            DiffMode::Fast,
            None,
            &NoOpObserver,
        )
        .unwrap();
        assert_eq!(alone[0], combined[position], "reference {position}");
    }
}

#[test]
fn injected_decode_failure_poisons_the_whole_scan() {
    let references = vec![reference(0, 128)];
    let mut frames = candidates(&[1, 2, 3]);
    frames.insert(
        2,
        Err(FrameMatchError::Decode {
            path: "candidate.mkv".into(),
            frame_index: 2,
            reason: "truncated packet".to_string(),
        }),
    );

    let result = match_frames(
        "synthetic",
        frames,
        &references,
        DiffMode::Fast,
        None,
        &NoOpObserver,
    );

    assert!(matches!(
        result,
        Err(FrameMatchError::Decode { frame_index: 2, .. })
    ));
}

#[test]
fn no_references_yields_an_empty_row() {
    let matches = match_frames(
        "synthetic",
        candidates(&[1, 2, 3]),
        &[],
        DiffMode::Precision,
        None,
        &NoOpObserver,
    )
    .unwrap();
    assert!(matches.is_empty());
}
