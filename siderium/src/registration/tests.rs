//! End-to-end alignment scenarios over synthetic star fields.

use glam::Vec2;

use crate::testing::synthetic::{random_star_positions, render_star_field};

use super::*;

const FIELD: usize = 256;
const STAR_SIGMA: f32 = 2.0;

fn extract_all(images: &[crate::Image], config: &RegistrationConfig) -> FrameStack {
    let mut extractor = FrameExtractor::new(config.clone());
    let mut stack = FrameStack::new();
    for (i, image) in images.iter().enumerate() {
        extractor.process(image, i, &mut stack).unwrap();
    }
    stack
}

fn translated(positions: &[Vec2], offset: Vec2) -> Vec<Vec2> {
    positions.iter().map(|&p| p + offset).collect()
}

#[test]
fn test_two_translated_frames() {
    // Frame 1 is frame 0 with all star positions shifted by t; the aligner
    // maps frame 1's stars back into frame 0's coordinates, so the offset
    // difference between the frames recovers t.
    let t = Vec2::new(7.0, -3.0);
    let positions = random_star_positions(15, FIELD, FIELD, 40.0, 28.0, 3);
    let images = [
        render_star_field(FIELD, FIELD, &positions, STAR_SIGMA),
        render_star_field(FIELD, FIELD, &translated(&positions, t), STAR_SIGMA),
    ];

    let config = RegistrationConfig::default();
    let stack = extract_all(&images, &config);
    assert_eq!(stack.len(), 2);

    let result = align(&stack, &config).unwrap();

    assert_eq!(result.reference_frame, 0);
    assert_eq!(result.offsets[0], Vec2::ZERO);

    let recovered = result.offsets[0] - result.offsets[1];
    assert!(
        (recovered.x - t.x).abs() < 0.5 && (recovered.y - t.y).abs() < 0.5,
        "recovered translation {:?}, expected {:?}",
        recovered,
        t
    );

    // frame.stars + offset lands in reference coordinates.
    assert!((result.offsets[1].x + t.x).abs() < 0.5);
    assert!((result.offsets[1].y + t.y).abs() < 0.5);
}

#[test]
fn test_reference_is_frame_with_most_stars() {
    // The second image carries the full field; the first only part of it.
    let t = Vec2::new(-4.0, 9.0);
    let positions = random_star_positions(15, FIELD, FIELD, 40.0, 28.0, 11);
    let partial: Vec<Vec2> = translated(&positions[..10], t);
    let images = [
        render_star_field(FIELD, FIELD, &partial, STAR_SIGMA),
        render_star_field(FIELD, FIELD, &positions, STAR_SIGMA),
    ];

    let config = RegistrationConfig::default();
    let stack = extract_all(&images, &config);
    let result = align(&stack, &config).unwrap();

    assert_eq!(result.reference_frame, 1);
    assert_eq!(result.offsets[1], Vec2::ZERO);

    // partial.star - t is the matching full-field star.
    assert!((result.offsets[0].x + t.x).abs() < 0.5);
    assert!((result.offsets[0].y + t.y).abs() < 0.5);
}

#[test]
fn test_reference_tie_resolves_to_lowest_index() {
    let positions = random_star_positions(12, FIELD, FIELD, 40.0, 28.0, 5);
    let image = render_star_field(FIELD, FIELD, &positions, STAR_SIGMA);
    let images = [image.clone(), image];

    let config = RegistrationConfig::default();
    let stack = extract_all(&images, &config);
    let result = align(&stack, &config).unwrap();

    assert_eq!(result.reference_frame, 0);
    assert_eq!(result.offsets[0], Vec2::ZERO);
    assert!(result.offsets[1].length() < 0.25);
}

#[test]
fn test_three_frames_each_get_an_offset() {
    let t1 = Vec2::new(5.0, 2.0);
    let t2 = Vec2::new(-6.0, -4.0);
    let positions = random_star_positions(14, FIELD, FIELD, 40.0, 28.0, 23);
    let images = [
        render_star_field(FIELD, FIELD, &positions, STAR_SIGMA),
        render_star_field(FIELD, FIELD, &translated(&positions, t1), STAR_SIGMA),
        render_star_field(FIELD, FIELD, &translated(&positions, t2), STAR_SIGMA),
    ];

    let config = RegistrationConfig::default();
    let stack = extract_all(&images, &config);
    assert_eq!(stack.len(), 3);

    let result = align(&stack, &config).unwrap();

    // Every frame has exactly one recorded offset.
    assert_eq!(result.offsets.len(), 3);
    assert_eq!(result.offsets[result.reference_frame], Vec2::ZERO);

    assert!((result.offsets[1].x + t1.x).abs() < 0.5);
    assert!((result.offsets[1].y + t1.y).abs() < 0.5);
    assert!((result.offsets[2].x + t2.x).abs() < 0.5);
    assert!((result.offsets[2].y + t2.y).abs() < 0.5);
}

#[test]
fn test_small_dedup_radius_still_aligns() {
    // With a tiny dedup radius the catalog keeps near-duplicate stars after
    // each merge; the recovered translations must not change.
    let t = Vec2::new(3.0, 6.0);
    let positions = random_star_positions(12, FIELD, FIELD, 40.0, 28.0, 41);
    let images = [
        render_star_field(FIELD, FIELD, &positions, STAR_SIGMA),
        render_star_field(FIELD, FIELD, &translated(&positions, t), STAR_SIGMA),
    ];

    let config = RegistrationConfig {
        dedup_radius: 1.0,
        ..Default::default()
    };
    let stack = extract_all(&images, &config);
    let result = align(&stack, &config).unwrap();

    assert_eq!(result.reference_frame, 0);
    assert!((result.offsets[1].x + t.x).abs() < 0.5);
    assert!((result.offsets[1].y + t.y).abs() < 0.5);
}

#[test]
fn test_align_empty_stack_errors() {
    let stack = FrameStack::new();
    let err = align(&stack, &RegistrationConfig::default()).unwrap_err();
    assert!(matches!(err, AlignError::EmptyStack));
}

#[test]
fn test_single_frame_is_reference_with_zero_offset() {
    let positions = random_star_positions(10, FIELD, FIELD, 40.0, 30.0, 17);
    let images = [render_star_field(FIELD, FIELD, &positions, STAR_SIGMA)];

    let config = RegistrationConfig::default();
    let stack = extract_all(&images, &config);
    let result = align(&stack, &config).unwrap();

    assert_eq!(result.reference_frame, 0);
    assert_eq!(result.offsets, vec![Vec2::ZERO]);
}
