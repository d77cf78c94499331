mod common;

use common::synthetic_image::{set_pixel, solid_rgba};
use pixel_select::{ColorSpace, Connectivity, Point, SegmentSource, SelectionEngine, WandSettings, PREVIEW_SEGMENT_ID};

fn engine(width: usize, height: usize, rgba: Vec<u8>) -> SelectionEngine {
    let mut engine = SelectionEngine::new();
    engine.load_rgba(width, height, rgba).unwrap();
    engine
}

#[test]
fn outlier_pixel_is_left_out() {
    let mut img = solid_rgba(4, 4, [100, 100, 100]);
    set_pixel(&mut img, 4, 2, 2, [200, 200, 200]);
    let mut engine = engine(4, 4, img);

    let settings = WandSettings {
        tolerance: 0.3,
        color_space: ColorSpace::Rgb,
        connectivity: Connectivity::Four,
        contiguous: true,
    };
    let segment = engine
        .magic_wand(Point::new(0.0, 0.0), &settings, false)
        .unwrap()
        .expect("seed region is not empty");

    assert_eq!(segment.len(), 15);
    assert!(!segment.contains(2 * 4 + 2));
    assert_eq!(segment.source(), SegmentSource::MagicWand);
    assert_eq!(engine.segments().len(), 1);
}

#[test]
fn global_mode_reaches_disconnected_regions() {
    // Two gray columns split by a white one
    let mut img = solid_rgba(5, 3, [90, 90, 90]);
    for y in 0..3 {
        set_pixel(&mut img, 5, 2, y, [255, 255, 255]);
    }
    let mut engine = engine(5, 3, img);

    let contiguous = WandSettings {
        tolerance: 0.1,
        ..Default::default()
    };
    let global = WandSettings {
        contiguous: false,
        ..contiguous
    };

    let left = engine
        .magic_wand(Point::new(0.5, 0.5), &contiguous, true)
        .unwrap()
        .unwrap();
    assert_eq!(left.len(), 6);

    let both = engine
        .magic_wand(Point::new(0.5, 0.5), &global, true)
        .unwrap()
        .unwrap();
    assert_eq!(both.len(), 12);
    assert_eq!(both.id(), PREVIEW_SEGMENT_ID);
    assert!(engine.segments().is_empty(), "previews are never stored");
}

#[test]
fn every_color_space_selects_a_uniform_image() {
    for color_space in [ColorSpace::Rgb, ColorSpace::Hsv, ColorSpace::Lab] {
        let mut engine = engine(6, 4, solid_rgba(6, 4, [30, 160, 90]));
        let settings = WandSettings {
            tolerance: 0.0,
            color_space,
            ..Default::default()
        };
        let segment = engine
            .magic_wand(Point::new(3.2, 1.7), &settings, false)
            .unwrap()
            .unwrap();
        assert_eq!(segment.len(), 24, "{color_space:?}");
    }
}

#[test]
fn seed_outside_the_image_selects_nothing() {
    let mut engine = engine(4, 4, solid_rgba(4, 4, [0, 0, 0]));
    let result = engine
        .magic_wand(Point::new(-1.0, 2.0), &WandSettings::default(), false)
        .unwrap();
    assert!(result.is_none());
    assert!(engine.segments().is_empty());
}
