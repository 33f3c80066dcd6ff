use super::*;

use crate::{
    detect::{
        extract::{ExtractConfig, extract_regions},
        preprocess::{PreprocessConfig, binarize},
    },
    foundation::core::Raster,
};
use imageproc::{
    drawing::{draw_filled_ellipse_mut, draw_filled_rect_mut},
    rect::Rect as PxRect,
};

const W: u32 = 200;
const H: u32 = 160;

/// Mid-grey noise that never crosses the brightness threshold.
fn noisy_canvas() -> image::RgbImage {
    let mut state = 0x2545_f491_u32;
    image::RgbImage::from_fn(W, H, |_, _| {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        let v = (state >> 24) as u8 % 200;
        image::Rgb([v, v.wrapping_add(17) % 200, v / 2])
    })
}

fn classify_canvas(img: image::RgbImage) -> Vec<Region> {
    let raster = Raster::from_dynamic(&image::DynamicImage::ImageRgb8(img)).unwrap();
    let mask = binarize(&raster, &PreprocessConfig::default());
    let mut regions = extract_regions(&mask, &ExtractConfig::default());
    classify_regions(&mut regions, raster.bounds(), &ClassifierConfig::default());
    regions
}

#[test]
fn white_rectangle_on_noise_is_a_confident_narration_box() {
    let mut img = noisy_canvas();
    draw_filled_rect_mut(
        &mut img,
        PxRect::at(50, 40).of_size(80, 50),
        image::Rgb([255, 255, 255]),
    );
    let regions = classify_canvas(img);
    let boxes = regions
        .iter()
        .filter(|r| r.tag == RegionTag::NarrationBox)
        .collect::<Vec<_>>();
    assert_eq!(boxes.len(), 1);
    assert!(boxes[0].confidence >= 0.9, "confidence {}", boxes[0].confidence);
}

#[test]
fn filled_ellipse_is_a_speech_bubble() {
    let mut img = noisy_canvas();
    draw_filled_ellipse_mut(&mut img, (100, 80), 50, 30, image::Rgb([255, 255, 255]));
    let regions = classify_canvas(img);
    let bubble = regions
        .iter()
        .find(|r| r.tag == RegionTag::SpeechBubble)
        .expect("ellipse should be tagged");
    assert!(bubble.solidity >= 0.9);
    assert!((bubble.rectangularity - FRAC_PI_4).abs() < 0.08);
    assert!(bubble.confidence > 0.5);
}

#[test]
fn concave_plus_shape_is_rejected() {
    let mut img = image::RgbImage::new(W, H);
    let white = image::Rgb([255, 255, 255]);
    draw_filled_rect_mut(&mut img, PxRect::at(50, 70).of_size(100, 20), white);
    draw_filled_rect_mut(&mut img, PxRect::at(90, 30).of_size(20, 100), white);
    let regions = classify_canvas(img);
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].tag, RegionTag::Rejected);
    assert_eq!(regions[0].confidence, 0.0);
}

#[test]
fn edge_spanning_background_is_rejected() {
    let mut img = image::RgbImage::new(W, H);
    draw_filled_rect_mut(
        &mut img,
        PxRect::at(0, 0).of_size(W, 60),
        image::Rgb([255, 255, 255]),
    );
    let regions = classify_canvas(img);
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].tag, RegionTag::Rejected);
}

#[test]
fn area_outside_bounds_is_rejected() {
    let image = PixelRect::new(0, 0, 100, 100);
    let mut r = Region::fallback(PixelRect::new(40, 40, 5, 5));
    assert_eq!(
        classify_region(&r, image, &ClassifierConfig::default()).0,
        RegionTag::Rejected
    );

    r = Region::fallback(PixelRect::new(20, 20, 60, 60));
    let cfg = ClassifierConfig {
        max_area_fraction: 0.3,
        ..ClassifierConfig::default()
    };
    assert_eq!(classify_region(&r, image, &cfg).0, RegionTag::Rejected);
}

#[test]
fn thresholds_come_from_config() {
    let image = PixelRect::new(0, 0, 100, 100);
    let mut r = Region::fallback(PixelRect::new(30, 30, 40, 40));
    r.rectangularity = 0.9;
    r.solidity = 0.95;
    let default = classify_region(&r, image, &ClassifierConfig::default());
    assert_eq!(default.0, RegionTag::SpeechBubble);

    let loose = ClassifierConfig {
        rectangularity_threshold: 0.85,
        ..ClassifierConfig::default()
    };
    assert_eq!(classify_region(&r, image, &loose).0, RegionTag::NarrationBox);
}

#[test]
fn margin_scales_headroom() {
    assert_eq!(margin(1.0, 0.92), 1.0);
    assert_eq!(margin(0.5, 0.92), 0.0);
    assert!((margin(0.96, 0.92) - 0.5).abs() < 1e-9);
    assert_eq!(margin(1.0, 1.0), 1.0);
}

#[test]
fn invalid_config_is_reported() {
    let inverted = ClassifierConfig {
        min_area_fraction: 0.6,
        max_area_fraction: 0.4,
        ..ClassifierConfig::default()
    };
    assert!(inverted.validate().is_err());

    let out_of_range = ClassifierConfig {
        speech_min_solidity: 1.5,
        ..ClassifierConfig::default()
    };
    assert!(out_of_range.validate().is_err());
    assert!(ClassifierConfig::default().validate().is_ok());
}
