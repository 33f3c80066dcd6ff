use super::*;

fn no_open() -> PreprocessConfig {
    PreprocessConfig {
        open_radius: 0,
        ..PreprocessConfig::default()
    }
}

#[test]
fn every_colour_channel_must_exceed_threshold() {
    let data = vec![
        250, 250, 250, 255, //
        250, 250, 200, 255, //
        236, 236, 236, 0, //
        235, 235, 235, 255,
    ];
    let raster = Raster::new(4, 1, 4, data).unwrap();
    let mask = binarize(&raster, &no_open());
    assert_eq!(mask.as_raw(), &vec![255, 0, 255, 0]);
}

#[test]
fn grey_images_use_their_single_channel() {
    let raster = Raster::new(3, 1, 2, vec![240, 0, 10, 255, 255, 255]).unwrap();
    let mask = binarize(&raster, &no_open());
    assert_eq!(mask.as_raw(), &vec![255, 0, 255]);
}

#[test]
fn opening_removes_specks_but_keeps_blocks() {
    let mut img = image::GrayImage::new(20, 20);
    img.put_pixel(2, 2, image::Luma([255]));
    imageproc::drawing::draw_filled_rect_mut(
        &mut img,
        imageproc::rect::Rect::at(8, 8).of_size(8, 8),
        image::Luma([255]),
    );
    let raster = Raster::from_dynamic(&image::DynamicImage::ImageLuma8(img)).unwrap();

    let mask = binarize(&raster, &PreprocessConfig::default());
    assert_eq!(mask.get_pixel(2, 2).0[0], MASK_DARK);
    assert_eq!(mask.get_pixel(8, 8).0[0], MASK_BRIGHT);
    assert_eq!(mask.get_pixel(12, 12).0[0], MASK_BRIGHT);
}

#[test]
fn saturated_threshold_is_a_config_error() {
    let cfg = PreprocessConfig {
        brightness_threshold: 255,
        open_radius: 0,
    };
    assert!(matches!(cfg.validate(), Err(LettererError::Config(_))));
}
