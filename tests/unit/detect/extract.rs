use super::*;

use imageproc::{drawing::draw_filled_rect_mut, rect::Rect as PxRect};

fn mask_with_rects(w: u32, h: u32, rects: &[(i32, i32, u32, u32)]) -> image::GrayImage {
    let mut mask = image::GrayImage::new(w, h);
    for &(x, y, rw, rh) in rects {
        draw_filled_rect_mut(
            &mut mask,
            PxRect::at(x, y).of_size(rw, rh),
            image::Luma([MASK_BRIGHT]),
        );
    }
    mask
}

#[test]
fn filled_rectangle_is_a_perfect_box() {
    let mask = mask_with_rects(100, 80, &[(10, 20, 40, 30)]);
    let regions = extract_regions(&mask, &ExtractConfig::default());
    assert_eq!(regions.len(), 1);

    let r = &regions[0];
    assert_eq!(r.bbox, PixelRect::new(10, 20, 40, 30));
    assert_eq!(r.pixel_count, 1200);
    assert_eq!(r.area, 39.0 * 29.0);
    assert!((r.rectangularity - 1.0).abs() < 1e-9);
    assert!((r.solidity - 1.0).abs() < 1e-9);
    assert!((r.centroid.x - 30.0).abs() < 1e-9);
    assert!((r.centroid.y - 35.0).abs() < 1e-9);
    assert_eq!(r.tag, RegionTag::Rejected);
}

#[test]
fn regions_follow_raster_scan_order() {
    let mask = mask_with_rects(100, 100, &[(60, 5, 20, 20), (5, 50, 20, 20), (5, 5, 20, 20)]);
    let regions = extract_regions(&mask, &ExtractConfig::default());
    let origins = regions
        .iter()
        .map(|r| (r.bbox.x, r.bbox.y))
        .collect::<Vec<_>>();
    assert_eq!(origins, vec![(5, 5), (60, 5), (5, 50)]);
}

#[test]
fn diagonal_neighbours_join_one_component() {
    let mask = mask_with_rects(60, 60, &[(5, 5, 10, 10), (15, 15, 10, 10)]);
    let regions = extract_regions(&mask, &ExtractConfig::default());
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].bbox, PixelRect::new(5, 5, 20, 20));
    assert!(regions[0].solidity < 0.9);
}

#[test]
fn noise_below_floor_is_dropped() {
    let mask = mask_with_rects(50, 50, &[(2, 2, 8, 8), (20, 20, 9, 9)]);
    let cfg = ExtractConfig {
        min_component_pixels: 64,
    };
    let regions = extract_regions(&mask, &cfg);
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].pixel_count, 81);
}

#[test]
fn edge_touching_component_stays_in_bounds() {
    let mask = mask_with_rects(40, 30, &[(0, 0, 40, 10)]);
    let regions = extract_regions(&mask, &ExtractConfig::default());
    assert_eq!(regions.len(), 1);
    let r = &regions[0];
    assert!(PixelRect::new(0, 0, 40, 30).contains_rect(r.bbox));
    assert!(r.area > 0.0);
    for p in &r.contour {
        assert!(p.x >= 0.0 && p.x <= 40.0 && p.y >= 0.0 && p.y <= 30.0);
    }
}

#[test]
fn thin_lines_enclose_no_area() {
    let mask = mask_with_rects(200, 20, &[(0, 5, 200, 1)]);
    assert!(extract_regions(&mask, &ExtractConfig::default()).is_empty());
}
