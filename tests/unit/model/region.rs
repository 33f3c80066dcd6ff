use super::*;

#[test]
fn fallback_region_is_a_perfect_rectangle() {
    let r = Region::fallback(PixelRect::new(10, 20, 40, 30));
    assert_eq!(r.tag, RegionTag::Fallback);
    assert_eq!(r.area, 1200.0);
    assert_eq!(r.solidity, 1.0);
    assert_eq!(r.rectangularity, 1.0);
    assert_eq!(r.centroid, Point::new(30.0, 35.0));
    assert_eq!(r.contour.len(), 4);
}

#[test]
fn interior_rect_applies_ratio_and_floor() {
    let r = Region::fallback(PixelRect::new(0, 0, 200, 100));
    assert_eq!(r.interior_rect(0.15, 2), PixelRect::new(30, 15, 140, 70));
    assert_eq!(r.interior_rect(0.0, 4), PixelRect::new(4, 4, 192, 92));
}

#[test]
fn interior_rect_of_tiny_region_is_still_non_empty() {
    let r = Region::fallback(PixelRect::new(5, 5, 2, 1));
    let inner = r.interior_rect(0.4, 10);
    assert!(!inner.is_empty());
    assert!(r.bbox.contains_rect(inner));
}
