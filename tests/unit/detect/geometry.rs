use super::*;

fn square(side: f64) -> Vec<Point> {
    vec![
        Point::new(0.0, 0.0),
        Point::new(side, 0.0),
        Point::new(side, side),
        Point::new(0.0, side),
    ]
}

#[test]
fn square_measurements() {
    let sq = square(4.0);
    assert_eq!(polygon_area(&sq), 16.0);
    assert_eq!(polygon_perimeter(&sq), 16.0);
    assert_eq!(polygon_centroid(&sq), Point::new(2.0, 2.0));
    assert_eq!(polygon_extent(&sq), Rect::new(0.0, 0.0, 4.0, 4.0));
}

#[test]
fn area_ignores_winding() {
    let mut sq = square(3.0);
    sq.reverse();
    assert_eq!(polygon_area(&sq), 9.0);
}

#[test]
fn hull_of_notched_shape_fills_the_notch() {
    // 4x4 square with a 2x2 bite out of the top edge.
    let notched = vec![
        Point::new(0.0, 0.0),
        Point::new(1.0, 0.0),
        Point::new(1.0, 2.0),
        Point::new(3.0, 2.0),
        Point::new(3.0, 0.0),
        Point::new(4.0, 0.0),
        Point::new(4.0, 4.0),
        Point::new(0.0, 4.0),
    ];
    let hull = convex_hull(&notched);
    assert_eq!(hull.len(), 4);
    assert_eq!(polygon_area(&hull), 16.0);
    assert_eq!(polygon_area(&notched), 12.0);
}

#[test]
fn hull_drops_collinear_and_duplicate_points() {
    let pts = vec![
        Point::new(0.0, 0.0),
        Point::new(1.0, 0.0),
        Point::new(2.0, 0.0),
        Point::new(2.0, 0.0),
        Point::new(2.0, 2.0),
        Point::new(0.0, 2.0),
        Point::new(1.0, 1.0),
    ];
    assert_eq!(convex_hull(&pts).len(), 4);
}

#[test]
fn degenerate_inputs_are_harmless() {
    assert_eq!(polygon_area(&[]), 0.0);
    assert_eq!(polygon_perimeter(&[Point::new(1.0, 1.0)]), 0.0);
    let line = vec![Point::new(0.0, 0.0), Point::new(4.0, 0.0)];
    assert_eq!(polygon_centroid(&line), Point::new(2.0, 0.0));
    assert_eq!(convex_hull(&line).len(), 2);
}
