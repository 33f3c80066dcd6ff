use crate::foundation::core::{PixelRect, Point};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Classification tag assigned to a detected region.
pub enum RegionTag {
    /// Rounded, high hull-fill shape: speech or thought bubble body.
    SpeechBubble,
    /// Clean rectangle: narration caption box.
    NarrationBox,
    /// Noise, background or otherwise unusable shape.
    Rejected,
    /// Synthesized in degraded mode when no candidate matched.
    Fallback,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A candidate empty region traced from a panel raster.
///
/// Descriptors are computed from the outer contour (pixel-centre polygon), so a perfect
/// axis-aligned rectangle has `rectangularity == solidity == 1`.
pub struct Region {
    /// Outer boundary polygon in pixel coordinates, in tracing order.
    pub contour: Vec<Point>,
    /// Pixel bounding box; always inside the source image.
    pub bbox: PixelRect,
    /// Enclosed polygon area in square pixels (> 0).
    pub area: f64,
    /// Closed polygon perimeter in pixels.
    pub perimeter: f64,
    /// `area / convex_hull_area`, in `[0, 1]`.
    pub solidity: f64,
    /// `area / polygon_extent_area`, in `[0, 1]`.
    pub rectangularity: f64,
    /// `4πA / P²`, in `[0, 1]`. Telemetry only.
    pub circularity: f64,
    /// Area centroid of the contour polygon.
    pub centroid: Point,
    /// Number of mask pixels in the connected component.
    pub pixel_count: u64,
    /// Classification tag. Extraction leaves it `Rejected` until classified.
    pub tag: RegionTag,
    /// Classification confidence in `[0, 1]`.
    pub confidence: f64,
}

impl Region {
    /// Synthesize a rectangular region for degraded mode.
    pub fn fallback(rect: PixelRect) -> Self {
        let r = rect.to_rect();
        let contour = vec![
            Point::new(r.x0, r.y0),
            Point::new(r.x1, r.y0),
            Point::new(r.x1, r.y1),
            Point::new(r.x0, r.y1),
        ];
        let area = r.area();
        let perimeter = 2.0 * (r.width() + r.height());
        let circularity = if perimeter > 0.0 {
            (4.0 * std::f64::consts::PI * area / (perimeter * perimeter)).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            contour,
            bbox: rect,
            area,
            perimeter,
            solidity: 1.0,
            rectangularity: 1.0,
            circularity,
            centroid: rect.center(),
            pixel_count: rect.area(),
            tag: RegionTag::Fallback,
            confidence: 0.0,
        }
    }

    /// Usable drawing area: the bounding box minus an inset that keeps text off the border
    /// and tail.
    ///
    /// The inset on each side is `max(inset_px, ratio * side)`, clamped so the result is never
    /// empty.
    pub fn interior_rect(&self, inset_ratio: f64, inset_px: u32) -> PixelRect {
        let ratio = if inset_ratio.is_finite() {
            inset_ratio.clamp(0.0, 0.5)
        } else {
            0.0
        };
        let dx = ((f64::from(self.bbox.width) * ratio).floor() as u32).max(inset_px);
        let dy = ((f64::from(self.bbox.height) * ratio).floor() as u32).max(inset_px);
        self.bbox.inset(dx, dy)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/region.rs"]
mod tests;
