use std::collections::HashMap;

use imageproc::{
    contours::{BorderType, find_contours},
    region_labelling::{Connectivity, connected_components},
};

use crate::{
    detect::{
        geometry::{
            convex_hull, polygon_area, polygon_centroid, polygon_extent, polygon_perimeter,
        },
        preprocess::{MASK_BRIGHT, MASK_DARK},
    },
    foundation::{
        core::{PixelRect, Point},
        error::{LettererError, LettererResult},
        math::unit_clamp,
    },
    model::region::{Region, RegionTag},
};

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Components with this many pixels or fewer are treated as noise.
    pub min_component_pixels: u32,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            min_component_pixels: 64,
        }
    }
}

impl ExtractConfig {
    pub fn validate(&self) -> LettererResult<()> {
        if self.min_component_pixels == u32::MAX {
            return Err(LettererError::config(
                "extract.min_component_pixels must leave room for at least one component",
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug)]
struct ComponentStats {
    label: u32,
    pixels: u64,
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
}

impl ComponentStats {
    fn new(label: u32, x: u32, y: u32) -> Self {
        Self {
            label,
            pixels: 0,
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    fn add(&mut self, x: u32, y: u32) {
        self.pixels += 1;
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    fn bbox(&self) -> PixelRect {
        PixelRect::new(
            self.min_x,
            self.min_y,
            self.max_x - self.min_x + 1,
            self.max_y - self.min_y + 1,
        )
    }
}

/// Trace every 8-connected bright component of `mask` into a [`Region`].
///
/// Regions come back ordered by each component's first pixel in raster-scan order, and are
/// left tagged [`RegionTag::Rejected`] until classified. Components whose outer contour
/// encloses no area (lines, single pixels) are skipped.
pub fn extract_regions(mask: &image::GrayImage, cfg: &ExtractConfig) -> Vec<Region> {
    let labels = connected_components(mask, Connectivity::Eight, image::Luma([MASK_DARK]));

    let mut order: Vec<ComponentStats> = Vec::new();
    let mut slot_by_label: HashMap<u32, usize> = HashMap::new();
    for (x, y, px) in labels.enumerate_pixels() {
        let label = px.0[0];
        if label == 0 {
            continue;
        }
        let slot = *slot_by_label.entry(label).or_insert_with(|| {
            order.push(ComponentStats::new(label, x, y));
            order.len() - 1
        });
        order[slot].add(x, y);
    }

    let floor = u64::from(cfg.min_component_pixels);
    let regions = order
        .iter()
        .filter(|c| c.pixels > floor)
        .filter_map(|c| trace_component(&labels, c))
        .collect::<Vec<_>>();

    tracing::debug!(
        components = order.len(),
        regions = regions.len(),
        "extracted bright components"
    );
    regions
}

fn trace_component(
    labels: &image::ImageBuffer<image::Luma<u32>, Vec<u32>>,
    c: &ComponentStats,
) -> Option<Region> {
    let bbox = c.bbox();

    // One pixel of dark padding so the tracer always starts outside the shape.
    let crop = image::GrayImage::from_fn(bbox.width + 2, bbox.height + 2, |x, y| {
        let inside = x >= 1 && y >= 1 && x <= bbox.width && y <= bbox.height;
        if inside && labels.get_pixel(bbox.x + x - 1, bbox.y + y - 1).0[0] == c.label {
            image::Luma([MASK_BRIGHT])
        } else {
            image::Luma([MASK_DARK])
        }
    });

    let outer = find_contours::<u32>(&crop)
        .into_iter()
        .find(|ct| ct.border_type == BorderType::Outer && ct.parent.is_none())?;

    let contour = outer
        .points
        .iter()
        .map(|p| {
            Point::new(
                f64::from(bbox.x + p.x) - 0.5,
                f64::from(bbox.y + p.y) - 0.5,
            )
        })
        .collect::<Vec<_>>();

    let area = polygon_area(&contour);
    if area <= 0.0 {
        return None;
    }
    let perimeter = polygon_perimeter(&contour);
    let hull_area = polygon_area(&convex_hull(&contour));
    let extent = polygon_extent(&contour);

    Some(Region {
        bbox,
        area,
        perimeter,
        solidity: unit_clamp(area / hull_area),
        rectangularity: unit_clamp(area / extent.area()),
        circularity: unit_clamp(4.0 * std::f64::consts::PI * area / (perimeter * perimeter)),
        centroid: polygon_centroid(&contour),
        pixel_count: c.pixels,
        tag: RegionTag::Rejected,
        confidence: 0.0,
        contour,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/detect/extract.rs"]
mod tests;
