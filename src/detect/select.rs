use crate::{
    foundation::{
        core::{PixelRect, Point},
        error::{LettererError, LettererResult},
    },
    model::{
        region::Region,
        request::{Anchor, ElementRequest},
    },
};

const DISTANCE_EPSILON: f64 = 1e-9;

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Normalized distance of the outer anchor zones from the panel edge.
    pub anchor_inset: f64,
    /// Degraded-mode rectangle size as fractions of the panel size.
    pub fallback_width_fraction: f64,
    pub fallback_height_fraction: f64,
    /// Centroids closer than this fraction of the panel height share a reading-order row.
    pub row_ratio: f64,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            anchor_inset: 0.15,
            fallback_width_fraction: 0.35,
            fallback_height_fraction: 0.2,
            row_ratio: 0.15,
        }
    }
}

impl SelectorConfig {
    pub fn validate(&self) -> LettererResult<()> {
        if !self.anchor_inset.is_finite() || !(0.0..=0.5).contains(&self.anchor_inset) {
            return Err(LettererError::config(
                "selector.anchor_inset must be in [0, 0.5]",
            ));
        }
        for (name, v) in [
            ("fallback_width_fraction", self.fallback_width_fraction),
            ("fallback_height_fraction", self.fallback_height_fraction),
        ] {
            if !v.is_finite() || v <= 0.0 || v > 1.0 {
                return Err(LettererError::config(format!(
                    "selector.{name} must be in (0, 1] (got {v})"
                )));
            }
        }
        if !self.row_ratio.is_finite() || !(0.0..=1.0).contains(&self.row_ratio) {
            return Err(LettererError::config("selector.row_ratio must be in [0, 1]"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Region chosen for one request.
pub struct Selection {
    pub region: Region,
    /// Index into the candidate slice; `None` in degraded mode.
    pub index: Option<usize>,
    pub degraded: bool,
}

/// Pick the candidate for `request` nearest its anchor, or synthesize a fallback.
pub fn select_region(
    regions: &[Region],
    image: PixelRect,
    request: &ElementRequest,
    cfg: &SelectorConfig,
) -> Selection {
    select_region_excluding(regions, image, request, &[], cfg)
}

/// Like [`select_region`], skipping candidates whose indices appear in `used`.
pub fn select_region_excluding(
    regions: &[Region],
    image: PixelRect,
    request: &ElementRequest,
    used: &[usize],
    cfg: &SelectorConfig,
) -> Selection {
    let pool = request.kind.pool();
    let target = request.anchor.normalized(cfg.anchor_inset);

    let mut best: Option<(usize, f64)> = None;
    for (idx, r) in regions.iter().enumerate() {
        if r.tag != pool || used.contains(&idx) {
            continue;
        }
        let d = normalized(r.centroid, image).distance(target);
        best = match best {
            None => Some((idx, d)),
            Some((b, bd)) => {
                let closer = d < bd - DISTANCE_EPSILON;
                let tied = (d - bd).abs() <= DISTANCE_EPSILON;
                // Earlier index wins a full tie because `b < idx` here.
                if closer || (tied && r.area > regions[b].area) {
                    Some((idx, d))
                } else {
                    Some((b, bd))
                }
            }
        };
    }

    match best {
        Some((idx, _)) => Selection {
            region: regions[idx].clone(),
            index: Some(idx),
            degraded: false,
        },
        None => Selection {
            region: fallback_region(image, request.anchor, cfg),
            index: None,
            degraded: true,
        },
    }
}

/// Fixed-fraction rectangle centred on the anchor point, clamped into the image.
pub fn fallback_region(image: PixelRect, anchor: Anchor, cfg: &SelectorConfig) -> Region {
    let w = ((f64::from(image.width) * cfg.fallback_width_fraction).round() as u32)
        .clamp(1, image.width.max(1));
    let h = ((f64::from(image.height) * cfg.fallback_height_fraction).round() as u32)
        .clamp(1, image.height.max(1));

    let p = anchor.normalized(cfg.anchor_inset);
    let cx = f64::from(image.x) + p.x * f64::from(image.width);
    let cy = f64::from(image.y) + p.y * f64::from(image.height);

    let x = clamp_origin(cx - f64::from(w) * 0.5, image.x, image.right() - w);
    let y = clamp_origin(cy - f64::from(h) * 0.5, image.y, image.bottom() - h);
    Region::fallback(PixelRect::new(x, y, w, h))
}

fn clamp_origin(v: f64, lo: u32, hi: u32) -> u32 {
    (v.round().max(f64::from(lo)) as u32).min(hi)
}

fn normalized(p: Point, image: PixelRect) -> Point {
    Point::new(
        (p.x - f64::from(image.x)) / f64::from(image.width.max(1)),
        (p.y - f64::from(image.y)) / f64::from(image.height.max(1)),
    )
}

/// Order regions top-to-bottom by rows, then left-to-right within a row.
///
/// A row starts at the topmost remaining centroid and takes every centroid within
/// `row_ratio * image_height` below it.
pub fn sort_reading_order(regions: &mut [Region], image_height: u32, row_ratio: f64) {
    let band = f64::from(image_height) * row_ratio.max(0.0);
    regions.sort_by(|a, b| a.centroid.y.total_cmp(&b.centroid.y));

    let mut start = 0;
    while start < regions.len() {
        let top = regions[start].centroid.y;
        let end = regions[start..]
            .iter()
            .position(|r| r.centroid.y - top > band)
            .map_or(regions.len(), |off| start + off);
        regions[start..end].sort_by(|a, b| a.centroid.x.total_cmp(&b.centroid.x));
        start = end;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/detect/select.rs"]
mod tests;
