use std::f64::consts::FRAC_PI_4;

use crate::{
    foundation::{
        core::PixelRect,
        error::{LettererError, LettererResult},
        math::unit_clamp,
    },
    model::region::{Region, RegionTag},
};

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Shape heuristics. Every value is a calibration knob; tune per art style.
pub struct ClassifierConfig {
    /// Minimum rectangularity of a narration box. Shapes below it are bubble candidates.
    pub rectangularity_threshold: f64,
    /// Minimum solidity of a narration box.
    pub narration_min_solidity: f64,
    /// Minimum solidity of a speech/thought bubble.
    pub speech_min_solidity: f64,
    /// Smallest accepted region area as a fraction of the image area.
    pub min_area_fraction: f64,
    /// Largest accepted region area as a fraction of the image area.
    pub max_area_fraction: f64,
    /// Distance from an image edge that still counts as touching it.
    pub edge_margin_px: u32,
    /// An edge-touching region spanning more than this fraction of that edge is background.
    pub edge_span_ratio: f64,
    pub solidity_weight: f64,
    pub rectangularity_weight: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            rectangularity_threshold: 0.92,
            narration_min_solidity: 0.92,
            speech_min_solidity: 0.80,
            min_area_fraction: 0.01,
            max_area_fraction: 0.5,
            edge_margin_px: 10,
            edge_span_ratio: 0.5,
            solidity_weight: 0.6,
            rectangularity_weight: 0.4,
        }
    }
}

impl ClassifierConfig {
    pub fn validate(&self) -> LettererResult<()> {
        let ratios = [
            ("rectangularity_threshold", self.rectangularity_threshold),
            ("narration_min_solidity", self.narration_min_solidity),
            ("speech_min_solidity", self.speech_min_solidity),
            ("min_area_fraction", self.min_area_fraction),
            ("max_area_fraction", self.max_area_fraction),
            ("edge_span_ratio", self.edge_span_ratio),
        ];
        for (name, v) in ratios {
            if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                return Err(LettererError::config(format!(
                    "classifier.{name} must be in [0, 1] (got {v})"
                )));
            }
        }
        if self.min_area_fraction > self.max_area_fraction {
            return Err(LettererError::config(
                "classifier.min_area_fraction must be <= max_area_fraction",
            ));
        }
        for (name, w) in [
            ("solidity_weight", self.solidity_weight),
            ("rectangularity_weight", self.rectangularity_weight),
        ] {
            if !w.is_finite() || w < 0.0 {
                return Err(LettererError::config(format!(
                    "classifier.{name} must be finite and >= 0 (got {w})"
                )));
            }
        }
        if self.solidity_weight + self.rectangularity_weight <= 0.0 {
            return Err(LettererError::config(
                "classifier weights must not both be zero",
            ));
        }
        Ok(())
    }

    fn weights(&self) -> (f64, f64) {
        let sum = self.solidity_weight + self.rectangularity_weight;
        if sum <= 0.0 || !sum.is_finite() {
            return (0.5, 0.5);
        }
        (
            self.solidity_weight / sum,
            self.rectangularity_weight / sum,
        )
    }
}

/// Tag and score each region in place against an image of the given bounds.
pub fn classify_regions(regions: &mut [Region], image: PixelRect, cfg: &ClassifierConfig) {
    for r in regions.iter_mut() {
        let (tag, confidence) = classify_region(r, image, cfg);
        r.tag = tag;
        r.confidence = confidence;
    }
    tracing::debug!(
        speech = regions
            .iter()
            .filter(|r| r.tag == RegionTag::SpeechBubble)
            .count(),
        narration = regions
            .iter()
            .filter(|r| r.tag == RegionTag::NarrationBox)
            .count(),
        total = regions.len(),
        "classified regions"
    );
}

pub fn classify_region(r: &Region, image: PixelRect, cfg: &ClassifierConfig) -> (RegionTag, f64) {
    let image_area = image.area() as f64;
    let fraction = if image_area > 0.0 {
        r.area / image_area
    } else {
        0.0
    };
    if fraction < cfg.min_area_fraction || fraction > cfg.max_area_fraction {
        return (RegionTag::Rejected, 0.0);
    }
    if is_background(r.bbox, image, cfg) {
        return (RegionTag::Rejected, 0.0);
    }

    let (ws, wr) = cfg.weights();
    if r.rectangularity >= cfg.rectangularity_threshold
        && r.solidity >= cfg.narration_min_solidity
    {
        let c = ws * margin(r.solidity, cfg.narration_min_solidity)
            + wr * margin(r.rectangularity, cfg.rectangularity_threshold);
        return (RegionTag::NarrationBox, unit_clamp(c));
    }
    if r.solidity >= cfg.speech_min_solidity && r.rectangularity < cfg.rectangularity_threshold {
        let c = ws * margin(r.solidity, cfg.speech_min_solidity)
            + wr * ellipse_affinity(r.rectangularity);
        return (RegionTag::SpeechBubble, unit_clamp(c));
    }
    (RegionTag::Rejected, 0.0)
}

/// How far `v` sits above `threshold`, scaled to the headroom left below 1.
fn margin(v: f64, threshold: f64) -> f64 {
    let headroom = 1.0 - threshold;
    if headroom <= f64::EPSILON {
        return if v >= threshold { 1.0 } else { 0.0 };
    }
    unit_clamp((v - threshold) / headroom)
}

/// 1 for the rectangularity of an ideal ellipse (π/4), falling off linearly.
fn ellipse_affinity(rectangularity: f64) -> f64 {
    unit_clamp(1.0 - (rectangularity - FRAC_PI_4).abs() / FRAC_PI_4)
}

fn is_background(bbox: PixelRect, image: PixelRect, cfg: &ClassifierConfig) -> bool {
    let m = cfg.edge_margin_px;
    let w = f64::from(image.width.max(1));
    let h = f64::from(image.height.max(1));
    let horizontal_span = f64::from(bbox.width) / w;
    let vertical_span = f64::from(bbox.height) / h;

    let touches_left = bbox.x <= image.x.saturating_add(m);
    let touches_right = bbox.right().saturating_add(m) >= image.right();
    let touches_top = bbox.y <= image.y.saturating_add(m);
    let touches_bottom = bbox.bottom().saturating_add(m) >= image.bottom();

    ((touches_left || touches_right) && vertical_span > cfg.edge_span_ratio)
        || ((touches_top || touches_bottom) && horizontal_span > cfg.edge_span_ratio)
}

#[cfg(test)]
#[path = "../../tests/unit/detect/classify.rs"]
mod tests;
