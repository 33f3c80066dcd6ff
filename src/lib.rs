//! Letterer places dialogue into generated comic panels.
//!
//! Given a panel raster with empty speech bubbles or narration boxes already painted in, it
//! finds the right empty region for a dialogue element, fits the text into it and renders
//! the result onto a copy of the panel. Finished panels can then be joined into a strip.
//!
//! # Pipeline overview
//!
//! 1. **Preprocess**: `Raster -> mask` (near-white pixels become bright)
//! 2. **Extract**: `mask -> Vec<Region>` (8-connected components and their outer contours)
//! 3. **Classify**: solidity and rectangularity tag speech bubbles and narration boxes
//! 4. **Select**: nearest candidate to the request's anchor, or a fallback region
//! 5. **Fit**: largest font size whose greedy wrap fits the region interior
//! 6. **Composite**: text drawn on a copy of the panel; strips assembled on a grid
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic**: identical inputs produce identical results, in parallel or not.
//! - **Never stuck**: a missing bubble degrades to a fallback placement and overlong text is
//!   truncated with an ellipsis. Only malformed input and unrenderable glyphs are errors.
#![forbid(unsafe_code)]

mod detect;
mod foundation;
mod model;
mod pipeline;
mod render;
mod text;

pub use detect::classify::{ClassifierConfig, classify_region, classify_regions};
pub use detect::extract::{ExtractConfig, extract_regions};
pub use detect::geometry::{
    convex_hull, polygon_area, polygon_centroid, polygon_extent, polygon_perimeter,
};
pub use detect::preprocess::{MASK_BRIGHT, MASK_DARK, PreprocessConfig, binarize};
pub use detect::select::{
    Selection, SelectorConfig, fallback_region, select_region, select_region_excluding,
    sort_reading_order,
};
pub use foundation::core::{PixelRect, Point, Raster, Rect, Rgba8, Vec2};
pub use foundation::error::{LettererError, LettererResult};
pub use model::region::{Region, RegionTag};
pub use model::request::{Anchor, ElementKind, ElementRequest};
pub use pipeline::config::LettererConfig;
pub use pipeline::panel::{
    ElementOutcome, Letterer, PanelJob, PanelRender, PanelResult, PanelThreading,
};
pub use render::panel::{
    StyleConfig, composite_element, composite_text, draw_fallback_shape, layout_runs,
};
pub use render::strip::{StripConfig, StripLayout, assemble_strip, strip_layout};
pub use text::fit::{
    FitConfig, FitLabel, FitResult, HAlign, VAlign, alignment_for, clip_to_char_hint,
    fit_element, fit_text, interior_rect, wrap_words,
};
pub use text::typeset::{
    FontAsset, FontTypesetter, MonospaceTypesetter, TextMeasure, TextRun, Typesetter,
    TypesetterSource,
};
