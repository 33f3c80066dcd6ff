use crate::{
    foundation::{
        core::{PixelRect, Raster, Rgba8},
        error::{LettererError, LettererResult},
    },
    render::composite::{AlignKind, align_offset},
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StripConfig {
    pub columns: u32,
    /// Space between neighbouring cells.
    pub gutter_px: u32,
    /// Border around the whole grid.
    pub margin_px: u32,
    pub background: Rgba8,
    /// Resize every panel to this `[width, height]` (Lanczos3) before layout.
    pub panel_size: Option<[u32; 2]>,
}

impl Default for StripConfig {
    fn default() -> Self {
        Self {
            columns: 3,
            gutter_px: 2,
            margin_px: 4,
            background: Rgba8::opaque(0, 0, 0),
            panel_size: None,
        }
    }
}

impl StripConfig {
    pub fn validate(&self) -> LettererResult<()> {
        if self.columns == 0 {
            return Err(LettererError::config("strip.columns must be >= 1"));
        }
        if let Some([w, h]) = self.panel_size
            && (w == 0 || h == 0)
        {
            return Err(LettererError::config(
                "strip.panel_size dimensions must be > 0",
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StripLayout {
    pub width: u32,
    pub height: u32,
    /// Where each input panel is drawn, in input order.
    pub placements: Vec<PixelRect>,
}

/// Grid geometry for panels of the given sizes.
///
/// Column width is the widest panel in that column, row height the tallest panel in that
/// row. Panels fill left-to-right, top-to-bottom and sit centred in their cell.
pub fn strip_layout(
    sizes: &[(u32, u32)],
    columns: u32,
    gutter_px: u32,
    margin_px: u32,
) -> LettererResult<StripLayout> {
    if sizes.is_empty() {
        return Err(LettererError::input("strip assembly needs at least one panel"));
    }
    if columns == 0 {
        return Err(LettererError::input("strip columns must be >= 1"));
    }
    let cols = (columns as usize).min(sizes.len());
    let rows = sizes.len().div_ceil(cols);

    let mut col_w = vec![0u32; cols];
    let mut row_h = vec![0u32; rows];
    for (i, &(w, h)) in sizes.iter().enumerate() {
        col_w[i % cols] = col_w[i % cols].max(w);
        row_h[i / cols] = row_h[i / cols].max(h);
    }

    let span = |cells: &[u32]| -> LettererResult<u32> {
        let gutters = u64::from(gutter_px) * (cells.len() as u64 - 1);
        let total = cells.iter().map(|&v| u64::from(v)).sum::<u64>()
            + gutters
            + 2 * u64::from(margin_px);
        u32::try_from(total).map_err(|_| LettererError::input("strip dimensions overflow u32"))
    };
    let width = span(&col_w)?;
    let height = span(&row_h)?;

    let mut col_x = Vec::with_capacity(cols);
    let mut x = margin_px;
    for &w in &col_w {
        col_x.push(x);
        x += w + gutter_px;
    }
    let mut row_y = Vec::with_capacity(rows);
    let mut y = margin_px;
    for &h in &row_h {
        row_y.push(y);
        y += h + gutter_px;
    }

    let placements = sizes
        .iter()
        .enumerate()
        .map(|(i, &(w, h))| {
            let (c, r) = (i % cols, i / cols);
            let dx = align_offset(f64::from(col_w[c]), f64::from(w), AlignKind::Center);
            let dy = align_offset(f64::from(row_h[r]), f64::from(h), AlignKind::Center);
            PixelRect::new(col_x[c] + dx as u32, row_y[r] + dy as u32, w, h)
        })
        .collect();

    Ok(StripLayout {
        width,
        height,
        placements,
    })
}

/// Lay finished panels into one RGBA8 strip image, preserving input order.
pub fn assemble_strip(
    panels: &[Raster],
    columns: u32,
    cfg: &StripConfig,
) -> LettererResult<Raster> {
    let mut images = Vec::with_capacity(panels.len());
    for p in panels {
        let rgba = p.to_rgba_image()?;
        images.push(match cfg.panel_size {
            Some([w, h]) if rgba.dimensions() != (w, h) => {
                image::imageops::resize(&rgba, w, h, image::imageops::FilterType::Lanczos3)
            }
            _ => rgba,
        });
    }

    let sizes = images.iter().map(|i| i.dimensions()).collect::<Vec<_>>();
    let layout = strip_layout(&sizes, columns, cfg.gutter_px, cfg.margin_px)?;

    let mut canvas = image::RgbaImage::from_pixel(
        layout.width,
        layout.height,
        image::Rgba(cfg.background.to_array()),
    );
    for (img, at) in images.iter().zip(&layout.placements) {
        image::imageops::overlay(&mut canvas, img, i64::from(at.x), i64::from(at.y));
    }

    tracing::debug!(
        panels = panels.len(),
        width = layout.width,
        height = layout.height,
        "assembled strip"
    );
    Raster::new(layout.width, layout.height, 4, canvas.into_raw())
}

#[cfg(test)]
#[path = "../../tests/unit/render/strip.rs"]
mod tests;
