use std::{path::Path, sync::Arc};

use anyhow::Context;

use crate::foundation::{
    core::Rgba8,
    error::{LettererError, LettererResult},
};

/// Width and line-height measurement at a given pixel size.
pub trait TextMeasure {
    /// Horizontal advance of `text` laid out on a single line.
    fn advance(&mut self, text: &str, size_px: f32) -> LettererResult<f32>;

    /// Natural line height (ascent + descent + leading) at `size_px`.
    fn line_height(&mut self, size_px: f32) -> LettererResult<f32>;
}

#[derive(Clone, Debug, PartialEq)]
/// One line of text positioned inside a layer. `y` is the top of the line box.
pub struct TextRun {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub size_px: f32,
    pub color: Rgba8,
}

/// A [`TextMeasure`] that can also paint runs.
pub trait Typesetter: TextMeasure {
    /// Paint `runs` into a transparent `width x height` layer of premultiplied RGBA8 bytes.
    fn rasterize(&mut self, width: u32, height: u32, runs: &[TextRun]) -> LettererResult<Vec<u8>>;
}

/// Read-only shared source from which each worker builds its own typesetter.
pub trait TypesetterSource: Send + Sync {
    type Setter: Typesetter;

    fn typesetter(&self) -> LettererResult<Self::Setter>;
}

#[derive(Clone)]
/// Font file bytes shared between workers.
pub struct FontAsset {
    bytes: Arc<Vec<u8>>,
    index: u32,
}

impl std::fmt::Debug for FontAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontAsset")
            .field("len", &self.bytes.len())
            .field("index", &self.index)
            .finish()
    }
}

impl FontAsset {
    pub fn from_bytes(bytes: Vec<u8>) -> LettererResult<Self> {
        Self::from_bytes_with_index(bytes, 0)
    }

    pub fn from_bytes_with_index(bytes: Vec<u8>, index: u32) -> LettererResult<Self> {
        if bytes.is_empty() {
            return Err(LettererError::render("font asset is empty"));
        }
        Ok(Self {
            bytes: Arc::new(bytes),
            index,
        })
    }

    pub fn from_path(path: &Path) -> LettererResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read font file '{}'", path.display()))?;
        Self::from_bytes(bytes)
    }

    /// First installed sans-serif face (bold preferred), if the system has any fonts.
    pub fn from_system() -> Option<Self> {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();

        let families = [usvg::fontdb::Family::SansSerif];
        let query = |weight| usvg::fontdb::Query {
            families: &families,
            weight,
            stretch: usvg::fontdb::Stretch::Normal,
            style: usvg::fontdb::Style::Normal,
        };
        let id = db
            .query(&query(usvg::fontdb::Weight::BOLD))
            .or_else(|| db.query(&query(usvg::fontdb::Weight::NORMAL)))
            .or_else(|| db.faces().next().map(|f| f.id))?;

        db.with_face_data(id, |data, index| (data.to_vec(), index))
            .and_then(|(data, index)| Self::from_bytes_with_index(data, index).ok())
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn index(&self) -> u32 {
        self.index
    }
}

impl TypesetterSource for FontAsset {
    type Setter = FontTypesetter;

    fn typesetter(&self) -> LettererResult<FontTypesetter> {
        FontTypesetter::new(self)
    }
}

/// Parley shaping plus `vello_cpu` glyph rasterization for one font.
pub struct FontTypesetter {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<Rgba8>,
    family_name: String,
    font: vello_cpu::peniko::FontData,
}

impl FontTypesetter {
    pub fn new(asset: &FontAsset) -> LettererResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(asset.bytes().to_vec()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| LettererError::render("no font families registered from font bytes"))?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| LettererError::render("registered font family has no name"))?
            .to_string();

        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(asset.bytes().to_vec()),
            asset.index(),
        );

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font,
        })
    }

    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    fn layout(
        &mut self,
        text: &str,
        size_px: f32,
        brush: Rgba8,
    ) -> LettererResult<parley::Layout<Rgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(LettererError::render("text size_px must be finite and > 0"));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<Rgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

impl TextMeasure for FontTypesetter {
    fn advance(&mut self, text: &str, size_px: f32) -> LettererResult<f32> {
        let layout = self.layout(text, size_px, Rgba8::default())?;
        Ok(layout
            .lines()
            .map(|line| line.metrics().advance)
            .fold(0.0, f32::max))
    }

    fn line_height(&mut self, size_px: f32) -> LettererResult<f32> {
        let layout = self.layout("Hg", size_px, Rgba8::default())?;
        let h = layout
            .lines()
            .next()
            .map(|line| {
                let m = line.metrics();
                m.ascent + m.descent + m.leading
            })
            .unwrap_or(size_px);
        Ok(h.max(1.0))
    }
}

impl Typesetter for FontTypesetter {
    fn rasterize(&mut self, width: u32, height: u32, runs: &[TextRun]) -> LettererResult<Vec<u8>> {
        let w = u16::try_from(width)
            .map_err(|_| LettererError::render(format!("text layer width {width} exceeds u16")))?;
        let h = u16::try_from(height).map_err(|_| {
            LettererError::render(format!("text layer height {height} exceeds u16"))
        })?;

        let mut layouts = Vec::with_capacity(runs.len());
        for run in runs {
            let layout = self.layout(&run.text, run.size_px, run.color)?;
            if has_missing_glyph(&layout) {
                return Err(LettererError::render(format!(
                    "font '{}' cannot render all characters of {:?}",
                    self.family_name, run.text
                )));
            }
            layouts.push((run, layout));
        }

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        for (run, layout) in &layouts {
            ctx.set_transform(vello_cpu::kurbo::Affine::translate((
                f64::from(run.x),
                f64::from(run.y),
            )));
            for line in layout.lines() {
                for item in line.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                        continue;
                    };

                    let brush = glyph_run.style().brush;
                    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                        brush.r, brush.g, brush.b, brush.a,
                    ));
                    let glyphs = glyph_run.glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                    ctx.glyph_run(&self.font)
                        .font_size(glyph_run.run().font_size())
                        .fill_glyphs(glyphs);
                }
            }
        }

        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);
        Ok(pixmap.data_as_u8_slice().to_vec())
    }
}

fn has_missing_glyph(layout: &parley::Layout<Rgba8>) -> bool {
    layout.lines().any(|line| {
        line.items().any(|item| match item {
            parley::layout::PositionedLayoutItem::GlyphRun(glyph_run) => {
                glyph_run.glyphs().any(|g| g.id == 0)
            }
            _ => false,
        })
    })
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Fixed-pitch block typesetter with no font file.
///
/// Every character advances `advance_em * size`. Non-whitespace characters paint a solid cell,
/// which makes coverage easy to assert in tests and keeps lettering deterministic when no
/// font is installed.
pub struct MonospaceTypesetter {
    pub advance_em: f32,
    pub line_height_em: f32,
}

impl Default for MonospaceTypesetter {
    fn default() -> Self {
        Self {
            advance_em: 0.6,
            line_height_em: 1.2,
        }
    }
}

impl TextMeasure for MonospaceTypesetter {
    fn advance(&mut self, text: &str, size_px: f32) -> LettererResult<f32> {
        Ok(text.chars().count() as f32 * self.advance_em * size_px)
    }

    fn line_height(&mut self, size_px: f32) -> LettererResult<f32> {
        Ok((self.line_height_em * size_px).max(1.0))
    }
}

impl Typesetter for MonospaceTypesetter {
    fn rasterize(&mut self, width: u32, height: u32, runs: &[TextRun]) -> LettererResult<Vec<u8>> {
        let mut layer = image::RgbaImage::new(width, height);
        for run in runs {
            let cell_w = self.advance_em * run.size_px;
            let glyph_h = run.size_px;
            let top = run.y + (self.line_height_em * run.size_px - glyph_h) * 0.5;
            let paint = image::Rgba(run.color.premultiplied());
            for (i, ch) in run.text.chars().enumerate() {
                if ch.is_whitespace() {
                    continue;
                }
                let x0 = run.x + i as f32 * cell_w + cell_w * 0.1;
                let rect_w = (cell_w * 0.8).round().max(1.0) as u32;
                let rect_h = glyph_h.round().max(1.0) as u32;
                imageproc::drawing::draw_filled_rect_mut(
                    &mut layer,
                    imageproc::rect::Rect::at(x0.round() as i32, top.round() as i32)
                        .of_size(rect_w, rect_h),
                    paint,
                );
            }
        }
        Ok(layer.into_raw())
    }
}

impl TypesetterSource for MonospaceTypesetter {
    type Setter = MonospaceTypesetter;

    fn typesetter(&self) -> LettererResult<MonospaceTypesetter> {
        Ok(*self)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/typeset.rs"]
mod tests;
