use imageproc::drawing::{draw_filled_ellipse_mut, draw_filled_rect_mut};

use crate::{
    foundation::{
        core::{PixelRect, Raster, Rgba8},
        error::{LettererError, LettererResult},
        math::{premultiply_rgba8_in_place, unpremultiply_rgba8_in_place},
    },
    model::request::ElementKind,
    render::composite::{AlignKind, align_offset, over_rect_in_place},
    text::{
        fit::{FitResult, HAlign, VAlign},
        typeset::{TextMeasure, TextRun, Typesetter},
    },
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Colours and degraded-mode container drawing.
pub struct StyleConfig {
    pub speech_text: Rgba8,
    pub thought_text: Rgba8,
    pub narration_text: Rgba8,
    pub speech_label: Rgba8,
    pub thought_label: Rgba8,
    /// Draw a container shape under text placed in degraded mode.
    pub draw_fallback_shape: bool,
    pub bubble_fill: Rgba8,
    pub narration_fill: Rgba8,
    pub outline: Rgba8,
    pub outline_px: u32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            speech_text: Rgba8::opaque(17, 17, 17),
            thought_text: Rgba8::opaque(17, 17, 17),
            narration_text: Rgba8::opaque(17, 17, 17),
            speech_label: Rgba8::opaque(220, 38, 38),
            thought_label: Rgba8::opaque(6, 182, 212),
            draw_fallback_shape: true,
            bubble_fill: Rgba8::opaque(255, 255, 255),
            narration_fill: Rgba8::opaque(254, 243, 199),
            outline: Rgba8::opaque(0, 0, 0),
            outline_px: 3,
        }
    }
}

impl StyleConfig {
    pub fn validate(&self) -> LettererResult<()> {
        if self.outline_px > 64 {
            return Err(LettererError::config("style.outline_px must be <= 64"));
        }
        Ok(())
    }

    pub fn text_color(&self, kind: ElementKind) -> Rgba8 {
        match kind {
            ElementKind::Speech => self.speech_text,
            ElementKind::Thought => self.thought_text,
            ElementKind::Narration => self.narration_text,
        }
    }

    pub fn label_color(&self, kind: ElementKind) -> Rgba8 {
        match kind {
            ElementKind::Speech => self.speech_label,
            ElementKind::Thought => self.thought_label,
            ElementKind::Narration => self.narration_text,
        }
    }
}

/// Draw `fit` into `interior` on a copy of `image`. The input raster is never modified.
pub fn composite_text<T: Typesetter + ?Sized>(
    typesetter: &mut T,
    image: &Raster,
    interior: PixelRect,
    fit: &FitResult,
    body_color: Rgba8,
    label_color: Rgba8,
) -> LettererResult<Raster> {
    let mut rgba = premultiplied_copy(image)?;
    draw_text_layer(typesetter, &mut rgba, interior, fit, body_color, label_color)?;
    finish(image, rgba)
}

/// Letter one element: optional degraded-mode container, then its text.
#[allow(clippy::too_many_arguments)]
pub fn composite_element<T: Typesetter + ?Sized>(
    typesetter: &mut T,
    image: &Raster,
    kind: ElementKind,
    shape: PixelRect,
    interior: PixelRect,
    fit: &FitResult,
    degraded: bool,
    style: &StyleConfig,
) -> LettererResult<Raster> {
    let mut rgba = premultiplied_copy(image)?;
    if degraded && style.draw_fallback_shape {
        draw_fallback_shape(&mut rgba, kind, shape, style);
    }
    draw_text_layer(
        typesetter,
        &mut rgba,
        interior,
        fit,
        style.text_color(kind),
        style.label_color(kind),
    )?;
    finish(image, rgba)
}

fn premultiplied_copy(image: &Raster) -> LettererResult<image::RgbaImage> {
    let mut rgba = image.to_rgba_image()?;
    premultiply_rgba8_in_place(&mut rgba);
    Ok(rgba)
}

fn finish(image: &Raster, mut rgba: image::RgbaImage) -> LettererResult<Raster> {
    unpremultiply_rgba8_in_place(&mut rgba);
    image.with_layout_of(rgba)
}

fn draw_text_layer<T: Typesetter + ?Sized>(
    typesetter: &mut T,
    rgba: &mut image::RgbaImage,
    interior: PixelRect,
    fit: &FitResult,
    body_color: Rgba8,
    label_color: Rgba8,
) -> LettererResult<()> {
    if interior.is_empty() || (fit.lines.is_empty() && fit.label.is_none()) {
        return Ok(());
    }
    let runs = layout_runs(typesetter, fit, interior, body_color, label_color)?;
    let layer = typesetter.rasterize(interior.width, interior.height, &runs)?;
    let width = rgba.width();
    over_rect_in_place(rgba, width, &layer, interior)
}

/// Position the label and body lines inside an interior-sized layer.
pub fn layout_runs<M: TextMeasure + ?Sized>(
    measure: &mut M,
    fit: &FitResult,
    interior: PixelRect,
    body_color: Rgba8,
    label_color: Rgba8,
) -> LettererResult<Vec<TextRun>> {
    let (w, h) = (f64::from(interior.width), f64::from(interior.height));
    let halign = match fit.halign {
        HAlign::Left => AlignKind::Start,
        HAlign::Center => AlignKind::Center,
        HAlign::Right => AlignKind::End,
    };
    let valign = match fit.valign {
        VAlign::Top => AlignKind::Start,
        VAlign::Center => AlignKind::Center,
        VAlign::Bottom => AlignKind::End,
    };

    let mut runs = Vec::with_capacity(fit.lines.len() + 1);
    let mut top = align_offset(h, f64::from(fit.block_height()), valign) as f32;

    if let Some(label) = &fit.label {
        let size = label.font_size as f32;
        runs.push(line_run(
            measure,
            &label.text,
            size,
            label.line_height,
            top,
            w,
            halign,
            label_color,
        )?);
        top += label.line_height;
    }

    let size = fit.font_size as f32;
    for line in &fit.lines {
        runs.push(line_run(
            measure,
            line,
            size,
            fit.line_height,
            top,
            w,
            halign,
            body_color,
        )?);
        top += fit.line_height;
    }
    Ok(runs)
}

#[allow(clippy::too_many_arguments)]
fn line_run<M: TextMeasure + ?Sized>(
    measure: &mut M,
    text: &str,
    size: f32,
    line_height: f32,
    top: f32,
    container_w: f64,
    halign: AlignKind,
    color: Rgba8,
) -> LettererResult<TextRun> {
    let advance = measure.advance(text, size)?;
    let natural = measure.line_height(size)?;
    Ok(TextRun {
        text: text.to_string(),
        x: align_offset(container_w, f64::from(advance), halign).floor() as f32,
        y: (top + (line_height - natural).max(0.0) * 0.5).floor(),
        size_px: size,
        color,
    })
}

/// Programmatic container for degraded mode: outlined ellipse for bubbles, outlined box for
/// narration.
pub fn draw_fallback_shape(
    canvas: &mut image::RgbaImage,
    kind: ElementKind,
    shape: PixelRect,
    style: &StyleConfig,
) {
    if shape.is_empty() {
        return;
    }
    let outline = image::Rgba(style.outline.premultiplied());
    let border = style
        .outline_px
        .min(shape.width.saturating_sub(1) / 2)
        .min(shape.height.saturating_sub(1) / 2);

    match kind {
        ElementKind::Speech | ElementKind::Thought => {
            let fill = image::Rgba(style.bubble_fill.premultiplied());
            let c = shape.center();
            let center = (c.x.floor() as i32, c.y.floor() as i32);
            let rx = (shape.width / 2).saturating_sub(1) as i32;
            let ry = (shape.height / 2).saturating_sub(1) as i32;
            draw_filled_ellipse_mut(canvas, center, rx, ry, outline);
            draw_filled_ellipse_mut(
                canvas,
                center,
                rx - border as i32,
                ry - border as i32,
                fill,
            );
        }
        ElementKind::Narration => {
            let fill = image::Rgba(style.narration_fill.premultiplied());
            draw_filled_rect_mut(canvas, to_imageproc_rect(shape), outline);
            draw_filled_rect_mut(canvas, to_imageproc_rect(shape.inset(border, border)), fill);
        }
    }
}

fn to_imageproc_rect(r: PixelRect) -> imageproc::rect::Rect {
    imageproc::rect::Rect::at(r.x as i32, r.y as i32).of_size(r.width.max(1), r.height.max(1))
}

#[cfg(test)]
#[path = "../../tests/unit/render/panel.rs"]
mod tests;
