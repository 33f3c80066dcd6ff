use crate::{
    foundation::{
        core::PixelRect,
        error::{LettererError, LettererResult},
    },
    model::{
        region::Region,
        request::{ElementKind, ElementRequest},
    },
    text::typeset::TextMeasure,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VAlign {
    Top,
    Center,
    Bottom,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Font-size search range, interior padding and label sizing.
pub struct FitConfig {
    pub min_font: u32,
    pub max_font: u32,
    /// Multiplier applied to the font's natural line height.
    pub line_spacing: f32,
    /// Interior inset as a fraction of the region's bounding-box side.
    pub inset_ratio: f64,
    /// Interior inset floor in pixels.
    pub min_inset_px: u32,
    /// Speaker label size relative to the fitted body size.
    pub speaker_scale: f32,
    pub ellipsis: String,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            min_font: 12,
            max_font: 40,
            line_spacing: 1.2,
            inset_ratio: 0.15,
            min_inset_px: 2,
            speaker_scale: 0.75,
            ellipsis: "...".to_string(),
        }
    }
}

impl FitConfig {
    pub fn validate(&self) -> LettererResult<()> {
        if self.min_font == 0 {
            return Err(LettererError::config("fit.min_font must be >= 1"));
        }
        if self.min_font > self.max_font {
            return Err(LettererError::config(format!(
                "fit.min_font ({}) must be <= fit.max_font ({})",
                self.min_font, self.max_font
            )));
        }
        if !self.line_spacing.is_finite() || self.line_spacing <= 0.0 {
            return Err(LettererError::config(
                "fit.line_spacing must be finite and > 0",
            ));
        }
        if !self.inset_ratio.is_finite() || !(0.0..0.5).contains(&self.inset_ratio) {
            return Err(LettererError::config("fit.inset_ratio must be in [0, 0.5)"));
        }
        if !self.speaker_scale.is_finite() || self.speaker_scale <= 0.0 {
            return Err(LettererError::config(
                "fit.speaker_scale must be finite and > 0",
            ));
        }
        if self.ellipsis.is_empty() {
            return Err(LettererError::config("fit.ellipsis must not be empty"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Upper-cased speaker name drawn above the body text.
pub struct FitLabel {
    pub text: String,
    pub font_size: u32,
    pub line_height: f32,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Chosen font size and line breaks for one interior.
///
/// Every line measures at most the interior width at `font_size`, and
/// `block_height()` never exceeds the interior height.
pub struct FitResult {
    pub font_size: u32,
    pub lines: Vec<String>,
    /// Line advance in pixels, spacing included.
    pub line_height: f32,
    pub halign: HAlign,
    pub valign: VAlign,
    /// Text was cut to fit; the last line ends with the ellipsis.
    pub truncated: bool,
    pub label: Option<FitLabel>,
}

impl FitResult {
    /// Total height of the label and body lines.
    pub fn block_height(&self) -> f32 {
        let label = self.label.as_ref().map_or(0.0, |l| l.line_height);
        label + self.lines.len() as f32 * self.line_height
    }
}

pub fn alignment_for(kind: ElementKind) -> (HAlign, VAlign) {
    match kind {
        ElementKind::Speech | ElementKind::Thought => (HAlign::Center, VAlign::Center),
        ElementKind::Narration => (HAlign::Left, VAlign::Top),
    }
}

/// Drawing area of `region` after the configured border inset.
pub fn interior_rect(region: &Region, cfg: &FitConfig) -> PixelRect {
    region.interior_rect(cfg.inset_ratio, cfg.min_inset_px)
}

/// Largest font size in `[min_font, max_font]` whose greedy wrap fits `width x height`.
///
/// When even `min_font` overflows, the wrap at `min_font` is cut to the lines that fit and
/// the last kept line is ellipsized. Identical inputs always give identical results.
pub fn fit_text<M: TextMeasure + ?Sized>(
    measure: &mut M,
    text: &str,
    width: u32,
    height: u32,
    kind: ElementKind,
    cfg: &FitConfig,
) -> LettererResult<FitResult> {
    fit_block(measure, text, None, width, height, kind, cfg)
}

/// Fit one request, applying its character hint and reserving room for its speaker label.
///
/// The label is sized at `speaker_scale` of each candidate body size, so the body and label
/// grow and shrink together during the search.
pub fn fit_element<M: TextMeasure + ?Sized>(
    measure: &mut M,
    request: &ElementRequest,
    width: u32,
    height: u32,
    cfg: &FitConfig,
) -> LettererResult<FitResult> {
    let (text, clipped) = match request.max_chars {
        Some(max) => clip_to_char_hint(&request.text, max, &cfg.ellipsis),
        None => (request.text.clone(), false),
    };
    let label = request.speaker_label();

    let mut fit = fit_block(
        measure,
        &text,
        label.as_deref(),
        width,
        height,
        request.kind,
        cfg,
    )?;
    fit.truncated |= clipped;
    Ok(fit)
}

fn fit_block<M: TextMeasure + ?Sized>(
    measure: &mut M,
    text: &str,
    label: Option<&str>,
    width: u32,
    height: u32,
    kind: ElementKind,
    cfg: &FitConfig,
) -> LettererResult<FitResult> {
    let (halign, valign) = alignment_for(kind);
    let words = text.split_whitespace().collect::<Vec<_>>();
    let (w, h) = (width as f32, height as f32);

    if words.is_empty() {
        let size = cfg.max_font.max(1);
        let label = match label {
            Some(name) => fit_label(measure, name, size, w, h, cfg)?,
            None => None,
        };
        return Ok(FitResult {
            font_size: size,
            lines: Vec::new(),
            line_height: spaced_line_height(measure, size, cfg)?,
            halign,
            valign,
            truncated: false,
            label,
        });
    }

    let mut best = search_sizes(measure, &words, label, w, h, kind, cfg)?;
    if best.is_none() && label.is_some() {
        // Retry without the label before truncating the body.
        best = search_sizes(measure, &words, None, w, h, kind, cfg)?;
    }
    if let Some(fit) = best {
        return Ok(fit);
    }

    let size = cfg.min_font.max(1);
    let fitted_label = match label {
        Some(name) => fit_label(measure, name, size, w, h, cfg)?,
        None => None,
    };
    let line_height = spaced_line_height(measure, size, cfg)?;
    let wrapped = wrap_words(measure, &words, w, size as f32)?;
    let lines = truncate_lines(
        measure,
        wrapped,
        line_height,
        w,
        body_height(h, &fitted_label),
        size as f32,
        &cfg.ellipsis,
    )?;
    tracing::debug!(
        font_size = size,
        kept_lines = lines.len(),
        "text overflowed at minimum size; truncated"
    );
    Ok(FitResult {
        font_size: size,
        lines,
        line_height,
        halign,
        valign,
        truncated: true,
        label: fitted_label,
    })
}

/// Largest size in `[min_font, max_font]` whose wrapped lines, plus the label when one is
/// given, fit the box. A label that does not fit at a size fails that size.
fn search_sizes<M: TextMeasure + ?Sized>(
    measure: &mut M,
    words: &[&str],
    label: Option<&str>,
    w: f32,
    h: f32,
    kind: ElementKind,
    cfg: &FitConfig,
) -> LettererResult<Option<FitResult>> {
    let (halign, valign) = alignment_for(kind);
    let mut lo = cfg.min_font.max(1);
    let mut hi = cfg.max_font.max(lo);
    let mut best = None;
    while lo <= hi {
        let mid = lo + (hi - lo) / 2;
        let fitted_label = match label {
            Some(name) => fit_label(measure, name, mid, w, h, cfg)?,
            None => None,
        };
        let fits = if label.is_some() && fitted_label.is_none() {
            None
        } else {
            let lh = spaced_line_height(measure, mid, cfg)?;
            let lines = wrap_words(measure, words, w, mid as f32)?;
            let body_h = body_height(h, &fitted_label);
            block_fits(measure, &lines, lh, w, body_h, mid as f32)?.then_some((lines, lh))
        };
        match fits {
            Some((lines, line_height)) => {
                best = Some(FitResult {
                    font_size: mid,
                    lines,
                    line_height,
                    halign,
                    valign,
                    truncated: false,
                    label: fitted_label,
                });
                lo = mid + 1;
            }
            None if mid <= 1 => break,
            None => hi = mid - 1,
        }
    }
    Ok(best)
}

fn body_height(height: f32, label: &Option<FitLabel>) -> f32 {
    height - label.as_ref().map_or(0.0, |l| l.line_height)
}

/// Label at `speaker_scale` of the body size, or `None` when it cannot fit the box.
fn fit_label<M: TextMeasure + ?Sized>(
    measure: &mut M,
    name: &str,
    body_size: u32,
    width: f32,
    height: f32,
    cfg: &FitConfig,
) -> LettererResult<Option<FitLabel>> {
    let size = ((body_size as f32 * cfg.speaker_scale).round() as u32).max(1);
    let line_height = spaced_line_height(measure, size, cfg)?;
    if line_height >= height || measure.advance(name, size as f32)? > width {
        return Ok(None);
    }
    Ok(Some(FitLabel {
        text: name.to_string(),
        font_size: size,
        line_height,
    }))
}

/// Cut `text` to at most `max_chars` characters at a word boundary and append the ellipsis.
pub fn clip_to_char_hint(text: &str, max_chars: usize, ellipsis: &str) -> (String, bool) {
    if text.chars().count() <= max_chars {
        return (text.to_string(), false);
    }
    let head: String = text.chars().take(max_chars).collect();
    let cut = match head.rfind(char::is_whitespace) {
        Some(idx) if idx > 0 => &head[..idx],
        _ => head.as_str(),
    };
    (format!("{}{ellipsis}", cut.trim_end()), true)
}

fn spaced_line_height<M: TextMeasure + ?Sized>(
    measure: &mut M,
    size: u32,
    cfg: &FitConfig,
) -> LettererResult<f32> {
    Ok(measure.line_height(size as f32)? * cfg.line_spacing)
}

fn block_fits<M: TextMeasure + ?Sized>(
    measure: &mut M,
    lines: &[String],
    line_height: f32,
    width: f32,
    height: f32,
    size: f32,
) -> LettererResult<bool> {
    if lines.len() as f32 * line_height > height {
        return Ok(false);
    }
    for line in lines {
        if measure.advance(line, size)? > width {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Greedy word wrap. Words wider than the line are broken between characters.
pub fn wrap_words<M: TextMeasure + ?Sized>(
    measure: &mut M,
    words: &[&str],
    width: f32,
    size: f32,
) -> LettererResult<Vec<String>> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for &word in words {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if measure.advance(&candidate, size)? <= width {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if measure.advance(word, size)? <= width {
            current = word.to_string();
            continue;
        }

        for ch in word.chars() {
            let mut piece = current.clone();
            piece.push(ch);
            if current.is_empty() || measure.advance(&piece, size)? <= width {
                current = piece;
            } else {
                lines.push(std::mem::replace(&mut current, ch.to_string()));
            }
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    Ok(lines)
}

fn truncate_lines<M: TextMeasure + ?Sized>(
    measure: &mut M,
    mut lines: Vec<String>,
    line_height: f32,
    width: f32,
    height: f32,
    size: f32,
    ellipsis: &str,
) -> LettererResult<Vec<String>> {
    let max_lines = if line_height > 0.0 {
        (height / line_height).floor() as usize
    } else {
        0
    };
    if max_lines == 0 || measure.advance(ellipsis, size)? > width {
        return Ok(Vec::new());
    }

    lines.truncate(max_lines);
    let mut keep = 0;
    for line in &lines {
        if measure.advance(line, size)? > width {
            break;
        }
        keep += 1;
    }
    lines.truncate(keep.max(1));

    let Some(last) = lines.pop() else {
        return Ok(vec![ellipsis.to_string()]);
    };
    lines.push(ellipsize(measure, &last, width, size, ellipsis)?);
    Ok(lines)
}

/// Shorten `line` until `line + ellipsis` fits, dropping whole words first.
fn ellipsize<M: TextMeasure + ?Sized>(
    measure: &mut M,
    line: &str,
    width: f32,
    size: f32,
    ellipsis: &str,
) -> LettererResult<String> {
    let mut base = line.trim_end().to_string();
    while !ellipsis.is_empty() && base.ends_with(ellipsis) {
        base.truncate(base.len() - ellipsis.len());
        base = base.trim_end().to_string();
    }
    loop {
        let candidate = format!("{base}{ellipsis}");
        if base.is_empty() || measure.advance(&candidate, size)? <= width {
            return Ok(candidate);
        }
        match base.rfind(' ') {
            Some(idx) => base.truncate(idx),
            None => {
                base.pop();
            }
        }
        base = base.trim_end().to_string();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/fit.rs"]
mod tests;
