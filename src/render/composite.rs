use crate::foundation::{
    core::PixelRect,
    error::{LettererError, LettererResult},
    math::mul_div255_u8,
};

pub(crate) type PremulRgba8 = [u8; 4];

/// Source-over for one premultiplied pixel.
pub(crate) fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    match src[3] {
        0 => return dst,
        255 => return src,
        _ => {}
    }

    let inv = 255u16 - u16::from(src[3]);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = src[i].saturating_add(mul_div255_u8(u16::from(dst[i]), inv));
    }
    out
}

fn over_in_place(dst: &mut [u8], src: &[u8]) -> LettererResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(LettererError::render(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Blend a `rect`-sized premultiplied layer onto `dst` (a premultiplied `dst_width`-wide
/// buffer) with its top-left at `rect`'s origin.
pub(crate) fn over_rect_in_place(
    dst: &mut [u8],
    dst_width: u32,
    layer: &[u8],
    rect: PixelRect,
) -> LettererResult<()> {
    let row_bytes = (rect.width as usize) * 4;
    if layer.len() != row_bytes * (rect.height as usize) {
        return Err(LettererError::render(format!(
            "layer has {} bytes, expected {} for a {}x{} rect",
            layer.len(),
            row_bytes * (rect.height as usize),
            rect.width,
            rect.height
        )));
    }
    let stride = (dst_width as usize) * 4;
    let dst_height = if stride == 0 { 0 } else { dst.len() / stride };
    if rect.right() > dst_width || (rect.bottom() as usize) > dst_height {
        return Err(LettererError::render(format!(
            "layer rect {rect:?} exceeds the {dst_width}x{dst_height} target"
        )));
    }

    for (row, src_row) in layer.chunks_exact(row_bytes.max(1)).enumerate() {
        let start = (rect.y as usize + row) * stride + (rect.x as usize) * 4;
        over_in_place(&mut dst[start..start + row_bytes], src_row)?;
    }
    Ok(())
}

/// Offset that places `content` inside `container` for a start/centre/end alignment.
pub(crate) fn align_offset(container: f64, content: f64, align: AlignKind) -> f64 {
    let rem = (container - content).max(0.0);
    match align {
        AlignKind::Start => 0.0,
        AlignKind::Center => rem * 0.5,
        AlignKind::End => rem,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AlignKind {
    Start,
    Center,
    End,
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
