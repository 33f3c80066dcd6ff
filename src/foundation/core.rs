use crate::foundation::error::{LettererError, LettererResult};

pub use kurbo::{Point, Rect, Vec2};

/// Owned 8-bit raster with 1 (grey), 2 (grey+alpha), 3 (RGB) or 4 (RGBA) interleaved channels.
///
/// A `Raster` is always well-formed: dimensions are non-zero and the byte buffer matches
/// `width * height * channels`. Construction is the only place an input error can arise.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    channels: u8,
    data: Vec<u8>,
}

impl Raster {
    /// Wrap raw interleaved bytes, validating shape.
    pub fn new(width: u32, height: u32, channels: u8, data: Vec<u8>) -> LettererResult<Self> {
        if width == 0 || height == 0 {
            return Err(LettererError::input(format!(
                "raster dimensions must be > 0 (got {width}x{height})"
            )));
        }
        if !(1..=4).contains(&channels) {
            return Err(LettererError::input(format!(
                "raster channel count must be 1..=4 (got {channels})"
            )));
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(usize::from(channels)))
            .ok_or_else(|| LettererError::input("raster buffer size overflow"))?;
        if data.len() != expected {
            return Err(LettererError::input(format!(
                "raster buffer has {} bytes, expected {expected}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Raster where every pixel equals `pixel` (whose length sets the channel count).
    pub fn filled(width: u32, height: u32, pixel: &[u8]) -> LettererResult<Self> {
        let channels = u8::try_from(pixel.len())
            .map_err(|_| LettererError::input("pixel has too many channels"))?;
        let count = (width as usize).saturating_mul(height as usize);
        Self::new(width, height, channels, pixel.repeat(count))
    }

    /// Convert a decoded `image` buffer. 8-bit layouts are kept; anything else becomes RGBA8.
    pub fn from_dynamic(img: &image::DynamicImage) -> LettererResult<Self> {
        let (width, height) = (img.width(), img.height());
        match img {
            image::DynamicImage::ImageLuma8(b) => Self::new(width, height, 1, b.as_raw().clone()),
            image::DynamicImage::ImageLumaA8(b) => {
                Self::new(width, height, 2, b.as_raw().clone())
            }
            image::DynamicImage::ImageRgb8(b) => Self::new(width, height, 3, b.as_raw().clone()),
            image::DynamicImage::ImageRgba8(b) => Self::new(width, height, 4, b.as_raw().clone()),
            other => Self::new(width, height, 4, other.to_rgba8().into_raw()),
        }
    }

    /// View this raster as an `image` buffer with the matching colour type.
    pub fn to_dynamic(&self) -> LettererResult<image::DynamicImage> {
        let (w, h) = (self.width, self.height);
        let data = self.data.clone();
        let img = match self.channels {
            1 => image::GrayImage::from_raw(w, h, data).map(image::DynamicImage::ImageLuma8),
            2 => image::GrayAlphaImage::from_raw(w, h, data).map(image::DynamicImage::ImageLumaA8),
            3 => image::RgbImage::from_raw(w, h, data).map(image::DynamicImage::ImageRgb8),
            _ => image::RgbaImage::from_raw(w, h, data).map(image::DynamicImage::ImageRgba8),
        };
        img.ok_or_else(|| LettererError::input("raster buffer does not match its dimensions"))
    }

    /// Straight (non-premultiplied) RGBA8 copy of the pixels.
    pub fn to_rgba_image(&self) -> LettererResult<image::RgbaImage> {
        Ok(self.to_dynamic()?.to_rgba8())
    }

    /// Build a raster with this raster's channel layout from straight RGBA8 pixels.
    pub fn with_layout_of(&self, rgba: image::RgbaImage) -> LettererResult<Self> {
        let (w, h) = rgba.dimensions();
        let dynamic = image::DynamicImage::ImageRgba8(rgba);
        let data = match self.channels {
            1 => dynamic.to_luma8().into_raw(),
            2 => dynamic.to_luma_alpha8().into_raw(),
            3 => dynamic.to_rgb8().into_raw(),
            _ => dynamic.to_rgba8().into_raw(),
        };
        Self::new(w, h, self.channels, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Channel values of the pixel at `(x, y)`. Panics when out of bounds, like slice indexing.
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let c = usize::from(self.channels);
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * c;
        &self.data[idx..idx + c]
    }

    pub fn bounds(&self) -> PixelRect {
        PixelRect::new(0, 0, self.width, self.height)
    }
}

/// Axis-aligned integer rectangle in pixel space, `[x, x + width) x [y, y + height)`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(self) -> u32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(self) -> u32 {
        self.y.saturating_add(self.height)
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn area(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    pub fn center(self) -> Point {
        Point::new(
            f64::from(self.x) + f64::from(self.width) * 0.5,
            f64::from(self.y) + f64::from(self.height) * 0.5,
        )
    }

    /// True when `other` lies entirely inside `self`.
    pub fn contains_rect(self, other: PixelRect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Shrink by `dx` on the left and right and `dy` on the top and bottom.
    ///
    /// The inset is clamped so at least one pixel survives on each axis of a non-empty rect.
    pub fn inset(self, dx: u32, dy: u32) -> Self {
        let dx = dx.min(self.width.saturating_sub(1) / 2);
        let dy = dy.min(self.height.saturating_sub(1) / 2);
        Self {
            x: self.x + dx,
            y: self.y + dy,
            width: self.width - 2 * dx,
            height: self.height - 2 * dy,
        }
    }

    pub fn to_rect(self) -> Rect {
        Rect::new(
            f64::from(self.x),
            f64::from(self.y),
            f64::from(self.right()),
            f64::from(self.bottom()),
        )
    }
}

/// Straight (non-premultiplied) RGBA8 colour. Also used as the Parley text brush.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn premultiplied(self) -> [u8; 4] {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        [
            premul(self.r, self.a),
            premul(self.g, self.a),
            premul(self.b, self.a),
            self.a,
        ]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
