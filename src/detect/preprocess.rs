use crate::foundation::{
    core::Raster,
    error::{LettererError, LettererResult},
};

pub const MASK_BRIGHT: u8 = 255;
pub const MASK_DARK: u8 = 0;

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Brightness-mask parameters.
pub struct PreprocessConfig {
    /// A pixel is bright when every colour channel is strictly greater than this value.
    pub brightness_threshold: u8,
    /// L∞ radius of the morphological opening applied to the bright mask. 0 disables it.
    pub open_radius: u8,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            brightness_threshold: 235,
            open_radius: 1,
        }
    }
}

impl PreprocessConfig {
    pub fn validate(&self) -> LettererResult<()> {
        if self.brightness_threshold == u8::MAX {
            return Err(LettererError::config(
                "preprocess.brightness_threshold must be < 255 or no pixel can be bright",
            ));
        }
        Ok(())
    }
}

/// Threshold a raster into a bright/dark mask of the same dimensions.
///
/// Bright pixels are [`MASK_BRIGHT`], everything else [`MASK_DARK`]. Alpha is ignored.
pub fn binarize(raster: &Raster, cfg: &PreprocessConfig) -> image::GrayImage {
    let colour_channels = match raster.channels() {
        1 | 2 => 1,
        _ => 3,
    };
    let threshold = cfg.brightness_threshold;

    let mask = image::GrayImage::from_fn(raster.width(), raster.height(), |x, y| {
        let px = raster.pixel(x, y);
        if px[..colour_channels].iter().all(|&c| c > threshold) {
            image::Luma([MASK_BRIGHT])
        } else {
            image::Luma([MASK_DARK])
        }
    });

    if cfg.open_radius == 0 {
        return mask;
    }
    imageproc::morphology::open(
        &mask,
        imageproc::distance_transform::Norm::LInf,
        cfg.open_radius,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/detect/preprocess.rs"]
mod tests;
