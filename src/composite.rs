//! additive compositing of a perturbation onto a base through a mask

use image::{GrayImage, Rgb, RgbImage};

use crate::error::{Error, Result};
use crate::{MASK_MAX, MASK_MIN};

/// additively blends `overlay` onto `base`, weighting every pixel by the
/// normalized mask value and the global `alpha`:
///
/// `result = clamp(base + overlay * (mask / 255) * alpha, 0, 255)`
///
/// the mask is broadcast over all three color channels. this is not the
/// classic over-operator: a zero mask pixel leaves the base untouched, a
/// full mask pixel adds `overlay * alpha` and may clamp at white.
pub fn composite(
    base: &RgbImage,
    overlay: &RgbImage,
    mask: &GrayImage,
    alpha: f64,
) -> Result<RgbImage> {
    let dimensions = base.dimensions();
    if overlay.dimensions() != dimensions || mask.dimensions() != dimensions {
        return Err(Error::DimensionMismatch {
            base: dimensions,
            overlay: overlay.dimensions(),
            mask: mask.dimensions(),
        });
    }

    let (width, height) = dimensions;
    Ok(RgbImage::from_fn(width, height, |x, y| {
        let weight = mask.get_pixel(x, y)[0] as f64 / MASK_MAX as f64 * alpha;
        let base_pixel = base.get_pixel(x, y);
        let overlay_pixel = overlay.get_pixel(x, y);

        let mut blended = [0u8; 3];
        for (channel, value) in blended.iter_mut().enumerate() {
            let sum = base_pixel[channel] as f64 + overlay_pixel[channel] as f64 * weight;
            *value = sum.clamp(MASK_MIN as f64, MASK_MAX as f64) as u8;
        }
        Rgb(blended)
    }))
}
