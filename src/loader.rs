//! canonical image loading for every batch stage

use std::path::Path;

use image::{DynamicImage, GrayImage, Luma, RgbImage};

use crate::error::{Error, Result};

/// opens a recognized image file and derives its identity from the file stem.
///
/// returns `Ok(None)` for paths whose extension is not a known image
/// extension (case-sensitive, lower and upper case variants listed
/// explicitly) so that directory walks can skip stray files without
/// treating them as failures.
fn open(path: &Path) -> Result<Option<(DynamicImage, String)>> {
    let Some(extension) = path.extension().and_then(|extension| extension.to_str()) else {
        return Ok(None);
    };
    if !matches!(extension, "jpg" | "jpeg" | "png" | "JPG" | "JPEG" | "PNG") {
        return Ok(None);
    }

    let identity = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default()
        .to_string();

    let image = image::open(path).map_err(|source| Error::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(Some((image, identity)))
}

/// loads an image as single-channel 8-bit luminance.
///
/// a 16-bit grayscale source is rescaled first by dividing every sample by
/// 256, then stored as 8-bit; converting through the generic luma path would
/// misscale those samples. every other encoding goes through the standard
/// luma conversion.
pub fn load_luma(path: &Path) -> Result<Option<(GrayImage, String)>> {
    let Some((image, identity)) = open(path)? else {
        return Ok(None);
    };

    let luma = match image {
        DynamicImage::ImageLuma16(raw) => GrayImage::from_fn(raw.width(), raw.height(), |x, y| {
            Luma([(raw.get_pixel(x, y)[0] / 256) as u8])
        }),
        other => other.to_luma8(),
    };

    Ok(Some((luma, identity)))
}

/// loads an image as 3-channel 8-bit RGB, discarding any alpha channel.
pub fn load_rgb(path: &Path) -> Result<Option<(RgbImage, String)>> {
    Ok(open(path)?.map(|(image, identity)| (image.to_rgb8(), identity)))
}
