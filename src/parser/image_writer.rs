//! Decoding image XObjects and writing them as PNG.

use std::path::Path;

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};

use crate::error::{Error, Result};

use super::backend::{ColorSpace, ImageEncoding, ImageXObject};

/// Decode an image XObject into pixels.
///
/// Supports JPEG streams and raw 8-bit gray or RGB samples. Anything else is
/// an [`Error::ImageExtract`].
pub fn decode_image(xobject: &ImageXObject) -> Result<DynamicImage> {
    match &xobject.encoding {
        ImageEncoding::Jpeg => Ok(image::load_from_memory_with_format(
            &xobject.data,
            ImageFormat::Jpeg,
        )?),
        ImageEncoding::Raw => decode_raw(xobject),
        ImageEncoding::Unsupported(filter) => Err(Error::ImageExtract(format!(
            "unsupported image filter {}",
            filter
        ))),
    }
}

fn decode_raw(xobject: &ImageXObject) -> Result<DynamicImage> {
    if xobject.bits_per_component != 8 {
        return Err(Error::ImageExtract(format!(
            "{} bits per component is not supported",
            xobject.bits_per_component
        )));
    }

    let channels: usize = match &xobject.color_space {
        ColorSpace::Gray => 1,
        ColorSpace::Rgb => 3,
        other => {
            return Err(Error::ImageExtract(format!(
                "color space {:?} is not supported",
                other
            )))
        }
    };

    let expected = xobject.width as usize * xobject.height as usize * channels;
    if xobject.data.len() < expected {
        return Err(Error::ImageExtract(format!(
            "{}x{} image needs {} bytes, stream has {}",
            xobject.width,
            xobject.height,
            expected,
            xobject.data.len()
        )));
    }
    // Trailing padding after the last row is ignored.
    let samples = xobject.data[..expected].to_vec();

    let short = || Error::ImageExtract("image buffer size mismatch".to_string());
    let image = if channels == 1 {
        DynamicImage::ImageLuma8(
            GrayImage::from_raw(xobject.width, xobject.height, samples).ok_or_else(short)?,
        )
    } else {
        DynamicImage::ImageRgb8(
            RgbImage::from_raw(xobject.width, xobject.height, samples).ok_or_else(short)?,
        )
    };
    Ok(image)
}

/// Decode an image XObject and write it to `path` as PNG.
pub fn write_png(xobject: &ImageXObject, path: &Path) -> Result<()> {
    let image = decode_image(xobject)?;
    image.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}
