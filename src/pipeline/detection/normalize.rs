//! Image normalization before vision inference.
//!
//! Uploads arrive as PNG with alpha, palette GIF-like PNGs, grayscale JPEGs...
//! Both vision endpoints get the same RGB8 JPEG.

use std::io::Cursor;

use image::io::Reader as ImageReader;
use image::{DynamicImage, ImageOutputFormat};

use super::DetectionError;

const JPEG_QUALITY: u8 = 90;

/// Pixel ceiling checked from the header before any buffer is allocated.
pub const MAX_PIXELS: u64 = 40_000_000;

/// Decode any supported format and re-encode as RGB8 JPEG.
pub fn to_rgb_jpeg(image_bytes: &[u8]) -> Result<Vec<u8>, DetectionError> {
    let (width, height) = reader(image_bytes)?
        .into_dimensions()
        .map_err(|e| DetectionError::ImageDecode(e.to_string()))?;
    check_dimensions(width, height)?;

    let decoded = reader(image_bytes)?
        .decode()
        .map_err(|e| DetectionError::ImageDecode(e.to_string()))?;

    let rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());

    let mut cursor = Cursor::new(Vec::new());
    rgb.write_to(&mut cursor, ImageOutputFormat::Jpeg(JPEG_QUALITY))
        .map_err(|e| DetectionError::ImageEncode(e.to_string()))?;

    Ok(cursor.into_inner())
}

fn reader(image_bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, DetectionError> {
    ImageReader::new(Cursor::new(image_bytes))
        .with_guessed_format()
        .map_err(|e| DetectionError::ImageDecode(e.to_string()))
}

fn check_dimensions(width: u32, height: u32) -> Result<(), DetectionError> {
    if u64::from(width) * u64::from(height) > MAX_PIXELS {
        return Err(DetectionError::ImageTooLarge { width, height });
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn sample_png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([40, 120, 60, 128]));
    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut cursor, ImageOutputFormat::Png)
        .unwrap();
    cursor.into_inner()
}
