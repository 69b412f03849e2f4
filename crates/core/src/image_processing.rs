//! Image encoding utilities.
//!
//! Captured bitmaps go over the wire as base64-encoded PNG inside a JSON
//! body, so the whole request stays text-safe. Cropping happens at capture
//! time ([`crate::capture::ScreenCapturer::capture`]); this module only
//! turns the final bitmap into its transport representation.

use crate::error::{AppError, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

/// Image encoding helpers for the analysis pipeline.
pub struct ImageProcessor;

impl ImageProcessor {
    /// Encodes an image as a base64 PNG string ready for transmission.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ImageProcessing`] if PNG encoding fails.
    pub fn to_base64_png(image: &DynamicImage) -> Result<String> {
        let mut buffer: Vec<u8> = Vec::new();
        let mut cursor = Cursor::new(&mut buffer);

        image
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|e| AppError::image(format!("Failed to encode image: {}", e)))?;

        Ok(BASE64.encode(buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    #[test]
    fn encodes_decodable_png() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            4,
            3,
            image::Rgba([10, 20, 30, 255]),
        ));

        let encoded = ImageProcessor::to_base64_png(&image).unwrap();
        let bytes = BASE64.decode(encoded).unwrap();

        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Png).unwrap();
        assert_eq!(decoded.width(), 4);
        assert_eq!(decoded.height(), 3);
    }
}
