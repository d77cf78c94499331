//! Mask images: the hand-off format for inpainting and segmentation services.
//!
//! A mask is an RGBA image the size of the source. Selected pixels are opaque
//! white, everything else is fully transparent; consumers read membership from
//! the alpha channel only. Encoded masks are PNG, so a round trip is lossless.

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};

use crate::error::{Result, SelectionError};

/// Alpha at or above this counts as selected when decoding.
pub const MASK_ALPHA_THRESHOLD: u8 = 128;

/// Flat single-channel mask: 255 = selected, 0 = not selected.
pub fn alpha_mask(pixels: &[usize], width: usize, height: usize) -> Vec<u8> {
    let len = width * height;
    let mut mask = vec![0u8; len];
    for &index in pixels.iter().filter(|&&i| i < len) {
        mask[index] = 255;
    }
    mask
}

/// Mask as an RGBA image.
pub fn mask_image(pixels: &[usize], width: usize, height: usize) -> RgbaImage {
    let alpha = alpha_mask(pixels, width, height);
    RgbaImage::from_fn(width as u32, height as u32, |x, y| {
        let a = alpha[y as usize * width + x as usize];
        if a > 0 {
            Rgba([255, 255, 255, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

/// Encode a pixel set as a PNG mask.
pub fn encode_mask_png(pixels: &[usize], width: usize, height: usize) -> Result<Vec<u8>> {
    let image = mask_image(pixels, width, height);
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(SelectionError::MaskEncode)?;
    Ok(bytes)
}

/// Pixel set recovered from an encoded mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMask {
    pub width: usize,
    pub height: usize,
    /// Sorted pixel indices whose alpha passed the threshold.
    pub pixels: Vec<usize>,
}

/// Decode a PNG mask back into a pixel set.
pub fn decode_mask_png(bytes: &[u8]) -> Result<DecodedMask> {
    let image = image::load_from_memory_with_format(bytes, ImageFormat::Png)
        .map_err(SelectionError::MaskDecode)?
        .into_rgba8();

    let width = image.width() as usize;
    let height = image.height() as usize;
    let pixels = image
        .pixels()
        .enumerate()
        .filter(|(_, px)| px.0[3] >= MASK_ALPHA_THRESHOLD)
        .map(|(i, _)| i)
        .collect();

    Ok(DecodedMask {
        width,
        height,
        pixels,
    })
}
