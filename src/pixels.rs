//! Read-only RGBA pixel snapshot.
//!
//! ## Image Format
//! - Shape `(height, width, 4)`, one `u8` per channel
//! - Pixel index `i = y * width + x`, the unit every selection is stored in

use ndarray::{Array3, ArrayView3};

use crate::color::ColorSample;
use crate::config::ColorSpace;
use crate::error::{Result, SelectionError};

/// Immutable RGBA snapshot captured once per image load.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    data: Array3<u8>,
}

impl PixelBuffer {
    /// Wrap a flat RGBA byte buffer (length = width * height * 4).
    pub fn new(width: usize, height: usize, rgba: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(SelectionError::EmptyImage);
        }
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(4))
            .ok_or(SelectionError::BufferSize {
                width,
                height,
                expected: usize::MAX,
                actual: rgba.len(),
            })?;
        if rgba.len() != expected {
            return Err(SelectionError::BufferSize {
                width,
                height,
                expected,
                actual: rgba.len(),
            });
        }
        let data = Array3::from_shape_vec((height, width, 4), rgba).map_err(|_| {
            SelectionError::BufferSize {
                width,
                height,
                expected,
                actual: expected,
            }
        })?;
        Ok(Self { data })
    }

    /// Copy an `(height, width, 4)` array view.
    pub fn from_view(view: ArrayView3<u8>) -> Result<Self> {
        let (height, width, channels) = view.dim();
        if width == 0 || height == 0 {
            return Err(SelectionError::EmptyImage);
        }
        if channels != 4 {
            return Err(SelectionError::BufferSize {
                width,
                height,
                expected: width * height * 4,
                actual: width * height * channels,
            });
        }
        Ok(Self {
            data: view.to_owned(),
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.width() * self.height()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn view(&self) -> ArrayView3<'_, u8> {
        self.data.view()
    }

    /// Whether signed coordinates fall inside the image.
    #[inline]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width() && (y as usize) < self.height()
    }

    #[inline]
    pub fn index_of(&self, x: usize, y: usize) -> usize {
        y * self.width() + x
    }

    /// RGBA at a pixel coordinate.
    #[inline]
    pub fn rgba(&self, x: usize, y: usize) -> [u8; 4] {
        [
            self.data[[y, x, 0]],
            self.data[[y, x, 1]],
            self.data[[y, x, 2]],
            self.data[[y, x, 3]],
        ]
    }

    /// Luminance (0.299R + 0.587G + 0.114B) on the 0-255 scale.
    #[inline]
    pub fn luminance(&self, x: usize, y: usize) -> f32 {
        0.299 * self.data[[y, x, 0]] as f32
            + 0.587 * self.data[[y, x, 1]] as f32
            + 0.114 * self.data[[y, x, 2]] as f32
    }

    /// Color of the pixel at a flat index in the requested space.
    #[inline]
    pub fn sample(&self, index: usize, space: ColorSpace) -> ColorSample {
        let width = self.width();
        let [r, g, b, _] = self.rgba(index % width, index / width);
        ColorSample::from_rgb8(r, g, b, space)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_wrong_length() {
        let err = PixelBuffer::new(2, 2, vec![0u8; 15]).unwrap_err();
        assert!(matches!(
            err,
            SelectionError::BufferSize {
                expected: 16,
                actual: 15,
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_overflowing_dimensions() {
        let err = PixelBuffer::new(usize::MAX / 2, 3, vec![0u8; 16]).unwrap_err();
        assert!(matches!(
            err,
            SelectionError::BufferSize {
                expected: usize::MAX,
                actual: 16,
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(
            PixelBuffer::new(0, 3, Vec::new()),
            Err(SelectionError::EmptyImage)
        ));
    }

    #[test]
    fn test_pixel_access() {
        // 2x2: red, green / blue, white
        let data = vec![
            255, 0, 0, 255, 0, 255, 0, 255, //
            0, 0, 255, 255, 255, 255, 255, 255,
        ];
        let buffer = PixelBuffer::new(2, 2, data).unwrap();

        assert_eq!(buffer.width(), 2);
        assert_eq!(buffer.height(), 2);
        assert_eq!(buffer.rgba(1, 0), [0, 255, 0, 255]);
        assert_eq!(buffer.rgba(0, 1), [0, 0, 255, 255]);
        assert_eq!(buffer.index_of(1, 1), 3);
        assert!((buffer.luminance(1, 1) - 255.0).abs() < 1e-3);

        match buffer.sample(2, ColorSpace::Rgb) {
            ColorSample::Rgb { r, g, b } => assert_eq!((r, g, b), (0.0, 0.0, 1.0)),
            other => panic!("unexpected sample {other:?}"),
        }
    }

    #[test]
    fn test_contains() {
        let buffer = PixelBuffer::new(3, 2, vec![0u8; 24]).unwrap();
        assert!(buffer.contains(0, 0));
        assert!(buffer.contains(2, 1));
        assert!(!buffer.contains(3, 1));
        assert!(!buffer.contains(-1, 0));
    }
}
