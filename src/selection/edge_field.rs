//! Per-pixel edge strength for lasso snapping.
//!
//! Sobel gradient magnitude over luminance (0.299R + 0.587G + 0.114B),
//! computed once per image. Values are unnormalized on the 0-255 luminance
//! scale, so a hard black/white step reads around 1000. The outer 1-pixel
//! ring is zero.

use ndarray::Array2;

use crate::pixels::PixelBuffer;

const SOBEL_X: [[f32; 3]; 3] = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_Y: [[f32; 3]; 3] = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

/// Gradient magnitude field, `(height, width)`.
#[derive(Debug, Clone)]
pub struct EdgeField {
    strength: Array2<f32>,
}

impl EdgeField {
    /// Build the field in a single pass over the buffer.
    ///
    /// Images narrower or shorter than 3 pixels have no interior and yield an
    /// all-zero field.
    pub fn compute(buffer: &PixelBuffer) -> Self {
        let (width, height) = (buffer.width(), buffer.height());
        let mut strength = Array2::<f32>::zeros((height, width));

        if width < 3 || height < 3 {
            return Self { strength };
        }

        // Luminance once per pixel instead of nine times per window
        let lum = Array2::from_shape_fn((height, width), |(y, x)| buffer.luminance(x, y));

        for y in 1..height - 1 {
            for x in 1..width - 1 {
                let mut gx = 0.0f32;
                let mut gy = 0.0f32;

                for ky in 0..3 {
                    for kx in 0..3 {
                        let l = lum[[y + ky - 1, x + kx - 1]];
                        gx += l * SOBEL_X[ky][kx];
                        gy += l * SOBEL_Y[ky][kx];
                    }
                }

                strength[[y, x]] = (gx * gx + gy * gy).sqrt();
            }
        }

        Self { strength }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.strength.dim().1
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.strength.dim().0
    }

    /// Edge strength at a pixel; out-of-bounds reads as zero.
    #[inline]
    pub fn strength(&self, x: usize, y: usize) -> f32 {
        self.strength.get([y, x]).copied().unwrap_or(0.0)
    }

    pub fn max_strength(&self) -> f32 {
        self.strength.iter().copied().fold(0.0, f32::max)
    }
}
