//! Color samples in RGB, HSV and LAB, with a distance function per space.
//!
//! Distances share a loose common scale so one tolerance slider behaves
//! similarly across spaces:
//! - **RGB**: Euclidean over channels normalized to 0.0-1.0
//! - **HSV**: circular hue difference / 180, saturation and value / 100
//! - **LAB**: Euclidean over L, a, b divided by 100

use crate::config::ColorSpace;

/// LAB distances are scaled down by this to sit near the RGB/HSV range.
const LAB_SCALE: f32 = 100.0;

/// A pixel color in exactly one representation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorSample {
    /// Components in 0.0-1.0.
    Rgb { r: f32, g: f32, b: f32 },
    /// Hue in degrees [0, 360), saturation and value in [0, 100].
    Hsv { h: f32, s: f32, v: f32 },
    /// L in [0, 100], a and b roughly in [-128, 128].
    Lab { l: f32, a: f32, b: f32 },
}

impl ColorSample {
    /// Convert 8-bit RGB into the requested representation.
    pub fn from_rgb8(r: u8, g: u8, b: u8, space: ColorSpace) -> Self {
        let r = r as f32 / 255.0;
        let g = g as f32 / 255.0;
        let b = b as f32 / 255.0;
        match space {
            ColorSpace::Rgb => ColorSample::Rgb { r, g, b },
            ColorSpace::Hsv => {
                let (h, s, v) = rgb_to_hsv(r, g, b);
                ColorSample::Hsv { h, s, v }
            }
            ColorSpace::Lab => {
                let (l, a, b) = rgb_to_lab(r, g, b);
                ColorSample::Lab { l, a, b }
            }
        }
    }

    pub fn space(&self) -> ColorSpace {
        match self {
            ColorSample::Rgb { .. } => ColorSpace::Rgb,
            ColorSample::Hsv { .. } => ColorSpace::Hsv,
            ColorSample::Lab { .. } => ColorSpace::Lab,
        }
    }

    /// Distance to another sample of the same representation.
    ///
    /// Samples from different spaces are never similar: the result is
    /// `f32::INFINITY`.
    pub fn distance(&self, other: &ColorSample) -> f32 {
        match (*self, *other) {
            (ColorSample::Rgb { r: r1, g: g1, b: b1 }, ColorSample::Rgb { r: r2, g: g2, b: b2 }) => {
                rgb_distance((r1, g1, b1), (r2, g2, b2))
            }
            (ColorSample::Hsv { h: h1, s: s1, v: v1 }, ColorSample::Hsv { h: h2, s: s2, v: v2 }) => {
                hsv_distance((h1, s1, v1), (h2, s2, v2))
            }
            (ColorSample::Lab { l: l1, a: a1, b: b1 }, ColorSample::Lab { l: l2, a: a2, b: b2 }) => {
                lab_distance((l1, a1, b1), (l2, a2, b2))
            }
            _ => f32::INFINITY,
        }
    }
}

#[inline]
fn rgb_distance(c1: (f32, f32, f32), c2: (f32, f32, f32)) -> f32 {
    let dr = c1.0 - c2.0;
    let dg = c1.1 - c2.1;
    let db = c1.2 - c2.2;
    (dr * dr + dg * dg + db * db).sqrt()
}

#[inline]
fn hsv_distance(c1: (f32, f32, f32), c2: (f32, f32, f32)) -> f32 {
    let raw = (c1.0 - c2.0).abs();
    // Shorter arc around the hue circle
    let dh = raw.min(360.0 - raw) / 180.0;
    let ds = (c1.1 - c2.1) / 100.0;
    let dv = (c1.2 - c2.2) / 100.0;
    (dh * dh + ds * ds + dv * dv).sqrt()
}

#[inline]
fn lab_distance(c1: (f32, f32, f32), c2: (f32, f32, f32)) -> f32 {
    let dl = c1.0 - c2.0;
    let da = c1.1 - c2.1;
    let db = c1.2 - c2.2;
    (dl * dl + da * da + db * db).sqrt() / LAB_SCALE
}

/// Convert RGB to HSV.
/// Input: r, g, b in 0.0-1.0
/// Output: (h, s, v) where h is 0.0-360.0, s and v are 0.0-100.0
#[inline]
pub fn rgb_to_hsv(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let d = max - min;

    let v = max * 100.0;
    let s = if max > 0.0 { d / max * 100.0 } else { 0.0 };

    if d.abs() < 1e-6 {
        return (0.0, s, v);
    }

    let h = if (max - r).abs() < 1e-6 {
        ((g - b) / d).rem_euclid(6.0) * 60.0
    } else if (max - g).abs() < 1e-6 {
        ((b - r) / d + 2.0) * 60.0
    } else {
        ((r - g) / d + 4.0) * 60.0
    };

    // rem_euclid can land exactly on 360.0 for tiny negative inputs
    let h = if h >= 360.0 { h - 360.0 } else { h };
    (h, s, v)
}

/// Convert RGB to CIE Lab (D65 white point).
/// Input: r, g, b in 0.0-1.0 (sRGB)
pub fn rgb_to_lab(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    #[inline]
    fn linearize(c: f32) -> f32 {
        if c > 0.04045 {
            ((c + 0.055) / 1.055).powf(2.4)
        } else {
            c / 12.92
        }
    }

    #[inline]
    fn f(t: f32) -> f32 {
        if t > 0.008856 {
            t.cbrt()
        } else {
            7.787 * t + 16.0 / 116.0
        }
    }

    let r = linearize(r);
    let g = linearize(g);
    let b = linearize(b);

    // Linear sRGB to XYZ, normalized by the D65 reference white
    let x = (r * 0.4124564 + g * 0.3575761 + b * 0.1804375) / 0.95047;
    let y = r * 0.2126729 + g * 0.7151522 + b * 0.0721750;
    let z = (r * 0.0193339 + g * 0.1191920 + b * 0.9503041) / 1.08883;

    let fx = f(x);
    let fy = f(y);
    let fz = f(z);

    (116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPACES: [ColorSpace; 3] = [ColorSpace::Rgb, ColorSpace::Hsv, ColorSpace::Lab];

    #[test]
    fn test_self_distance_is_zero() {
        let colors = [(0u8, 0u8, 0u8), (255, 255, 255), (12, 200, 77), (255, 0, 128)];
        for space in SPACES {
            for &(r, g, b) in &colors {
                let c = ColorSample::from_rgb8(r, g, b, space);
                assert_eq!(c.distance(&c), 0.0, "{space:?} {r},{g},{b}");
            }
        }
    }

    #[test]
    fn test_hue_distance_is_circular() {
        let h1 = ColorSample::Hsv { h: 1.0, s: 50.0, v: 50.0 };
        let h359 = ColorSample::Hsv { h: 359.0, s: 50.0, v: 50.0 };
        let h3 = ColorSample::Hsv { h: 3.0, s: 50.0, v: 50.0 };

        assert_eq!(h1.distance(&h359), h1.distance(&h3));
        assert!((h1.distance(&h359) - 2.0 / 180.0).abs() < 1e-6);
    }

    #[test]
    fn test_rgb_distance_normalized() {
        let black = ColorSample::from_rgb8(0, 0, 0, ColorSpace::Rgb);
        let white = ColorSample::from_rgb8(255, 255, 255, ColorSpace::Rgb);
        assert!((black.distance(&white) - 3.0f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_rgb_to_hsv_primaries() {
        let (h, s, v) = rgb_to_hsv(1.0, 0.0, 0.0);
        assert_eq!((h, s, v), (0.0, 100.0, 100.0));

        let (h, _, _) = rgb_to_hsv(0.0, 1.0, 0.0);
        assert!((h - 120.0).abs() < 1e-4);

        let (h, _, _) = rgb_to_hsv(0.0, 0.0, 1.0);
        assert!((h - 240.0).abs() < 1e-4);

        // Gray has no hue or saturation
        let (h, s, v) = rgb_to_hsv(0.5, 0.5, 0.5);
        assert_eq!((h, s), (0.0, 0.0));
        assert!((v - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_rgb_to_lab_white_and_black() {
        let (l, a, b) = rgb_to_lab(1.0, 1.0, 1.0);
        assert!((l - 100.0).abs() < 0.1);
        assert!(a.abs() < 0.1 && b.abs() < 0.1);

        let (l, _, _) = rgb_to_lab(0.0, 0.0, 0.0);
        assert!(l.abs() < 0.1);
    }

    #[test]
    fn test_lab_distance_scaled() {
        let black = ColorSample::from_rgb8(0, 0, 0, ColorSpace::Lab);
        let white = ColorSample::from_rgb8(255, 255, 255, ColorSpace::Lab);
        // L spans 0-100, so black to white is about 1.0 after scaling
        assert!((black.distance(&white) - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_mixed_spaces_never_match() {
        let rgb = ColorSample::from_rgb8(10, 10, 10, ColorSpace::Rgb);
        let hsv = ColorSample::from_rgb8(10, 10, 10, ColorSpace::Hsv);
        assert_eq!(rgb.distance(&hsv), f32::INFINITY);
    }
}
