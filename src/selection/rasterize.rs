//! Scanline polygon fill (even-odd rule).
//!
//! Row `y` is sampled at the integer coordinate `y`. An edge crosses the row
//! when `y` lies in `[min(y1, y2), max(y1, y2))`, so a vertex shared by two
//! edges is counted once and horizontal edges never count. Between each
//! crossing pair the pixels `ceil(x0) .. ceil(x1)` are filled.
//!
//! Spans are not inclusive at both ends: the right crossing is exclusive, the
//! same as the bottom row. A pixel is covered when its top-left corner lies
//! inside the polygon, so a path along integer coordinates encloses exactly
//! the pixels it surrounds and adjacent polygons never share a pixel. The
//! closed rectangle `(0,0) (10,0) (10,10) (0,10)` covers `x, y` in `0..10`
//! (100 pixels), not `0..=10`.
//!
//! Self-intersecting paths are fine; overlapping loops cancel out as holes.

use super::Point;

/// Fill a closed polygon and return the covered pixel indices.
///
/// # Arguments
/// * `points` - Polygon vertices; the last vertex connects back to the first
/// * `width`, `height` - Image size; pixels outside are clipped
///
/// # Returns
/// Sorted, unique pixel indices (`y * width + x`). Empty for fewer than 3
/// vertices or a polygon that covers no pixel.
pub fn rasterize_polygon(points: &[Point], width: usize, height: usize) -> Vec<usize> {
    let mut pixels = Vec::new();
    if points.len() < 3 || width == 0 || height == 0 {
        return pixels;
    }

    let (min_y, max_y) = points.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| {
        (lo.min(p.y), hi.max(p.y))
    });
    if !min_y.is_finite() || !max_y.is_finite() {
        return pixels;
    }

    let y_start = (min_y.ceil().max(0.0)) as usize;
    let y_end = (max_y.ceil().max(0.0) as usize).min(height);

    let mut crossings: Vec<f64> = Vec::new();
    for y in y_start..y_end {
        let scan = y as f64;
        crossings.clear();

        for (i, p1) in points.iter().enumerate() {
            let p2 = &points[(i + 1) % points.len()];
            let (x1, y1, x2, y2) = (p1.x as f64, p1.y as f64, p2.x as f64, p2.y as f64);
            if y1 == y2 {
                continue;
            }
            let (lo, hi) = if y1 < y2 { (y1, y2) } else { (y2, y1) };
            if scan >= lo && scan < hi {
                crossings.push(x1 + (scan - y1) * (x2 - x1) / (y2 - y1));
            }
        }

        crossings.sort_unstable_by(f64::total_cmp);

        let row = y * width;
        for pair in crossings.chunks_exact(2) {
            let x_start = pair[0].ceil().max(0.0) as usize;
            let x_end = (pair[1].ceil().max(0.0) as usize).min(width);
            pixels.extend((x_start..x_end).map(|x| row + x));
        }
    }

    pixels
}
