//! Segment outlines for marching-ants overlays.
//!
//! Boundary pixels (selected, with an unselected 4-neighbor) are chained with
//! Moore-neighbor tracing. Only the segment's bounding box is scanned.

use super::segment::Segment;
use super::Point;

/// Moore neighborhood directions (8-connected, clockwise from right)
const DIRECTIONS: [(i64, i64); 8] = [
    (1, 0),   // right
    (1, 1),   // down-right
    (0, 1),   // down
    (-1, 1),  // down-left
    (-1, 0),  // left
    (-1, -1), // up-left
    (0, -1),  // up
    (1, -1),  // up-right
];

/// Membership grid covering a segment's bounding box.
struct LocalMask {
    origin_x: i64,
    origin_y: i64,
    width: i64,
    height: i64,
    cells: Vec<bool>,
}

impl LocalMask {
    fn new(segment: &Segment) -> Self {
        let image_width = segment.image_width();
        let b = segment.bounds();
        let (w, h) = (b.width(), b.height());
        let mut cells = vec![false; w * h];
        for &index in segment.pixels() {
            let x = index % image_width - b.min_x;
            let y = index / image_width - b.min_y;
            cells[y * w + x] = true;
        }
        Self {
            origin_x: b.min_x as i64,
            origin_y: b.min_y as i64,
            width: w as i64,
            height: h as i64,
            cells,
        }
    }

    /// Local coordinates; outside the box reads as unselected.
    #[inline]
    fn selected(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height && self.cells[(y * self.width + x) as usize]
    }

    #[inline]
    fn boundary(&self, x: i64, y: i64) -> bool {
        self.selected(x, y)
            && (!self.selected(x - 1, y)
                || !self.selected(x + 1, y)
                || !self.selected(x, y - 1)
                || !self.selected(x, y + 1))
    }

    #[inline]
    fn to_image(&self, x: i64, y: i64) -> Point {
        // Pixel centers
        Point::new(
            (self.origin_x + x) as f32 + 0.5,
            (self.origin_y + y) as f32 + 0.5,
        )
    }
}

/// Trace the outlines of a segment, in the coordinates of the image its
/// indices were taken from.
///
/// # Returns
/// One closed polyline per traced boundary, in pixel-center coordinates.
/// Holes produce their own outlines.
pub fn segment_outline(segment: &Segment) -> Vec<Vec<Point>> {
    let mask = LocalMask::new(segment);
    let mut visited = vec![false; mask.cells.len()];
    let mut outlines = Vec::new();

    for y in 0..mask.height {
        for x in 0..mask.width {
            if !visited[(y * mask.width + x) as usize] && mask.boundary(x, y) {
                outlines.push(trace_boundary(&mask, x, y, &mut visited));
            }
        }
    }

    outlines
}

fn trace_boundary(mask: &LocalMask, start_x: i64, start_y: i64, visited: &mut [bool]) -> Vec<Point> {
    let mut outline = Vec::new();

    // Initial backtrack: first unselected neighbor
    let mut dir = DIRECTIONS
        .iter()
        .position(|&(dx, dy)| !mask.selected(start_x + dx, start_y + dy))
        .unwrap_or(0);

    let (mut x, mut y) = (start_x, start_y);
    let max_steps = mask.cells.len() * 4;
    let mut steps = 0;

    loop {
        let slot = (y * mask.width + x) as usize;
        if !visited[slot] {
            visited[slot] = true;
            outline.push(mask.to_image(x, y));
        }

        let search_start = (dir + 5) % 8;
        let next = (0..8).map(|i| (search_start + i) % 8).find_map(|d| {
            let (dx, dy) = DIRECTIONS[d];
            let (nx, ny) = (x + dx, y + dy);
            if !mask.selected(nx, ny) {
                return None;
            }
            if (nx == start_x && ny == start_y) || mask.boundary(nx, ny) {
                Some((d, nx, ny))
            } else {
                None
            }
        });

        let Some((d, nx, ny)) = next else {
            break;
        };
        if nx == start_x && ny == start_y && steps > 0 {
            break;
        }

        x = nx;
        y = ny;
        dir = d;
        steps += 1;
        if steps >= max_steps {
            break;
        }
    }

    outline
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::segment::{SegmentId, SegmentSource};

    fn segment(indices: Vec<usize>, width: usize) -> Segment {
        Segment::from_indices(SegmentId(1), SegmentSource::MagicWand, indices, width).unwrap()
    }

    #[test]
    fn test_rectangle_outline() {
        // 10 wide image, 4x3 rectangle at (3, 2)
        let indices = (2..5)
            .flat_map(|y| (3..7).map(move |x| y * 10 + x))
            .collect();
        let outlines = segment_outline(&segment(indices, 10));

        assert_eq!(outlines.len(), 1);
        // Perimeter pixels of a 4x3 block
        assert_eq!(outlines[0].len(), 10);
        assert_eq!(outlines[0][0], Point::new(3.5, 2.5));
        // Interior pixels are not on the outline
        assert!(!outlines[0].contains(&Point::new(4.5, 3.5)));
    }

    #[test]
    fn test_single_pixel_outline() {
        let outlines = segment_outline(&segment(vec![12], 5));
        assert_eq!(outlines, vec![vec![Point::new(2.5, 2.5)]]);
    }

    #[test]
    fn test_disjoint_blobs() {
        // Two pixels far apart in an 8x1 image
        let outlines = segment_outline(&segment(vec![0, 7], 8));
        assert_eq!(outlines.len(), 2);
    }
}
