//! Selection tools: magic wand, edge-snapping lasso, and the segment model.
//!
//! ## Data flow
//! - `PixelBuffer` -> `EdgeField` -> lasso -> `rasterize_polygon` -> `Segment`
//! - `PixelBuffer` -> `magic_wand_select` -> `Segment`
//!
//! `SelectionEngine` ties the pieces together for one image session.

pub mod edge_field;
pub mod engine;
pub mod lasso;
pub mod magic_wand;
pub mod mask;
pub mod outline;
pub mod rasterize;
pub mod segment;

use serde::{Deserialize, Serialize};

/// A position in image pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn distance(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Linear interpolation; `t = 0` is `self`, `t = 1` is `other`.
    #[inline]
    pub fn lerp(self, other: Point, t: f32) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    #[inline]
    pub fn rounded(self) -> Point {
        Point::new(self.x.round(), self.y.round())
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Point::new(x, y)
    }
}
