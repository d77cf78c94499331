//! Tool settings consumed per call.
//!
//! The UI layer owns and mutates these; the engine only reads them. Both
//! structs deserialize with defaults for every missing field, so a partial
//! JSON object from the panel is enough.

use serde::{Deserialize, Serialize};

/// Color representation used to compare pixels against the seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpace {
    #[default]
    Rgb,
    Hsv,
    Lab,
}

impl ColorSpace {
    /// Parse `"rgb"`, `"hsv"` or `"lab"` (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "rgb" => Some(ColorSpace::Rgb),
            "hsv" => Some(ColorSpace::Hsv),
            "lab" => Some(ColorSpace::Lab),
            _ => None,
        }
    }
}

/// Neighborhood used by contiguous region growing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    /// Left, right, up, down.
    #[default]
    Four,
    /// The four sides plus the diagonals.
    Eight,
}

impl Connectivity {
    const FOUR: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
    const EIGHT: [(i32, i32); 8] = [
        (-1, 0),
        (1, 0),
        (0, -1),
        (0, 1),
        (-1, -1),
        (1, -1),
        (-1, 1),
        (1, 1),
    ];

    /// From a neighbor count, 4 or 8.
    pub fn from_neighbors(count: u8) -> Option<Self> {
        match count {
            4 => Some(Connectivity::Four),
            8 => Some(Connectivity::Eight),
            _ => None,
        }
    }

    /// Neighbor offsets as `(dx, dy)`.
    pub fn offsets(self) -> &'static [(i32, i32)] {
        match self {
            Connectivity::Four => &Self::FOUR,
            Connectivity::Eight => &Self::EIGHT,
        }
    }
}

/// Magic wand settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WandSettings {
    /// Maximum color distance from the seed, on the normalized scale of
    /// `color_space` (roughly 0.0-1.0 for a useful range).
    pub tolerance: f32,
    pub color_space: ColorSpace,
    pub connectivity: Connectivity,
    /// Restrict the selection to pixels reachable from the seed.
    pub contiguous: bool,
}

impl Default for WandSettings {
    fn default() -> Self {
        Self {
            tolerance: 0.15,
            color_space: ColorSpace::Rgb,
            connectivity: Connectivity::Four,
            contiguous: true,
        }
    }
}

/// Lasso settings, captured when a lasso session starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LassoSettings {
    pub edge_snapping: bool,
    /// Half-size of the square search window, in pixels.
    pub snap_radius: u32,
    /// Minimum edge strength as a fraction of 255.
    pub snap_threshold: f32,
}

impl Default for LassoSettings {
    fn default() -> Self {
        Self {
            edge_snapping: true,
            snap_radius: 10,
            snap_threshold: 0.3,
        }
    }
}

impl LassoSettings {
    /// Distance between samples along a candidate edge path.
    pub fn sample_step(&self) -> f32 {
        (self.snap_radius as f32 / 2.0).max(1.0)
    }
}
