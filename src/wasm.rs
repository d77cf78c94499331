//! WebAssembly exports for the selection engine.
//!
//! These are exposed to JavaScript via wasm-bindgen. Images come in as flat
//! RGBA byte arrays (a canvas `ImageData.data` read-back); pointer coordinates
//! must already be in image pixel space.
//!
//! Segments cross the boundary as flat `Uint32Array` pixel indices; masks as
//! PNG bytes or a flat 0/255 alpha array.

use wasm_bindgen::prelude::*;

use crate::config::{ColorSpace, Connectivity, LassoSettings, WandSettings};
use crate::error::SelectionError;
use crate::selection::engine::SelectionEngine;
use crate::selection::segment::{Segment, SegmentId};
use crate::selection::Point;

fn to_js_err(err: SelectionError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn indices(segment: Option<Segment>) -> Option<Vec<u32>> {
    segment.map(|s| s.pixels().iter().map(|&i| i as u32).collect())
}

// ============================================================================
// Engine
// ============================================================================

/// Selection engine bound to one canvas image.
#[wasm_bindgen]
pub struct WasmSelectionEngine {
    inner: SelectionEngine,
    lasso_settings: LassoSettings,
}

#[wasm_bindgen]
impl WasmSelectionEngine {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmSelectionEngine {
        WasmSelectionEngine {
            inner: SelectionEngine::new(),
            lasso_settings: LassoSettings::default(),
        }
    }

    /// Load a flat RGBA buffer (length = width * height * 4).
    pub fn load_image(&mut self, data: &[u8], width: usize, height: usize) -> Result<(), JsValue> {
        self.inner
            .load_rgba(width, height, data.to_vec())
            .map_err(to_js_err)
    }

    /// Lasso settings used by the next `start_lasso`.
    pub fn set_lasso_settings(&mut self, edge_snapping: bool, snap_radius: u32, snap_threshold: f32) {
        self.lasso_settings = LassoSettings {
            edge_snapping,
            snap_radius,
            snap_threshold,
        };
    }

    // ------------------------------------------------------------------------
    // Magic wand
    // ------------------------------------------------------------------------

    /// Magic wand at (x, y).
    ///
    /// # Arguments
    /// * `color_space` - "rgb", "hsv" or "lab"
    /// * `connectivity` - 4 or 8
    /// * `preview_only` - Return the result without committing it
    ///
    /// # Returns
    /// Selected pixel indices, or undefined when nothing was selected
    #[allow(clippy::too_many_arguments)]
    pub fn magic_wand(
        &mut self,
        x: f32,
        y: f32,
        tolerance: f32,
        color_space: &str,
        connectivity: u8,
        contiguous: bool,
        preview_only: bool,
    ) -> Result<Option<Vec<u32>>, JsValue> {
        let settings = WandSettings {
            tolerance,
            color_space: ColorSpace::from_name(color_space)
                .ok_or_else(|| JsValue::from_str("unknown color space"))?,
            connectivity: Connectivity::from_neighbors(connectivity)
                .ok_or_else(|| JsValue::from_str("connectivity must be 4 or 8"))?,
            contiguous,
        };
        let segment = self
            .inner
            .magic_wand(Point::new(x, y), &settings, preview_only)
            .map_err(to_js_err)?;
        Ok(indices(segment))
    }

    // ------------------------------------------------------------------------
    // Lasso
    // ------------------------------------------------------------------------

    /// Start a lasso; returns the placed anchor as [x, y].
    pub fn start_lasso(&mut self, x: f32, y: f32) -> Result<Vec<f32>, JsValue> {
        let anchor = self
            .inner
            .start_lasso(Point::new(x, y), self.lasso_settings)
            .map_err(to_js_err)?;
        Ok(vec![anchor.x, anchor.y])
    }

    pub fn update_lasso(&mut self, x: f32, y: f32) -> Result<(), JsValue> {
        self.inner.update_lasso(Point::new(x, y)).map_err(to_js_err)
    }

    /// Pin the preview end; returns whether an anchor was added.
    pub fn commit_lasso_node(&mut self) -> Result<bool, JsValue> {
        Ok(self.inner.commit_lasso_node().map_err(to_js_err)?.is_some())
    }

    /// Preview path as flat [x0, y0, x1, y1, ...].
    pub fn lasso_preview(&self) -> Vec<f32> {
        self.inner
            .lasso()
            .path()
            .map(|path| path.preview().iter().flat_map(|p| [p.x, p.y]).collect())
            .unwrap_or_default()
    }

    pub fn end_lasso(&mut self) -> Result<Option<Vec<u32>>, JsValue> {
        Ok(indices(self.inner.end_lasso().map_err(to_js_err)?))
    }

    /// End with an external path given as flat [x0, y0, x1, y1, ...].
    pub fn end_lasso_with_path(&mut self, coords: &[f32]) -> Result<Option<Vec<u32>>, JsValue> {
        let points: Vec<Point> = coords
            .chunks_exact(2)
            .map(|c| Point::new(c[0], c[1]))
            .collect();
        let segment = self
            .inner
            .end_lasso_with_path(&points, &self.lasso_settings)
            .map_err(to_js_err)?;
        Ok(indices(segment))
    }

    pub fn cancel_lasso(&mut self) {
        self.inner.cancel_lasso();
    }

    // ------------------------------------------------------------------------
    // Segments and masks
    // ------------------------------------------------------------------------

    /// Ids of all committed segments.
    pub fn segment_ids(&self) -> Vec<u32> {
        self.inner.segments().iter().map(|s| s.id().0 as u32).collect()
    }

    pub fn clear_segments(&mut self) {
        self.inner.clear_segments();
    }

    /// PNG mask of all committed segments.
    pub fn export_mask_png(&self) -> Result<Vec<u8>, JsValue> {
        self.inner.export_combined_mask().map_err(to_js_err)
    }

    /// Flat 0/255 alpha mask of one segment.
    pub fn alpha_mask(&self, segment_id: u32) -> Result<Option<Vec<u8>>, JsValue> {
        let Some(segment) = self.inner.segment(SegmentId(segment_id as u64)) else {
            return Ok(None);
        };
        self.inner.alpha_mask(segment).map(Some).map_err(to_js_err)
    }
}

impl Default for WasmSelectionEngine {
    fn default() -> Self {
        Self::new()
    }
}
