//! Pixel Select
//!
//! Interactive pixel-selection engine for raster images: a magic wand
//! (region growing in RGB, HSV or LAB) and an edge-snapping lasso whose
//! closed path is filled into a pixel selection. Python bindings via PyO3
//! and WASM bindings for JavaScript are available behind features.
//!
//! ## Image Format
//! - **RGBA**: (height, width, 4), `u8` per channel
//! - Selections are sets of flat pixel indices `y * width + x`
//!
//! ## Components
//! - `pixels` - read-only pixel snapshot with per-space color sampling
//! - `selection::edge_field` - Sobel gradient magnitude, built once per image
//! - `selection::magic_wand` - bounded-memory flood fill
//! - `selection::lasso` - anchors, live preview, elastic blending, undo
//! - `selection::rasterize` - even-odd scanline fill
//! - `selection::mask` - PNG mask hand-off
//!
//! Everything runs synchronously on the caller's thread. Rate-limiting hover
//! previews is up to the caller.

pub mod color;
pub mod config;
pub mod error;
pub mod pixels;
pub mod selection;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use color::ColorSample;
pub use config::{ColorSpace, Connectivity, LassoSettings, WandSettings};
pub use error::{Result, SelectionError};
pub use pixels::PixelBuffer;
pub use selection::engine::{SelectionEngine, PREVIEW_SEGMENT_ID};
pub use selection::segment::{BoundingBox, Segment, SegmentId, SegmentSource, Selection};
pub use selection::Point;

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use ndarray::Array2;
    use numpy::{IntoPyArray, PyArray2, PyReadonlyArray3};
    use pyo3::exceptions::{PyRuntimeError, PyValueError};
    use pyo3::prelude::*;

    use crate::config::{ColorSpace, Connectivity, LassoSettings, WandSettings};
    use crate::error::SelectionError;
    use crate::pixels::PixelBuffer;
    use crate::selection::engine::SelectionEngine;
    use crate::selection::segment::{Segment, SegmentId};
    use crate::selection::Point;

    fn to_py_err(err: SelectionError) -> PyErr {
        match err {
            SelectionError::NotInitialized => PyRuntimeError::new_err(err.to_string()),
            other => PyValueError::new_err(other.to_string()),
        }
    }

    fn wand_settings(
        tolerance: f32,
        color_space: &str,
        connectivity: u8,
        contiguous: bool,
    ) -> PyResult<WandSettings> {
        let color_space = ColorSpace::from_name(color_space)
            .ok_or_else(|| PyValueError::new_err(format!("unknown color space: {color_space}")))?;
        let connectivity = Connectivity::from_neighbors(connectivity)
            .ok_or_else(|| PyValueError::new_err("connectivity must be 4 or 8"))?;
        Ok(WandSettings {
            tolerance,
            color_space,
            connectivity,
            contiguous,
        })
    }

    /// Python-facing segment summary: (id, pixel indices, (min_x, min_y, max_x, max_y)).
    type SegmentTuple = (u64, Vec<usize>, (usize, usize, usize, usize));

    fn to_tuple(segment: &Segment) -> SegmentTuple {
        let b = segment.bounds();
        (
            segment.id().0,
            segment.pixels().to_vec(),
            (b.min_x, b.min_y, b.max_x, b.max_y),
        )
    }

    /// Selection engine bound to one image.
    #[pyclass(name = "SelectionEngine", unsendable)]
    pub struct PySelectionEngine {
        inner: SelectionEngine,
    }

    #[pymethods]
    impl PySelectionEngine {
        #[new]
        fn new() -> Self {
            Self {
                inner: SelectionEngine::new(),
            }
        }

        /// Load an RGBA u8 image of shape (height, width, 4).
        fn load_image(&mut self, image: PyReadonlyArray3<'_, u8>) -> PyResult<()> {
            let pixels = PixelBuffer::from_view(image.as_array()).map_err(to_py_err)?;
            self.inner.load_image(pixels);
            Ok(())
        }

        /// Magic wand at (x, y). Returns (id, indices, bounds) or None.
        #[pyo3(signature = (x, y, tolerance=0.15, color_space="rgb", connectivity=4, contiguous=true, preview_only=false))]
        #[allow(clippy::too_many_arguments)]
        fn magic_wand(
            &mut self,
            x: f32,
            y: f32,
            tolerance: f32,
            color_space: &str,
            connectivity: u8,
            contiguous: bool,
            preview_only: bool,
        ) -> PyResult<Option<SegmentTuple>> {
            let settings = wand_settings(tolerance, color_space, connectivity, contiguous)?;
            let segment = self
                .inner
                .magic_wand(Point::new(x, y), &settings, preview_only)
                .map_err(to_py_err)?;
            Ok(segment.as_ref().map(to_tuple))
        }

        #[pyo3(signature = (x, y, edge_snapping=true, snap_radius=10, snap_threshold=0.3))]
        fn start_lasso(
            &mut self,
            x: f32,
            y: f32,
            edge_snapping: bool,
            snap_radius: u32,
            snap_threshold: f32,
        ) -> PyResult<(f32, f32)> {
            let settings = LassoSettings {
                edge_snapping,
                snap_radius,
                snap_threshold,
            };
            let anchor = self
                .inner
                .start_lasso(Point::new(x, y), settings)
                .map_err(to_py_err)?;
            Ok((anchor.x, anchor.y))
        }

        fn update_lasso(&mut self, x: f32, y: f32) -> PyResult<()> {
            self.inner.update_lasso(Point::new(x, y)).map_err(to_py_err)
        }

        fn commit_lasso_node(&mut self) -> PyResult<Option<(f32, f32)>> {
            let anchor = self.inner.commit_lasso_node().map_err(to_py_err)?;
            Ok(anchor.map(|p| (p.x, p.y)))
        }

        /// Current preview path as a list of (x, y).
        fn lasso_preview(&self) -> Vec<(f32, f32)> {
            self.inner
                .lasso()
                .path()
                .map(|path| path.preview().iter().map(|p| (p.x, p.y)).collect())
                .unwrap_or_default()
        }

        fn end_lasso(&mut self) -> PyResult<Option<SegmentTuple>> {
            let segment = self.inner.end_lasso().map_err(to_py_err)?;
            Ok(segment.as_ref().map(to_tuple))
        }

        /// Fill an externally supplied path. The settings close the path when no
        /// lasso session is active; a running session uses its own.
        #[pyo3(signature = (points, edge_snapping=true, snap_radius=10, snap_threshold=0.3))]
        fn end_lasso_with_path(
            &mut self,
            points: Vec<(f32, f32)>,
            edge_snapping: bool,
            snap_radius: u32,
            snap_threshold: f32,
        ) -> PyResult<Option<SegmentTuple>> {
            let points: Vec<Point> = points.into_iter().map(Point::from).collect();
            let settings = LassoSettings {
                edge_snapping,
                snap_radius,
                snap_threshold,
            };
            let segment = self
                .inner
                .end_lasso_with_path(&points, &settings)
                .map_err(to_py_err)?;
            Ok(segment.as_ref().map(to_tuple))
        }

        fn cancel_lasso(&mut self) {
            self.inner.cancel_lasso();
        }

        fn segments(&self) -> Vec<SegmentTuple> {
            self.inner.segments().iter().map(to_tuple).collect()
        }

        fn clear_segments(&mut self) {
            self.inner.clear_segments();
        }

        /// Segment mask as a (height, width) u8 array, 255 = selected.
        fn mask<'py>(&self, py: Python<'py>, segment_id: u64) -> PyResult<Option<Bound<'py, PyArray2<u8>>>> {
            let Some(segment) = self.inner.segment(SegmentId(segment_id)) else {
                return Ok(None);
            };
            let context = self.inner.image().map_err(to_py_err)?;
            let alpha = self.inner.alpha_mask(segment).map_err(to_py_err)?;
            let array = Array2::from_shape_vec((context.height(), context.width()), alpha)
                .map_err(|e| PyValueError::new_err(e.to_string()))?;
            Ok(Some(array.into_pyarray(py)))
        }

        /// Segment mask encoded as PNG bytes.
        fn export_mask(&self, segment_id: u64) -> PyResult<Option<Vec<u8>>> {
            let Some(segment) = self.inner.segment(SegmentId(segment_id)) else {
                return Ok(None);
            };
            self.inner.export_mask(segment).map(Some).map_err(to_py_err)
        }
    }

    /// Python module definition
    #[pymodule]
    pub fn pixel_select(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_class::<PySelectionEngine>()?;
        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::pixel_select;
