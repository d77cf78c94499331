//! Selection engine for one image session.
//!
//! Per-image data (pixels, edge field, flood buffers) lives in an
//! `ImageContext` that is rebuilt whenever a new image is loaded. Per-operation
//! state (the lasso session, the staged selection) lives beside it and is reset
//! on load. Committed segments belong to the image they were taken from and are
//! dropped on load as well; a segment from an earlier image is rejected with
//! `SelectionError::ForeignSegment`.
//!
//! Calling an image operation before `load_image` is a sequencing bug and
//! returns `SelectionError::NotInitialized`.

use log::debug;

use super::edge_field::EdgeField;
use super::lasso::{self, Lasso};
use super::magic_wand::{magic_wand_select, FloodScratch};
use super::mask::{self, DecodedMask};
use super::outline::segment_outline;
use super::rasterize::rasterize_polygon;
use super::segment::{Segment, SegmentId, SegmentSource, Selection};
use super::Point;
use crate::config::{LassoSettings, WandSettings};
use crate::error::{Result, SelectionError};
use crate::pixels::PixelBuffer;

/// Id carried by preview results that were never committed.
pub const PREVIEW_SEGMENT_ID: SegmentId = SegmentId(0);

/// Everything derived from one loaded image.
#[derive(Debug, Clone)]
pub struct ImageContext {
    pixels: PixelBuffer,
    edges: EdgeField,
    scratch: FloodScratch,
}

impl ImageContext {
    pub fn new(pixels: PixelBuffer) -> Self {
        let edges = EdgeField::compute(&pixels);
        let scratch = FloodScratch::new(pixels.len());
        Self {
            pixels,
            edges,
            scratch,
        }
    }

    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    pub fn edges(&self) -> &EdgeField {
        &self.edges
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.pixels.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.pixels.height()
    }
}

/// Magic wand, lasso and segment bookkeeping for a single image.
#[derive(Debug, Default)]
pub struct SelectionEngine {
    image: Option<ImageContext>,
    lasso: Lasso,
    selection: Option<Selection>,
    segments: Vec<Segment>,
    next_id: u64,
}

impl SelectionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with an image already loaded.
    pub fn with_image(pixels: PixelBuffer) -> Self {
        let mut engine = Self::new();
        engine.load_image(pixels);
        engine
    }

    /// Replace the per-image context.
    ///
    /// Cancels any lasso session and drops the staged selection and the
    /// committed segments. Segment ids keep counting up.
    pub fn load_image(&mut self, pixels: PixelBuffer) {
        let context = ImageContext::new(pixels);
        debug!(
            "image loaded: {}x{}, peak edge strength {:.1}",
            context.width(),
            context.height(),
            context.edges.max_strength()
        );
        self.image = Some(context);
        self.lasso.cancel();
        self.selection = None;
        if !self.segments.is_empty() {
            debug!("dropped {} segments of the previous image", self.segments.len());
            self.segments.clear();
        }
    }

    /// Load from a flat RGBA buffer.
    pub fn load_rgba(&mut self, width: usize, height: usize, rgba: Vec<u8>) -> Result<()> {
        let pixels = PixelBuffer::new(width, height, rgba)?;
        self.load_image(pixels);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.image.is_some()
    }

    pub fn image(&self) -> Result<&ImageContext> {
        self.image.as_ref().ok_or(SelectionError::NotInitialized)
    }

    fn image_mut(&mut self) -> Result<&mut ImageContext> {
        self.image.as_mut().ok_or(SelectionError::NotInitialized)
    }

    pub fn edge_field(&self) -> Result<&EdgeField> {
        Ok(&self.image()?.edges)
    }

    /// The loaded image, provided `segment` was taken from an image of its size.
    fn image_for(&self, segment: &Segment) -> Result<&ImageContext> {
        let context = self.image()?;
        if !segment.fits(context.width(), context.height()) {
            return Err(SelectionError::ForeignSegment {
                segment_width: segment.image_width(),
                width: context.width(),
                height: context.height(),
            });
        }
        Ok(context)
    }

    fn allocate_id(&mut self) -> SegmentId {
        self.next_id += 1;
        SegmentId(self.next_id)
    }

    /// Store a new segment; `None` when `pixels` is empty.
    fn commit(&mut self, source: SegmentSource, pixels: Vec<usize>, width: usize) -> Option<Segment> {
        if pixels.is_empty() {
            return None;
        }
        let id = self.allocate_id();
        let segment = Segment::from_indices(id, source, pixels, width)?;
        let b = segment.bounds();
        debug!(
            "segment {} committed from {:?}: {} px in ({}, {})-({}, {})",
            id.0,
            source,
            segment.len(),
            b.min_x,
            b.min_y,
            b.max_x,
            b.max_y
        );
        self.segments.push(segment.clone());
        Some(segment)
    }

    // ------------------------------------------------------------------
    // Magic wand
    // ------------------------------------------------------------------

    /// Region-growing selection seeded at `seed`.
    ///
    /// With `preview_only` the result is returned with `PREVIEW_SEGMENT_ID`
    /// and nothing is stored. Otherwise it is committed as a new segment and
    /// the staged selection is cleared. A seed outside the image selects
    /// nothing and leaves all state untouched.
    pub fn magic_wand(
        &mut self,
        seed: Point,
        settings: &WandSettings,
        preview_only: bool,
    ) -> Result<Option<Segment>> {
        let context = self.image_mut()?;
        let width = context.width();
        let (x, y) = (seed.x.floor() as i64, seed.y.floor() as i64);
        let pixels = magic_wand_select(&context.pixels, &mut context.scratch, x, y, settings);

        if preview_only {
            return Ok(Segment::from_indices(
                PREVIEW_SEGMENT_ID,
                SegmentSource::MagicWand,
                pixels,
                width,
            ));
        }

        let segment = self.commit(SegmentSource::MagicWand, pixels, width);
        if segment.is_some() {
            self.selection = None;
        }
        Ok(segment)
    }

    // ------------------------------------------------------------------
    // Lasso
    // ------------------------------------------------------------------

    pub fn lasso(&self) -> &Lasso {
        &self.lasso
    }

    /// Strongest edge near `point`, or the rounded point itself.
    pub fn snap_to_edge(&self, point: Point, settings: &LassoSettings) -> Result<Point> {
        Ok(lasso::snap_to_edge(self.edge_field()?, settings, point))
    }

    pub fn find_edge_path(&self, p1: Point, p2: Point, settings: &LassoSettings) -> Result<Vec<Point>> {
        Ok(lasso::find_edge_path(self.edge_field()?, settings, p1, p2))
    }

    /// Begin a lasso session; returns the placed first anchor.
    ///
    /// Segments from an earlier lasso session are discarded and any session
    /// in progress is cancelled.
    pub fn start_lasso(&mut self, point: Point, settings: LassoSettings) -> Result<Point> {
        let context = self.image.as_ref().ok_or(SelectionError::NotInitialized)?;
        let anchor = self.lasso.start(&context.edges, settings, point);

        let before = self.segments.len();
        self.segments.retain(|s| s.source() != SegmentSource::Lasso);
        if self.segments.len() != before {
            debug!("dropped {} segments from the previous lasso", before - self.segments.len());
        }
        Ok(anchor)
    }

    /// Move the live preview toward `point`. Ignored when no session is active.
    pub fn update_lasso(&mut self, point: Point) -> Result<()> {
        let context = self.image.as_ref().ok_or(SelectionError::NotInitialized)?;
        self.lasso.update_live_preview(&context.edges, point);
        Ok(())
    }

    /// Pin the preview's end as an anchor; `None` when there is nothing to pin.
    pub fn commit_lasso_node(&mut self) -> Result<Option<Point>> {
        self.image()?;
        Ok(self.lasso.commit_node())
    }

    /// The closed path `end_lasso` would fill right now.
    pub fn current_lasso_path(&self) -> Result<Option<Vec<Point>>> {
        let edges = self.edge_field()?;
        Ok(self.lasso.path().and_then(|path| path.closed_path(edges)))
    }

    /// Close, fill and commit the drawn path.
    ///
    /// Fewer than two anchors, or a path enclosing no pixel, ends the session
    /// without a segment.
    pub fn end_lasso(&mut self) -> Result<Option<Segment>> {
        let context = self.image.as_ref().ok_or(SelectionError::NotInitialized)?;
        let (width, height) = (context.width(), context.height());
        let Some(path) = self.lasso.finish(&context.edges) else {
            debug!("lasso ended without an enclosed area");
            return Ok(None);
        };
        let pixels = rasterize_polygon(&path, width, height);
        Ok(self.commit(SegmentSource::Lasso, pixels, width))
    }

    /// Close, fill and commit a path supplied from outside (for example a
    /// refined outline), ending any session in progress.
    ///
    /// The active session's settings drive the closing edge path; `settings`
    /// is used when no session is active.
    pub fn end_lasso_with_path(&mut self, points: &[Point], settings: &LassoSettings) -> Result<Option<Segment>> {
        let context = self.image.as_ref().ok_or(SelectionError::NotInitialized)?;
        let (width, height) = (context.width(), context.height());
        let settings = self.lasso.take_settings().unwrap_or(*settings);

        let Some(path) = lasso::close_external_path(&context.edges, &settings, points) else {
            return Ok(None);
        };
        let pixels = rasterize_polygon(&path, width, height);
        Ok(self.commit(SegmentSource::Lasso, pixels, width))
    }

    pub fn cancel_lasso(&mut self) {
        self.lasso.cancel();
    }

    // ------------------------------------------------------------------
    // Staged selection
    // ------------------------------------------------------------------

    /// Stage pixels as the active (uncommitted) selection.
    pub fn set_selection(&mut self, pixels: Vec<usize>) -> Result<()> {
        let context = self.image()?;
        let len = context.pixels.len();
        let width = context.width();
        let pixels = pixels.into_iter().filter(|&i| i < len).collect();
        self.selection = Some(Selection::new(pixels, width));
        Ok(())
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Turn the staged selection into a segment.
    pub fn commit_selection(&mut self) -> Result<Option<Segment>> {
        let width = self.image()?.width();
        let Some(selection) = self.selection.take() else {
            return Ok(None);
        };
        Ok(self.commit(SegmentSource::Selection, selection.pixels().to_vec(), width))
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    // ------------------------------------------------------------------
    // Segments
    // ------------------------------------------------------------------

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.iter().find(|s| s.id() == id)
    }

    pub fn remove_segment(&mut self, id: SegmentId) -> Option<Segment> {
        let pos = self.segments.iter().position(|s| s.id() == id)?;
        Some(self.segments.remove(pos))
    }

    pub fn clear_segments(&mut self) {
        self.segments.clear();
    }

    /// Outline polylines of a segment.
    pub fn outline(&self, segment: &Segment) -> Result<Vec<Vec<Point>>> {
        self.image_for(segment)?;
        Ok(segment_outline(segment))
    }

    // ------------------------------------------------------------------
    // Mask hand-off
    // ------------------------------------------------------------------

    /// Flat 0/255 mask of one segment.
    pub fn alpha_mask(&self, segment: &Segment) -> Result<Vec<u8>> {
        let context = self.image_for(segment)?;
        Ok(mask::alpha_mask(segment.pixels(), context.width(), context.height()))
    }

    /// PNG mask of one segment.
    pub fn export_mask(&self, segment: &Segment) -> Result<Vec<u8>> {
        let context = self.image_for(segment)?;
        mask::encode_mask_png(segment.pixels(), context.width(), context.height())
    }

    /// PNG mask of every committed segment together.
    pub fn export_combined_mask(&self) -> Result<Vec<u8>> {
        let context = self.image()?;
        let pixels: Vec<usize> = self
            .segments
            .iter()
            .flat_map(|s| s.pixels().iter().copied())
            .collect();
        mask::encode_mask_png(&pixels, context.width(), context.height())
    }

    /// Decode a PNG mask sized to the loaded image into pixel indices.
    pub fn decode_mask(&self, bytes: &[u8]) -> Result<Vec<usize>> {
        let context = self.image()?;
        let DecodedMask {
            width,
            height,
            pixels,
        } = mask::decode_mask_png(bytes)?;
        if width != context.width() || height != context.height() {
            return Err(SelectionError::MaskDimensions {
                mask_width: width,
                mask_height: height,
                width: context.width(),
                height: context.height(),
            });
        }
        Ok(pixels)
    }

    /// Decode a mask and commit it as a segment.
    pub fn import_mask(&mut self, bytes: &[u8]) -> Result<Option<Segment>> {
        let pixels = self.decode_mask(bytes)?;
        let width = self.image()?.width();
        Ok(self.commit(SegmentSource::Selection, pixels, width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_image(width: usize, height: usize) -> PixelBuffer {
        let mut data = vec![0u8; width * height * 4];
        for px in data.chunks_exact_mut(4) {
            px.copy_from_slice(&[100, 100, 100, 255]);
        }
        PixelBuffer::new(width, height, data).unwrap()
    }

    fn no_snap() -> LassoSettings {
        LassoSettings {
            edge_snapping: false,
            snap_radius: 4,
            snap_threshold: 0.3,
        }
    }

    #[test]
    fn test_uninitialized_engine_fails_fast() {
        let mut engine = SelectionEngine::new();
        let settings = WandSettings::default();

        assert!(matches!(
            engine.magic_wand(Point::new(0.0, 0.0), &settings, false),
            Err(SelectionError::NotInitialized)
        ));
        assert!(matches!(
            engine.start_lasso(Point::new(0.0, 0.0), no_snap()),
            Err(SelectionError::NotInitialized)
        ));
        assert!(matches!(engine.end_lasso(), Err(SelectionError::NotInitialized)));
        assert!(matches!(
            engine.set_selection(vec![0]),
            Err(SelectionError::NotInitialized)
        ));
    }

    #[test]
    fn test_preview_does_not_commit() {
        let mut engine = SelectionEngine::with_image(gray_image(4, 4));
        let settings = WandSettings::default();

        let preview = engine
            .magic_wand(Point::new(1.0, 1.0), &settings, true)
            .unwrap()
            .unwrap();
        assert_eq!(preview.id(), PREVIEW_SEGMENT_ID);
        assert_eq!(preview.len(), 16);
        assert!(engine.segments().is_empty());

        let committed = engine
            .magic_wand(Point::new(1.0, 1.0), &settings, false)
            .unwrap()
            .unwrap();
        assert_eq!(committed.id(), SegmentId(1));
        assert_eq!(committed.pixels(), preview.pixels());
        assert_eq!(engine.segments().len(), 1);
    }

    #[test]
    fn test_wand_commit_clears_staged_selection() {
        let mut engine = SelectionEngine::with_image(gray_image(4, 4));
        engine.set_selection(vec![0, 1]).unwrap();
        engine.magic_wand(Point::new(0.0, 0.0), &WandSettings::default(), true).unwrap();
        assert!(engine.selection().is_some());

        engine.magic_wand(Point::new(0.0, 0.0), &WandSettings::default(), false).unwrap();
        assert!(engine.selection().is_none());
    }

    #[test]
    fn test_wand_outside_image_is_noop() {
        let mut engine = SelectionEngine::with_image(gray_image(4, 4));
        engine.set_selection(vec![1, 2]).unwrap();
        let result = engine
            .magic_wand(Point::new(-5.0, 100.0), &WandSettings::default(), false)
            .unwrap();
        assert!(result.is_none());
        assert!(engine.segments().is_empty());
        assert_eq!(engine.selection().map(|s| s.pixels()), Some(&[1, 2][..]));
    }

    #[test]
    fn test_lasso_square_commits_segment() {
        let mut engine = SelectionEngine::with_image(gray_image(32, 32));
        engine.start_lasso(Point::new(4.0, 4.0), no_snap()).unwrap();
        engine.update_lasso(Point::new(20.0, 4.0)).unwrap();
        engine.commit_lasso_node().unwrap();
        engine.update_lasso(Point::new(20.0, 20.0)).unwrap();
        engine.commit_lasso_node().unwrap();
        engine.update_lasso(Point::new(4.0, 20.0)).unwrap();

        let segment = engine.end_lasso().unwrap().unwrap();
        assert_eq!(segment.source(), SegmentSource::Lasso);
        // x, y in 4..20
        assert_eq!(segment.len(), 16 * 16);
        let b = segment.bounds();
        assert_eq!((b.min_x, b.min_y, b.max_x, b.max_y), (4, 4, 19, 19));
        assert!(!engine.lasso().is_drawing());
    }

    #[test]
    fn test_new_lasso_discards_previous_lasso_segments() {
        let mut engine = SelectionEngine::with_image(gray_image(16, 16));
        engine
            .magic_wand(Point::new(0.0, 0.0), &WandSettings::default(), false)
            .unwrap();
        let square = [
            Point::new(2.0, 2.0),
            Point::new(10.0, 2.0),
            Point::new(10.0, 10.0),
            Point::new(2.0, 10.0),
        ];
        engine.end_lasso_with_path(&square, &no_snap()).unwrap().unwrap();
        assert_eq!(engine.segments().len(), 2);

        engine.start_lasso(Point::new(1.0, 1.0), no_snap()).unwrap();
        assert_eq!(engine.segments().len(), 1);
        assert_eq!(engine.segments()[0].source(), SegmentSource::MagicWand);
    }

    #[test]
    fn test_lasso_with_two_anchors_and_no_preview() {
        let mut engine = SelectionEngine::with_image(gray_image(32, 32));
        engine.start_lasso(Point::new(2.0, 2.0), no_snap()).unwrap();
        engine.update_lasso(Point::new(25.0, 20.0)).unwrap();
        engine.commit_lasso_node().unwrap();

        assert!(engine.end_lasso().unwrap().is_none());
        assert!(engine.segments().is_empty());
        assert!(!engine.lasso().is_drawing());
    }

    #[test]
    fn test_cancel_lasso_produces_nothing() {
        let mut engine = SelectionEngine::with_image(gray_image(16, 16));
        engine.start_lasso(Point::new(2.0, 2.0), no_snap()).unwrap();
        engine.update_lasso(Point::new(12.0, 2.0)).unwrap();
        engine.cancel_lasso();
        assert!(engine.end_lasso().unwrap().is_none());
        assert!(engine.segments().is_empty());
    }

    #[test]
    fn test_selection_lifecycle() {
        let mut engine = SelectionEngine::with_image(gray_image(4, 4));
        engine.set_selection(vec![5, 6, 99]).unwrap();
        assert_eq!(engine.selection().unwrap().pixels(), &[5, 6]);

        let segment = engine.commit_selection().unwrap().unwrap();
        assert_eq!(segment.pixels(), &[5, 6]);
        assert!(engine.selection().is_none());
        assert!(engine.commit_selection().unwrap().is_none());

        engine.set_selection(vec![1]).unwrap();
        engine.clear_selection();
        assert!(engine.selection().is_none());
    }

    #[test]
    fn test_segment_management() {
        let mut engine = SelectionEngine::with_image(gray_image(4, 4));
        let settings = WandSettings::default();
        let a = engine.magic_wand(Point::new(0.0, 0.0), &settings, false).unwrap().unwrap();
        let b = engine.magic_wand(Point::new(3.0, 3.0), &settings, false).unwrap().unwrap();
        assert_ne!(a.id(), b.id());

        assert!(engine.segment(a.id()).is_some());
        assert_eq!(engine.remove_segment(a.id()).map(|s| s.id()), Some(a.id()));
        assert!(engine.segment(a.id()).is_none());

        engine.clear_segments();
        assert!(engine.segments().is_empty());
    }

    #[test]
    fn test_mask_round_trip_through_engine() {
        let mut engine = SelectionEngine::with_image(gray_image(8, 8));
        engine.set_selection(vec![0, 9, 18, 27, 63]).unwrap();
        let segment = engine.commit_selection().unwrap().unwrap();

        let png = engine.export_mask(&segment).unwrap();
        assert_eq!(engine.decode_mask(&png).unwrap(), segment.pixels());

        let alpha = engine.alpha_mask(&segment).unwrap();
        assert_eq!(alpha.iter().filter(|&&a| a == 255).count(), 5);
    }

    #[test]
    fn test_decode_mask_checks_dimensions() {
        let engine = SelectionEngine::with_image(gray_image(8, 8));
        let png = mask::encode_mask_png(&[0], 4, 4).unwrap();
        assert!(matches!(
            engine.decode_mask(&png),
            Err(SelectionError::MaskDimensions { mask_width: 4, .. })
        ));
    }

    #[test]
    fn test_load_image_resets_session_state() {
        let mut engine = SelectionEngine::with_image(gray_image(8, 8));
        engine.magic_wand(Point::new(0.0, 0.0), &WandSettings::default(), false).unwrap();
        engine.start_lasso(Point::new(1.0, 1.0), no_snap()).unwrap();
        engine.set_selection(vec![3]).unwrap();
        assert_eq!(engine.segments().len(), 1);

        engine.load_image(gray_image(6, 6));
        assert!(!engine.lasso().is_drawing());
        assert!(engine.selection().is_none());
        assert!(engine.segments().is_empty());
        assert_eq!(engine.image().unwrap().width(), 6);

        // Ids are not reused across images
        let next = engine
            .magic_wand(Point::new(0.0, 0.0), &WandSettings::default(), false)
            .unwrap()
            .unwrap();
        assert_eq!(next.id(), SegmentId(2));
    }

    #[test]
    fn test_segment_from_previous_image_is_rejected() {
        let mut engine = SelectionEngine::new();
        engine.load_image(gray_image(10, 2));
        engine.set_selection(vec![9]).unwrap();
        let kept = engine.commit_selection().unwrap().unwrap();

        engine.load_image(gray_image(6, 6));
        let foreign = |r: Result<()>| matches!(r, Err(SelectionError::ForeignSegment { segment_width: 10, .. }));
        assert!(foreign(engine.outline(&kept).map(|_| ())));
        assert!(foreign(engine.export_mask(&kept).map(|_| ())));
        assert!(foreign(engine.alpha_mask(&kept).map(|_| ())));

        // Nothing stale leaks into the combined mask
        let png = engine.export_combined_mask().unwrap();
        assert!(engine.decode_mask(&png).unwrap().is_empty());
    }
}
