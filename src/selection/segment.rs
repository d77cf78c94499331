//! Committed selections (segments) and the active, uncommitted selection.
//!
//! A segment is a set of unique pixel indices plus the tight bounding box
//! around them. It never exists with zero pixels: building one from an empty
//! set yields `None`.

use serde::Serialize;

/// Engine-assigned segment identifier, unique per engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SegmentId(pub u64);

/// Which tool produced a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentSource {
    MagicWand,
    Lasso,
    /// Committed from a staged selection.
    Selection,
}

/// Inclusive pixel bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub min_x: usize,
    pub min_y: usize,
    pub max_x: usize,
    pub max_y: usize,
}

impl BoundingBox {
    /// Tight bounds of a set of pixel indices, `None` when empty.
    pub fn of_indices(indices: &[usize], width: usize) -> Option<Self> {
        let mut iter = indices.iter();
        let &first = iter.next()?;
        let mut bounds = BoundingBox {
            min_x: first % width,
            min_y: first / width,
            max_x: first % width,
            max_y: first / width,
        };
        for &index in iter {
            let (x, y) = (index % width, index / width);
            bounds.min_x = bounds.min_x.min(x);
            bounds.min_y = bounds.min_y.min(y);
            bounds.max_x = bounds.max_x.max(x);
            bounds.max_y = bounds.max_y.max(y);
        }
        Some(bounds)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.max_x - self.min_x + 1
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.max_y - self.min_y + 1
    }

    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

/// Sort and deduplicate pixel indices in place.
fn normalize(mut indices: Vec<usize>) -> Vec<usize> {
    indices.sort_unstable();
    indices.dedup();
    indices
}

/// A committed selection region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    id: SegmentId,
    source: SegmentSource,
    pixels: Vec<usize>,
    bounds: BoundingBox,
    image_width: usize,
}

impl Segment {
    /// Build a segment from pixel indices of an image `width` pixels wide.
    ///
    /// Indices are sorted and deduplicated. Returns `None` for an empty set.
    pub fn from_indices(
        id: SegmentId,
        source: SegmentSource,
        indices: Vec<usize>,
        width: usize,
    ) -> Option<Self> {
        let pixels = normalize(indices);
        let bounds = BoundingBox::of_indices(&pixels, width)?;
        Some(Self {
            id,
            source,
            pixels,
            bounds,
            image_width: width,
        })
    }

    pub fn id(&self) -> SegmentId {
        self.id
    }

    pub fn source(&self) -> SegmentSource {
        self.source
    }

    /// Sorted, unique pixel indices.
    pub fn pixels(&self) -> &[usize] {
        &self.pixels
    }

    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    /// Width of the image the indices were taken from.
    pub fn image_width(&self) -> usize {
        self.image_width
    }

    /// Whether the indices address pixels of a `width` x `height` image.
    pub fn fits(&self, width: usize, height: usize) -> bool {
        self.image_width == width && self.pixels.last().is_some_and(|&i| i < width * height)
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.pixels.binary_search(&index).is_ok()
    }
}

/// The active selection shown as a preview, not yet committed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Selection {
    pixels: Vec<usize>,
    bounds: Option<BoundingBox>,
}

impl Selection {
    pub fn new(indices: Vec<usize>, width: usize) -> Self {
        let pixels = normalize(indices);
        let bounds = BoundingBox::of_indices(&pixels, width);
        Self { pixels, bounds }
    }

    pub fn pixels(&self) -> &[usize] {
        &self.pixels
    }

    pub fn bounds(&self) -> Option<BoundingBox> {
        self.bounds
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Consume into a segment; `None` if nothing is selected.
    pub fn into_segment(self, id: SegmentId, width: usize) -> Option<Segment> {
        Segment::from_indices(id, SegmentSource::Selection, self.pixels, width)
    }
}
