//! Error type shared by the selection engine.
//!
//! Empty results (a click outside the image, a lasso that encloses nothing)
//! are not errors; they come back as `Ok(None)` or an empty pixel set.

/// Failures surfaced by the engine and the mask codec.
#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    /// An operation needing the per-image context ran before `load_image`.
    #[error("selection engine used before an image was loaded")]
    NotInitialized,

    /// The RGBA byte count does not match the declared dimensions.
    #[error("pixel buffer for {width}x{height} needs {expected} bytes, got {actual}")]
    BufferSize {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    /// Zero width or height.
    #[error("image has no pixels")]
    EmptyImage,

    #[error("failed to encode mask: {0}")]
    MaskEncode(#[source] image::ImageError),

    #[error("failed to decode mask: {0}")]
    MaskDecode(#[source] image::ImageError),

    /// A segment built for another image was handed back to the engine.
    #[error("segment was built for an image {segment_width} px wide, loaded image is {width}x{height}")]
    ForeignSegment {
        segment_width: usize,
        width: usize,
        height: usize,
    },

    /// A decoded mask does not cover the loaded image.
    #[error("mask is {mask_width}x{mask_height}, image is {width}x{height}")]
    MaskDimensions {
        mask_width: usize,
        mask_height: usize,
        width: usize,
        height: usize,
    },
}

pub type Result<T> = std::result::Result<T, SelectionError>;
