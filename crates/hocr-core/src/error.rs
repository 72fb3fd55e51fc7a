//! Error types for the hocr-core library.

use thiserror::Error;

/// Main error type for the hocr library.
#[derive(Error, Debug)]
pub enum HocrError {
    /// Word detection error.
    #[error("detection error: {0}")]
    Detection(#[from] DetectionError),

    /// hOCR markup error.
    #[error("markup error: {0}")]
    Markup(#[from] MarkupError),

    /// Document editing error.
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// Recognizer error from an external text source.
    #[error("recognition error: {0}")]
    Recognition(String),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while turning a raster into word boxes.
#[derive(Error, Debug)]
pub enum DetectionError {
    /// The source image could not be decoded.
    #[error("failed to decode image: {0}")]
    Decode(String),

    /// Raster buffer does not match its declared dimensions.
    #[error("invalid raster: expected {expected} pixels for {width}x{height}, got {actual}")]
    InvalidRaster {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    /// The image has a zero dimension.
    #[error("image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
}

/// Errors raised while decoding hOCR markup.
#[derive(Error, Debug)]
pub enum MarkupError {
    /// Markup is not well-formed.
    #[error("malformed markup at byte {position}: {reason}")]
    Malformed { position: u64, reason: String },

    /// Markup contains no root element.
    #[error("markup has no root element")]
    NoRoot,
}

/// Errors raised by operations on an editable document.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DocumentError {
    /// No word with this id exists.
    #[error("unknown word id: {0}")]
    UnknownWord(String),

    /// Two words share the same id.
    #[error("duplicate word id: {0}")]
    DuplicateWord(String),

    /// A bounding box with non-positive width or height.
    #[error("invalid geometry for {id}: bbox {x1} {y1} {x2} {y2}")]
    InvalidGeometry {
        id: String,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
    },
}

/// Result type for the hocr library.
pub type Result<T> = std::result::Result<T, HocrError>;
