//! Layout reconstruction without a recognition model.
//!
//! Binarize a page image, flood-fill connected ink regions, then group them
//! into words, lines and paragraphs by proximity.

mod binarize;
mod detector;
mod grouper;
mod recognizer;

pub use binarize::{Binarizer, InkRaster};
pub use detector::ComponentDetector;
pub use grouper::{HasBBox, LayoutGrouper};
pub use recognizer::{
    recognize_to_hocr, GeometryRecognizer, Recognizer, TextSource, TranscriptOverlay,
};
