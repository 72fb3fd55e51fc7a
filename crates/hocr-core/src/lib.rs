//! Core library for hOCR layout reconstruction and transcript scoring.
//!
//! This crate provides:
//! - Word detection on page images (binarization, connected components, proximity grouping)
//! - hOCR encoding of page structure and decoding back into words and lines
//! - An editable, versioned word document for correction workflows
//! - Transcript accuracy metrics (character similarity, word error rate)

pub mod document;
pub mod error;
pub mod hocr;
pub mod layout;
pub mod metrics;
pub mod models;

pub use document::Document;
pub use error::{DetectionError, DocumentError, HocrError, MarkupError, Result};
pub use hocr::{parse_lines, parse_words, plain_text, DecodedLine, HocrEncoder};
pub use layout::{
    recognize_to_hocr, Binarizer, ComponentDetector, GeometryRecognizer, InkRaster,
    LayoutGrouper, Recognizer, TextSource, TranscriptOverlay,
};
pub use metrics::{calculate_accuracy, edit_script, AccuracyResult, EditOp};
pub use models::{BBox, HocrConfig, Line, Page, Word};
