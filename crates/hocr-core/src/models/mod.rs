//! Data models shared across the pipeline.

pub mod config;
pub mod geometry;
pub mod page;
pub mod word;

pub use config::HocrConfig;
pub use geometry::{BBox, PixelRegion};
pub use page::{Area, BreakKind, Page, Paragraph, RecognizedWord};
pub use word::{sort_reading_order, Line, Word};
