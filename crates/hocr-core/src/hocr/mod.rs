//! hOCR markup: encoding page structure and decoding it back into words.

mod decoder;
mod encoder;
pub mod patterns;

pub use decoder::{
    parse_bbox, parse_confidence, parse_lines, parse_page, parse_words, plain_text, DecodedLine,
    DecodedPage,
};
pub use encoder::HocrEncoder;
