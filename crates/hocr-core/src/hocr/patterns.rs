//! Patterns for hOCR `title` properties.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// `bbox x1 y1 x2 y2`
    pub static ref BBOX_PATTERN: Regex = Regex::new(
        r"bbox\s+(-?\d+)\s+(-?\d+)\s+(-?\d+)\s+(-?\d+)"
    ).unwrap();

    /// `x_wconf 95` or `x_wconf 87.5`
    pub static ref WCONF_PATTERN: Regex = Regex::new(
        r"x_wconf\s+(\d+(?:\.\d+)?)"
    ).unwrap();
}

/// Class fragment marking the page element.
pub const PAGE_CLASS: &str = "ocr_page";

/// Class fragment marking a line element.
pub const LINE_CLASS: &str = "ocr_line";

/// Class fragment marking a word element.
pub const WORD_CLASS: &str = "ocrx_word";
