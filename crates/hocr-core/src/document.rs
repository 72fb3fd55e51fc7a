//! Editable hOCR document.
//!
//! A [`Document`] is an owned, versioned word list. Every mutation consumes the
//! document and returns the next version, with words re-sorted into reading
//! order. Lines are derived from the words' `line_id` on demand.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DocumentError, Result};
use crate::hocr::{parse_page, HocrEncoder};
use crate::models::config::DocumentConfig;
use crate::models::geometry::BBox;
use crate::models::page::Page;
use crate::models::word::{sort_reading_order, Line, Word};

/// A versioned, editable set of words on one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    version: u64,
    width: u32,
    height: u32,
    words: Vec<Word>,
    #[serde(default = "default_tolerance")]
    tolerance: i32,
}

fn default_tolerance() -> i32 {
    DocumentConfig::default().reading_order_tolerance
}

fn check_geometry(id: &str, bbox: &BBox) -> std::result::Result<(), DocumentError> {
    if bbox.is_valid() {
        Ok(())
    } else {
        Err(DocumentError::InvalidGeometry {
            id: id.to_string(),
            x1: bbox.x1,
            y1: bbox.y1,
            x2: bbox.x2,
            y2: bbox.y2,
        })
    }
}

fn check_unique(words: &[Word]) -> std::result::Result<(), DocumentError> {
    let mut seen = HashSet::new();
    for word in words {
        if !seen.insert(word.id.as_str()) {
            return Err(DocumentError::DuplicateWord(word.id.clone()));
        }
    }
    Ok(())
}

/// Largest `N` among ids of the form `{prefix}_N`.
fn max_suffix<'a>(ids: impl Iterator<Item = &'a str>, prefix: &str) -> u64 {
    ids.filter_map(|id| id.strip_prefix(prefix)?.strip_prefix('_')?.parse::<u64>().ok())
        .max()
        .unwrap_or(0)
}

fn center(bbox: &BBox) -> i64 {
    i64::from(bbox.y1) + i64::from(bbox.y2)
}

impl Document {
    /// Create a document from words, validating ids and sorting into reading order.
    pub fn new(width: u32, height: u32, words: Vec<Word>) -> Result<Self> {
        check_unique(&words)?;

        let mut doc = Self {
            version: 0,
            width,
            height,
            words,
            tolerance: default_tolerance(),
        };
        doc.sort();
        Ok(doc)
    }

    /// Decode a document from hOCR markup.
    ///
    /// The page size comes from the `ocr_page` box, or from the extent of
    /// the words when the markup has none.
    pub fn from_markup(markup: &str) -> Result<Self> {
        let page = parse_page(markup)?;

        let (width, height) = match page.bbox {
            Some(bbox) => (bbox.x2.max(0) as u32, bbox.y2.max(0) as u32),
            None => (
                page.words.iter().map(|w| w.bbox.x2.max(0) as u32).max().unwrap_or(0),
                page.words.iter().map(|w| w.bbox.y2.max(0) as u32).max().unwrap_or(0),
            ),
        };

        Self::new(width, height, page.words)
    }

    /// Build a document from recognized page structure.
    ///
    /// Word and line ids are the ones `encoder` assigns.
    pub fn from_page(page: &Page, encoder: &HocrEncoder) -> Result<Self> {
        Self::from_markup(&encoder.encode_page(page))
    }

    /// Set the reading order row tolerance (pixels) and re-sort.
    pub fn with_config(mut self, config: &DocumentConfig) -> Self {
        self.tolerance = config.reading_order_tolerance;
        self.sort();
        self
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Words in reading order.
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Look up a word by id.
    pub fn word(&self, id: &str) -> Option<&Word> {
        self.words.iter().find(|w| w.id == id)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Change a word's text and, optionally, its box.
    pub fn edit_word(mut self, id: &str, text: impl Into<String>, bbox: Option<BBox>) -> Result<Self> {
        if let Some(bbox) = &bbox {
            check_geometry(id, bbox)?;
        }

        let word = self
            .words
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| DocumentError::UnknownWord(id.to_string()))?;

        word.text = text.into();
        if let Some(bbox) = bbox {
            word.bbox = bbox;
        }

        Ok(self.bump())
    }

    /// Remove a word.
    pub fn delete_word(mut self, id: &str) -> Result<Self> {
        let index = self
            .words
            .iter()
            .position(|w| w.id == id)
            .ok_or_else(|| DocumentError::UnknownWord(id.to_string()))?;

        self.words.remove(index);
        Ok(self.bump())
    }

    /// Add a word, returning the new document and the minted word id.
    ///
    /// The word joins the line whose vertical extent overlaps its box with the
    /// closest centre; failing that, the line with the closest centre; and on
    /// an empty document, a new line.
    pub fn insert_word(
        mut self,
        text: impl Into<String>,
        bbox: BBox,
        confidence: Option<f64>,
    ) -> Result<(Self, String)> {
        let id = format!(
            "word_{}",
            max_suffix(self.words.iter().map(|w| w.id.as_str()), "word") + 1
        );
        check_geometry(&id, &bbox)?;

        let line_id = self.nearest_line(&bbox).unwrap_or_else(|| {
            format!(
                "line_{}",
                max_suffix(self.words.iter().map(|w| w.line_id.as_str()), "line") + 1
            )
        });

        debug!("Inserting {} into {}", id, line_id);

        let mut word = Word::new(id.clone(), text, bbox, line_id);
        word.confidence = confidence.map(|c| c.clamp(0.0, 100.0));
        self.words.push(word);

        Ok((self.bump(), id))
    }

    /// Replace every word at once, as sent back by the correction UI.
    pub fn replace_words(mut self, words: Vec<Word>) -> Result<Self> {
        check_unique(&words)?;
        for word in &words {
            check_geometry(&word.id, &word.bbox)?;
        }

        self.words = words;
        Ok(self.bump())
    }

    /// Lines derived from the words, in order of first appearance.
    pub fn lines(&self) -> Vec<Line> {
        let mut groups: Vec<(&str, Vec<Word>)> = Vec::new();

        for word in &self.words {
            match groups.iter_mut().find(|(id, _)| *id == word.line_id) {
                Some((_, words)) => words.push(word.clone()),
                None => groups.push((&word.line_id, vec![word.clone()])),
            }
        }

        groups
            .into_iter()
            .map(|(id, words)| Line::from_words(id, words))
            .collect()
    }

    /// Encode the document as hOCR.
    pub fn to_markup(&self, encoder: &HocrEncoder) -> String {
        encoder.encode_lines(&self.lines(), self.width, self.height)
    }

    /// Text of the document, one line per row.
    pub fn plain_text(&self) -> String {
        self.lines()
            .iter()
            .map(Line::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn nearest_line(&self, bbox: &BBox) -> Option<String> {
        let lines = self.lines();
        let target = center(bbox);
        let distance = |line: &&Line| (center(&line.bbox) - target).abs();

        lines
            .iter()
            .filter(|line| line.bbox.overlaps_vertically(bbox, 0))
            .min_by_key(distance)
            .or_else(|| lines.iter().min_by_key(distance))
            .map(|line| line.id.clone())
    }

    fn sort(&mut self) {
        sort_reading_order(&mut self.words, self.tolerance);
    }

    fn bump(mut self) -> Self {
        self.sort();
        self.version += 1;
        self
    }
}
