//! Recognizer-shaped page structure consumed by the hOCR encoder.
//!
//! A page holds text areas, areas hold paragraphs, paragraphs hold words.
//! Lines are implicit: a word whose `break_after` ends a line closes it.

use serde::{Deserialize, Serialize};

use super::geometry::BBox;

/// Break following a recognized word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakKind {
    /// Ordinary inter-word space.
    Space,
    /// Hard line break.
    LineBreak,
    /// Line wrap at the end of a line.
    EndOfLine,
}

impl BreakKind {
    /// Check whether this break closes the current line.
    pub fn ends_line(&self) -> bool {
        matches!(self, BreakKind::LineBreak | BreakKind::EndOfLine)
    }
}

/// A word as produced by a recognizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedWord {
    /// Word text (placeholder when only geometry is known).
    pub text: String,
    /// Word bounding box.
    pub bbox: BBox,
    /// Confidence in percent (0 - 100).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Break after this word.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_after: Option<BreakKind>,
}

impl RecognizedWord {
    /// Create a word with no confidence and a plain space after it.
    pub fn new(text: impl Into<String>, bbox: BBox) -> Self {
        Self {
            text: text.into(),
            bbox,
            confidence: None,
            break_after: Some(BreakKind::Space),
        }
    }

    /// Set confidence.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Set the break following the word.
    pub fn with_break(mut self, kind: BreakKind) -> Self {
        self.break_after = Some(kind);
        self
    }

    /// Check whether this word is the last one on its line.
    pub fn ends_line(&self) -> bool {
        self.break_after.is_some_and(|b| b.ends_line())
    }
}

/// A paragraph of recognized words.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Union of the words' boxes.
    pub bbox: BBox,
    /// Words in document order.
    pub words: Vec<RecognizedWord>,
}

impl Paragraph {
    /// Build a paragraph, deriving its box from the words.
    pub fn from_words(words: Vec<RecognizedWord>) -> Self {
        let bbox = BBox::union_all(words.iter().map(|w| &w.bbox)).unwrap_or_default();
        Self { bbox, words }
    }

    /// Split the words into lines at line-ending breaks.
    pub fn lines(&self) -> Vec<&[RecognizedWord]> {
        let mut lines = Vec::new();
        let mut start = 0;

        for (i, word) in self.words.iter().enumerate() {
            if word.ends_line() || i == self.words.len() - 1 {
                lines.push(&self.words[start..=i]);
                start = i + 1;
            }
        }

        lines
    }
}

/// A block of text paragraphs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    /// Area bounding box.
    pub bbox: BBox,
    /// Paragraphs in document order.
    pub paragraphs: Vec<Paragraph>,
}

/// A recognized page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page width in pixels.
    pub width: u32,
    /// Page height in pixels.
    pub height: u32,
    /// Text areas.
    pub areas: Vec<Area>,
}

impl Page {
    /// Create an empty page.
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            areas: Vec::new(),
        }
    }

    /// Full-page box.
    pub fn bbox(&self) -> BBox {
        BBox::new(0, 0, self.width as i32, self.height as i32)
    }

    /// Iterate all words in document order.
    pub fn words(&self) -> impl Iterator<Item = &RecognizedWord> {
        self.areas
            .iter()
            .flat_map(|a| a.paragraphs.iter())
            .flat_map(|p| p.words.iter())
    }

    /// Iterate all words mutably in document order.
    pub fn words_mut(&mut self) -> impl Iterator<Item = &mut RecognizedWord> {
        self.areas
            .iter_mut()
            .flat_map(|a| a.paragraphs.iter_mut())
            .flat_map(|p| p.words.iter_mut())
    }

    /// Total number of words.
    pub fn word_count(&self) -> usize {
        self.words().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, x: i32, brk: BreakKind) -> RecognizedWord {
        RecognizedWord::new(text, BBox::new(x, 0, x + 10, 10)).with_break(brk)
    }

    #[test]
    fn test_paragraph_lines_split_on_breaks() {
        let para = Paragraph::from_words(vec![
            word("a", 0, BreakKind::Space),
            word("b", 20, BreakKind::LineBreak),
            word("c", 0, BreakKind::Space),
            word("d", 20, BreakKind::EndOfLine),
            word("e", 0, BreakKind::Space),
        ]);

        let lines = para.lines();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].len(), 2);
        assert_eq!(lines[1][0].text, "c");
        assert_eq!(lines[2][0].text, "e");
        assert_eq!(para.bbox, BBox::new(0, 0, 30, 10));
    }

    #[test]
    fn test_empty_paragraph_has_no_lines() {
        let para = Paragraph::from_words(Vec::new());
        assert!(para.lines().is_empty());
        assert_eq!(para.bbox, BBox::default());
    }
}
