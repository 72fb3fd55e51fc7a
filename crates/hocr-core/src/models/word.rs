//! Word and line records exchanged with the correction UI.

use serde::{Deserialize, Serialize};

use super::geometry::BBox;

/// A word in an hOCR document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// Identifier, unique within a document (e.g. `word_12`).
    pub id: String,
    /// Word text.
    pub text: String,
    /// Bounding box.
    pub bbox: BBox,
    /// Confidence in percent (0 - 100), unset when the markup carries none.
    #[serde(default)]
    pub confidence: Option<f64>,
    /// Id of the line containing this word.
    #[serde(default)]
    pub line_id: String,
}

impl Word {
    /// Create a word.
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        bbox: BBox,
        line_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            bbox,
            confidence: None,
            line_id: line_id.into(),
        }
    }

    /// Set confidence.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

/// A line of words. Its box is always derived from the words.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Line identifier (e.g. `line_3`).
    pub id: String,
    /// Union of the words' boxes.
    pub bbox: BBox,
    /// Words ordered left to right.
    pub words: Vec<Word>,
}

impl Line {
    /// Build a line, ordering words by `x1` and deriving the box.
    pub fn from_words(id: impl Into<String>, mut words: Vec<Word>) -> Self {
        words.sort_by_key(|w| w.bbox.x1);
        let bbox = BBox::union_all(words.iter().map(|w| &w.bbox)).unwrap_or_default();

        Self {
            id: id.into(),
            bbox,
            words,
        }
    }

    /// Line text, words joined by single spaces.
    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Sort words in reading order: top-to-bottom rows, left-to-right within a row.
///
/// Words whose top edge lies within `tolerance` pixels of the first word of the
/// current row belong to that row.
pub fn sort_reading_order(words: &mut Vec<Word>, tolerance: i32) {
    words.sort_by(|a, b| {
        a.bbox
            .y1
            .cmp(&b.bbox.y1)
            .then(a.bbox.x1.cmp(&b.bbox.x1))
    });

    let mut rows: Vec<Vec<Word>> = Vec::new();
    let mut row_top = i32::MIN;

    for word in words.drain(..) {
        match rows.last_mut() {
            Some(row) if word.bbox.y1 - row_top <= tolerance => row.push(word),
            _ => {
                row_top = word.bbox.y1;
                rows.push(vec![word]);
            }
        }
    }

    for mut row in rows {
        row.sort_by_key(|w| w.bbox.x1);
        words.extend(row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(id: &str, x1: i32, y1: i32) -> Word {
        Word::new(id, id, BBox::new(x1, y1, x1 + 20, y1 + 15), "line_1")
    }

    #[test]
    fn test_line_orders_words_and_covers_boxes() {
        let line = Line::from_words(
            "line_1",
            vec![word("b", 50, 12), word("a", 10, 10), word("c", 90, 8)],
        );

        let ids: Vec<&str> = line.words.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(line.bbox, BBox::new(10, 8, 110, 27));
        assert_eq!(line.text(), "a b c");
    }

    #[test]
    fn test_reading_order_uses_tolerance_band() {
        let mut words = vec![
            word("second_row", 5, 60),
            word("right", 100, 10),
            word("left", 10, 17),
            word("middle", 50, 12),
        ];

        sort_reading_order(&mut words, 10);

        let ids: Vec<&str> = words.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["left", "middle", "right", "second_row"]);
    }

    #[test]
    fn test_reading_order_separates_rows_beyond_tolerance() {
        let mut words = vec![word("low", 0, 25), word("high", 100, 10)];
        sort_reading_order(&mut words, 10);
        assert_eq!(words[0].id, "high");
        assert_eq!(words[1].id, "low");
    }
}
