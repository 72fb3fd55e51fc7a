//! Proximity grouping: components into words, words into lines, lines into paragraphs.

use tracing::{debug, trace};

use crate::models::config::GroupingConfig;
use crate::models::geometry::{BBox, PixelRegion};
use crate::models::page::{Area, BreakKind, Page, Paragraph, RecognizedWord};
use crate::models::word::Word;

/// Anything placed on the page by a bounding box.
pub trait HasBBox {
    fn bbox(&self) -> BBox;
}

impl HasBBox for BBox {
    fn bbox(&self) -> BBox {
        *self
    }
}

impl HasBBox for Word {
    fn bbox(&self) -> BBox {
        self.bbox
    }
}

impl HasBBox for RecognizedWord {
    fn bbox(&self) -> BBox {
        self.bbox
    }
}

/// Groups detected components into words, lines and paragraphs.
pub struct LayoutGrouper {
    config: GroupingConfig,
}

impl LayoutGrouper {
    /// Create a grouper with default thresholds.
    pub fn new() -> Self {
        Self {
            config: GroupingConfig::default(),
        }
    }

    /// Create a grouper from configuration.
    pub fn with_config(config: GroupingConfig) -> Self {
        Self { config }
    }

    /// Merge components into word boxes with a single sweep in (y, x) order.
    ///
    /// A component joins the current word when it sits within half the
    /// word's average height vertically, its gap to the previous component
    /// is at most `word_gap_factor` average heights and its own height is
    /// within one average height of the average.
    pub fn group_components_into_words(&self, components: &[PixelRegion]) -> Vec<BBox> {
        let mut sorted: Vec<PixelRegion> = components
            .iter()
            .filter(|c| {
                if c.is_degenerate() {
                    trace!("Skipping degenerate component {:?}", c);
                }
                !c.is_degenerate()
            })
            .copied()
            .collect();

        sorted.sort_by(|a, b| a.y.cmp(&b.y).then(a.x.cmp(&b.x)));

        let mut words = Vec::new();
        let mut current: Vec<PixelRegion> = Vec::new();

        for component in sorted {
            let Some(last) = current.last().copied() else {
                current.push(component);
                continue;
            };

            let avg_height =
                current.iter().map(|c| c.height).sum::<i32>() / current.len() as i32;

            let y_diff = (component.y - last.y).abs();
            let x_gap = component.x - last.right();
            let height_diff = (component.height - avg_height).abs();

            if y_diff <= avg_height / 2
                && x_gap <= avg_height * self.config.word_gap_factor
                && height_diff <= avg_height
            {
                current.push(component);
            } else {
                words.extend(PixelRegion::merge(&current).map(BBox::from));
                current = vec![component];
            }
        }

        words.extend(PixelRegion::merge(&current).map(BBox::from));

        debug!(
            "Grouped {} components into {} words",
            components.len(),
            words.len()
        );

        words
    }

    /// Group items into lines by vertical overlap, each line ordered by x.
    ///
    /// An item joins the first line whose accumulated vertical extent overlaps
    /// its own, widened by half the item's height.
    pub fn group_words_into_lines<T: HasBBox + Clone>(&self, words: &[T]) -> Vec<Vec<T>> {
        let mut sorted: Vec<T> = words
            .iter()
            .filter(|w| w.bbox().is_valid())
            .cloned()
            .collect();

        sorted.sort_by(|a, b| {
            let (a, b) = (a.bbox(), b.bbox());
            a.y1.cmp(&b.y1).then(a.x1.cmp(&b.x1))
        });

        // Accumulated vertical extent (top, bottom) of each line.
        let mut extents: Vec<(i32, i32)> = Vec::new();
        let mut lines: Vec<Vec<T>> = Vec::new();

        for word in sorted {
            let bbox = word.bbox();
            let tolerance = bbox.height() / 2;

            let found = extents.iter().position(|&(top, bottom)| {
                bbox.y2 >= top - tolerance && bbox.y1 <= bottom + tolerance
            });

            match found {
                Some(i) => {
                    extents[i] = (extents[i].0.min(bbox.y1), extents[i].1.max(bbox.y2));
                    lines[i].push(word);
                }
                None => {
                    extents.push((bbox.y1, bbox.y2));
                    lines.push(vec![word]);
                }
            }
        }

        for line in &mut lines {
            line.sort_by_key(|w| w.bbox().x1);
        }

        debug!("Grouped {} words into {} lines", words.len(), lines.len());

        lines
    }

    /// Split a sequence of lines into paragraphs at large vertical gaps.
    ///
    /// A new paragraph starts when the gap between the previous line's bottom
    /// and the current line's top exceeds `paragraph_gap_factor` times the
    /// current line's height (its tallest item).
    pub fn group_lines_into_paragraphs<T: HasBBox>(&self, lines: Vec<Vec<T>>) -> Vec<Vec<Vec<T>>> {
        let mut paragraphs: Vec<Vec<Vec<T>>> = Vec::new();
        let mut current: Vec<Vec<T>> = Vec::new();

        for line in lines.into_iter().filter(|l| !l.is_empty()) {
            let Some(previous) = current.last() else {
                current.push(line);
                continue;
            };

            let previous_bottom = previous.iter().map(|w| w.bbox().y2).max().unwrap_or(0);
            let top = line.iter().map(|w| w.bbox().y1).min().unwrap_or(0);
            let line_height = line.iter().map(|w| w.bbox().height()).max().unwrap_or(0);

            if top - previous_bottom > line_height * self.config.paragraph_gap_factor {
                paragraphs.push(std::mem::take(&mut current));
            }
            current.push(line);
        }

        if !current.is_empty() {
            paragraphs.push(current);
        }

        debug!("Grouped lines into {} paragraphs", paragraphs.len());

        paragraphs
    }

    /// Run all grouping stages and build a page with placeholder word text.
    ///
    /// Words are named `word_N` in the order they were merged, the last word of
    /// every line carries a line break, and all paragraphs sit in one
    /// full-page text area.
    pub fn build_page(&self, components: &[PixelRegion], width: u32, height: u32) -> Page {
        let boxes = self.group_components_into_words(components);

        let words: Vec<RecognizedWord> = boxes
            .iter()
            .enumerate()
            .map(|(i, bbox)| RecognizedWord::new(format!("word_{}", i + 1), *bbox))
            .collect();

        let lines = self.group_words_into_lines(&words);
        let paragraphs: Vec<Paragraph> = self
            .group_lines_into_paragraphs(lines)
            .into_iter()
            .map(|lines| {
                let words = lines
                    .into_iter()
                    .flat_map(|mut line| {
                        if let Some(last) = line.last_mut() {
                            last.break_after = Some(BreakKind::LineBreak);
                        }
                        line
                    })
                    .collect();
                Paragraph::from_words(words)
            })
            .collect();

        let mut page = Page::empty(width, height);
        if !paragraphs.is_empty() {
            page.areas.push(Area {
                bbox: page.bbox(),
                paragraphs,
            });
        }

        page
    }
}

impl Default for LayoutGrouper {
    fn default() -> Self {
        Self::new()
    }
}
