//! hOCR encoder.

use std::fmt::Write;

use quick_xml::escape::escape;

use crate::models::config::MarkupConfig;
use crate::models::geometry::BBox;
use crate::models::page::{Page, RecognizedWord};
use crate::models::word::{Line, Word};

/// Per-call identifier counters, one per element kind.
struct Counters {
    page: u32,
    carea: u32,
    par: u32,
    line: u32,
    word: u32,
}

impl Counters {
    fn new() -> Self {
        Self {
            page: 1,
            carea: 1,
            par: 1,
            line: 1,
            word: 1,
        }
    }
}

fn next_id(prefix: &str, counter: &mut u32) -> String {
    let id = format!("{}_{}", prefix, counter);
    *counter += 1;
    id
}

fn title(bbox: &BBox) -> String {
    format!("bbox {} {} {} {}", bbox.x1, bbox.y1, bbox.x2, bbox.y2)
}

/// Encodes page structure as hOCR.
///
/// Identifiers (`page_N`, `carea_N`, `par_N`, `line_N`, `word_N`) are numbered
/// from 1 in document order on every call, so encoding the same structure
/// twice yields identical markup.
pub struct HocrEncoder {
    config: MarkupConfig,
}

impl HocrEncoder {
    /// Create an encoder with default settings.
    pub fn new() -> Self {
        Self {
            config: MarkupConfig::default(),
        }
    }

    /// Create an encoder from configuration.
    pub fn with_config(config: MarkupConfig) -> Self {
        Self { config }
    }

    /// Set the `ocr-system` meta value.
    pub fn with_ocr_system(mut self, system: impl Into<String>) -> Self {
        self.config.ocr_system = system.into();
        self
    }

    /// Encode a full page hierarchy: page, areas, paragraphs, lines, words.
    pub fn encode_page(&self, page: &Page) -> String {
        let mut ids = Counters::new();
        let mut out = self.preamble();

        self.open_page(&mut out, &mut ids, page.width, page.height);

        for area in &page.areas {
            if area.paragraphs.iter().all(|p| p.words.is_empty()) {
                continue;
            }
            let _ = writeln!(
                out,
                "<div class='ocr_carea' id='{}' title='{}'>",
                next_id("carea", &mut ids.carea),
                title(&area.bbox)
            );

            for paragraph in area.paragraphs.iter().filter(|p| !p.words.is_empty()) {
                let _ = writeln!(
                    out,
                    "<p class='ocr_par' id='{}' title='{}'>",
                    next_id("par", &mut ids.par),
                    title(&paragraph.bbox)
                );

                for line in paragraph.lines() {
                    let entries: Vec<(&str, &BBox, Option<f64>)> = line
                        .iter()
                        .map(|w: &RecognizedWord| (w.text.as_str(), &w.bbox, w.confidence))
                        .collect();
                    self.write_line(&mut out, &mut ids, &entries);
                }

                out.push_str("</p>\n");
            }

            out.push_str("</div>\n");
        }

        self.close_page(&mut out);
        out
    }

    /// Encode a flat list of lines placed directly inside the page element.
    pub fn encode_lines(&self, lines: &[Line], width: u32, height: u32) -> String {
        let mut ids = Counters::new();
        let mut out = self.preamble();

        self.open_page(&mut out, &mut ids, width, height);

        for line in lines.iter().filter(|l| !l.words.is_empty()) {
            let entries: Vec<(&str, &BBox, Option<f64>)> = line
                .words
                .iter()
                .map(|w: &Word| (w.text.as_str(), &w.bbox, w.confidence))
                .collect();
            self.write_line(&mut out, &mut ids, &entries);
        }

        self.close_page(&mut out);
        out
    }

    fn write_line(&self, out: &mut String, ids: &mut Counters, words: &[(&str, &BBox, Option<f64>)]) {
        let bbox = BBox::union_all(words.iter().map(|(_, b, _)| *b)).unwrap_or_default();
        let _ = write!(
            out,
            "<span class='ocr_line' id='{}' title='{}'>",
            next_id("line", &mut ids.line),
            title(&bbox)
        );

        for (i, (text, bbox, confidence)) in words.iter().enumerate() {
            let confidence = confidence
                .unwrap_or(self.config.default_confidence)
                .clamp(0.0, 100.0);
            let _ = write!(
                out,
                "<span class='ocrx_word' id='{}' title='{}; x_wconf {:.0}'>{}</span>",
                next_id("word", &mut ids.word),
                title(bbox),
                confidence,
                escape(*text)
            );
            if i + 1 < words.len() {
                out.push(' ');
            }
        }

        out.push_str("</span>\n");
    }

    fn preamble(&self) -> String {
        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        out.push_str("<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Transitional//EN\"\n");
        out.push_str("    \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd\">\n");
        out.push_str("<html xmlns=\"http://www.w3.org/1999/xhtml\" xml:lang=\"en\" lang=\"en\">\n");
        out.push_str("<head>\n");
        out.push_str("<title></title>\n");
        out.push_str("<meta http-equiv=\"Content-Type\" content=\"text/html; charset=utf-8\" />\n");
        let _ = writeln!(
            out,
            "<meta name='ocr-system' content='{}' />",
            escape(self.config.ocr_system.as_str())
        );
        out.push_str(
            "<meta name='ocr-capabilities' content='ocr_page ocr_carea ocr_par ocr_line ocrx_word' />\n",
        );
        out.push_str("</head>\n");
        out.push_str("<body>\n");
        out
    }

    fn open_page(&self, out: &mut String, ids: &mut Counters, width: u32, height: u32) {
        let _ = writeln!(
            out,
            "<div class='ocr_page' id='{}' title='bbox 0 0 {} {}'>",
            next_id("page", &mut ids.page),
            width,
            height
        );
    }

    fn close_page(&self, out: &mut String) {
        out.push_str("</div>\n");
        out.push_str("</body>\n");
        out.push_str("</html>\n");
    }
}

impl Default for HocrEncoder {
    fn default() -> Self {
        Self::new()
    }
}
