//! hOCR decoder.
//!
//! Markup is read into a small generic element tree, then walked depth-first.
//! Only the `class`, `id` and `title` attributes carry meaning; everything else
//! (areas, paragraphs, unknown elements) is traversed and otherwise ignored.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::MarkupError;
use crate::models::geometry::BBox;
use crate::models::word::Word;

use super::patterns::{BBOX_PATTERN, LINE_CLASS, PAGE_CLASS, WCONF_PATTERN, WORD_CLASS};

/// A line as it appears in the markup, with the box from its own `title`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedLine {
    pub id: String,
    pub bbox: BBox,
    pub words: Vec<Word>,
}

/// Page box (from the first `ocr_page` element, if any) and all words.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedPage {
    pub bbox: Option<BBox>,
    pub words: Vec<Word>,
}

#[derive(Debug)]
enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug)]
struct Element {
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn has_class(&self, class: &str) -> bool {
        self.attr("class").is_some_and(|c| c.contains(class))
    }

    fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// All descendant text in document order.
    fn text_content(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(e) => e.text_content(out),
            }
        }
    }
}

fn malformed(position: u64, reason: impl ToString) -> MarkupError {
    MarkupError::Malformed {
        position,
        reason: reason.to_string(),
    }
}

fn element_from(start: &BytesStart, position: u64) -> Result<Element, MarkupError> {
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| malformed(position, e))?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| malformed(position, e))?
            .into_owned();
        attributes.push((key, value));
    }

    Ok(Element {
        attributes,
        children: Vec::new(),
    })
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
    position: u64,
) -> Result<(), MarkupError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => return Err(malformed(position, "multiple root elements")),
    }
    Ok(())
}

fn parse_tree(markup: &str) -> Result<Element, MarkupError> {
    let mut reader = Reader::from_str(markup);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let position = reader.buffer_position() as u64;
        let event = reader
            .read_event()
            .map_err(|e| malformed(reader.buffer_position() as u64, e))?;

        match event {
            Event::Start(start) => stack.push(element_from(&start, position)?),
            Event::Empty(start) => {
                let element = element_from(&start, position)?;
                attach(&mut stack, &mut root, element, position)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| malformed(position, "unexpected closing tag"))?;
                attach(&mut stack, &mut root, element, position)?;
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|e| malformed(position, e))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(Node::Text(text.into_owned())),
                    None if text.trim().is_empty() => {}
                    None => return Err(malformed(position, "text outside the root element")),
                }
            }
            Event::CData(data) => {
                let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(Node::Text(text));
                }
            }
            Event::Eof => break,
            // Declarations, doctype, comments, processing instructions.
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(malformed(
            markup.len() as u64,
            format!("{} unclosed element(s) at end of input", stack.len()),
        ));
    }

    root.ok_or(MarkupError::NoRoot)
}

/// Extract the bounding box from an hOCR `title` value.
///
/// Values that do not fit an `i32` are treated as absent.
pub fn parse_bbox(title: &str) -> Option<BBox> {
    let caps = BBOX_PATTERN.captures(title)?;
    let coord = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<i32>().ok());

    match (coord(1), coord(2), coord(3), coord(4)) {
        (Some(x1), Some(y1), Some(x2), Some(y2)) => Some(BBox::new(x1, y1, x2, y2)),
        _ => {
            trace!("Ignoring out-of-range bbox in title {:?}", title);
            None
        }
    }
}

/// Extract the word confidence from an hOCR `title` value, clamped to 0..=100.
pub fn parse_confidence(title: &str) -> Option<f64> {
    WCONF_PATTERN
        .captures(title)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map(|c| c.clamp(0.0, 100.0))
}

fn word_from(element: &Element, line_id: &str) -> Option<Word> {
    let id = element.attr("id").filter(|id| !id.is_empty())?;
    let title = element.attr("title").unwrap_or_default();

    let mut text = String::new();
    element.text_content(&mut text);

    Some(Word {
        id: id.to_string(),
        text: text.trim().to_string(),
        bbox: parse_bbox(title).unwrap_or_default(),
        confidence: parse_confidence(title),
        line_id: line_id.to_string(),
    })
}

fn collect_words(element: &Element, line_id: &str, words: &mut Vec<Word>) {
    let line_id = match element.attr("id") {
        Some(id) if element.has_class(LINE_CLASS) => id,
        _ => line_id,
    };

    if element.has_class(WORD_CLASS) {
        match word_from(element, line_id) {
            Some(word) => words.push(word),
            None => trace!("Skipping word element without id"),
        }
    }

    for child in element.elements() {
        collect_words(child, line_id, words);
    }
}

fn collect_lines(element: &Element, lines: &mut Vec<DecodedLine>) {
    if element.has_class(LINE_CLASS) {
        if let Some(id) = element.attr("id").filter(|id| !id.is_empty()) {
            let mut words = Vec::new();
            collect_words(element, id, &mut words);
            lines.push(DecodedLine {
                id: id.to_string(),
                bbox: element
                    .attr("title")
                    .and_then(parse_bbox)
                    .unwrap_or_default(),
                words,
            });
            return;
        }
    }

    for child in element.elements() {
        collect_lines(child, lines);
    }
}

fn find_page(element: &Element) -> Option<&Element> {
    if element.has_class(PAGE_CLASS) {
        return Some(element);
    }
    element.elements().find_map(find_page)
}

/// Decode hOCR markup into the page box and its words.
pub fn parse_page(markup: &str) -> Result<DecodedPage, MarkupError> {
    let root = parse_tree(markup)?;

    let bbox = find_page(&root)
        .and_then(|page| page.attr("title"))
        .and_then(parse_bbox);

    let mut words = Vec::new();
    collect_words(&root, "", &mut words);

    debug!("Decoded {} words", words.len());
    Ok(DecodedPage { bbox, words })
}

/// Decode hOCR markup into a flat, line-annotated word list in document order.
pub fn parse_words(markup: &str) -> Result<Vec<Word>, MarkupError> {
    parse_page(markup).map(|page| page.words)
}

/// Decode hOCR markup into lines, each with its own words.
///
/// Words outside any line element do not appear in this view.
pub fn parse_lines(markup: &str) -> Result<Vec<DecodedLine>, MarkupError> {
    let root = parse_tree(markup)?;

    let mut lines = Vec::new();
    collect_lines(&root, &mut lines);

    debug!("Decoded {} lines", lines.len());
    Ok(lines)
}

/// Plain text of a word list: spaces within a line, newlines between lines.
pub fn plain_text(words: &[Word]) -> String {
    let mut out = String::new();
    let mut previous: Option<&str> = None;

    for word in words {
        match previous {
            Some(line) if line == word.line_id => out.push(' '),
            Some(_) => out.push('\n'),
            None => {}
        }
        out.push_str(&word.text);
        previous = Some(&word.line_id);
    }

    out
}
