//! WASM bindings for hOCR decoding, editing and transcript scoring.
//!
//! This crate provides WebAssembly bindings for the browser correction UI.

use wasm_bindgen::prelude::*;

use hocr_core::models::BBox;
use hocr_core::{Document, GeometryRecognizer, HocrEncoder, Recognizer, Word};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js<E: std::fmt::Display>(e: E) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Decode hOCR markup into a word list.
#[wasm_bindgen]
pub fn parse_hocr(markup: &str) -> Result<JsValue, JsValue> {
    let words = hocr_core::parse_words(markup).map_err(to_js)?;
    serde_wasm_bindgen::to_value(&words).map_err(to_js)
}

/// Decode hOCR markup into lines of words.
#[wasm_bindgen]
pub fn parse_hocr_lines(markup: &str) -> Result<JsValue, JsValue> {
    let lines = hocr_core::parse_lines(markup).map_err(to_js)?;
    serde_wasm_bindgen::to_value(&lines).map_err(to_js)
}

/// Plain text of hOCR markup, one line per hOCR line.
#[wasm_bindgen]
pub fn hocr_to_text(markup: &str) -> Result<String, JsValue> {
    let words = hocr_core::parse_words(markup).map_err(to_js)?;
    Ok(hocr_core::plain_text(&words))
}

/// Compare a transcript against the original text.
#[wasm_bindgen]
pub fn calculate_accuracy(original: &str, transcribed: &str) -> Result<JsValue, JsValue> {
    let result = hocr_core::calculate_accuracy(original, transcribed);
    serde_wasm_bindgen::to_value(&result).map_err(to_js)
}

/// Word-level edits turning the original into the transcript.
#[wasm_bindgen]
pub fn edit_script(original: &str, transcribed: &str) -> Result<JsValue, JsValue> {
    let ops = hocr_core::edit_script(original, transcribed);
    serde_wasm_bindgen::to_value(&ops).map_err(to_js)
}

/// Detect word boxes in an encoded image (PNG, JPEG, ...) and return hOCR.
#[wasm_bindgen]
pub fn detect_words(image_bytes: &[u8]) -> Result<String, JsValue> {
    let image = image::load_from_memory(image_bytes).map_err(to_js)?;
    let page = GeometryRecognizer::new().recognize(&image).map_err(to_js)?;
    Ok(HocrEncoder::new().encode_page(&page))
}

/// Editable hOCR document for the correction UI.
///
/// Failed edits leave the document unchanged.
#[wasm_bindgen]
pub struct HocrDocument {
    doc: Document,
    encoder: HocrEncoder,
}

#[wasm_bindgen]
impl HocrDocument {
    /// Load a document from hOCR markup.
    #[wasm_bindgen(constructor)]
    pub fn new(markup: &str) -> Result<HocrDocument, JsValue> {
        Ok(Self {
            doc: Document::from_markup(markup).map_err(to_js)?,
            encoder: HocrEncoder::new(),
        })
    }

    /// Number of edits applied since loading.
    #[wasm_bindgen(getter)]
    pub fn version(&self) -> u64 {
        self.doc.version()
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.doc.width()
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.doc.height()
    }

    /// Words in reading order.
    #[wasm_bindgen]
    pub fn words(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.doc.words()).map_err(to_js)
    }

    /// Lines with their derived boxes.
    #[wasm_bindgen]
    pub fn lines(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.doc.lines()).map_err(to_js)
    }

    /// Change a word's text.
    #[wasm_bindgen]
    pub fn edit_word(&mut self, id: &str, text: &str) -> Result<(), JsValue> {
        self.doc = self.doc.clone().edit_word(id, text, None).map_err(to_js)?;
        Ok(())
    }

    /// Change a word's text and box.
    #[wasm_bindgen]
    pub fn move_word(
        &mut self,
        id: &str,
        text: &str,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
    ) -> Result<(), JsValue> {
        let bbox = BBox::new(x1, y1, x2, y2);
        self.doc = self
            .doc
            .clone()
            .edit_word(id, text, Some(bbox))
            .map_err(to_js)?;
        Ok(())
    }

    /// Remove a word.
    #[wasm_bindgen]
    pub fn delete_word(&mut self, id: &str) -> Result<(), JsValue> {
        self.doc = self.doc.clone().delete_word(id).map_err(to_js)?;
        Ok(())
    }

    /// Add a word and return its id.
    #[wasm_bindgen]
    pub fn insert_word(
        &mut self,
        text: &str,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        confidence: Option<f64>,
    ) -> Result<String, JsValue> {
        let (doc, id) = self
            .doc
            .clone()
            .insert_word(text, BBox::new(x1, y1, x2, y2), confidence)
            .map_err(to_js)?;
        self.doc = doc;
        Ok(id)
    }

    /// Replace all words with a list sent back by the UI.
    #[wasm_bindgen]
    pub fn replace_words(&mut self, words: JsValue) -> Result<(), JsValue> {
        let words: Vec<Word> = serde_wasm_bindgen::from_value(words).map_err(to_js)?;
        self.doc = self.doc.clone().replace_words(words).map_err(to_js)?;
        Ok(())
    }

    /// Replace all words from a JSON array.
    #[wasm_bindgen]
    pub fn replace_words_json(&mut self, json: &str) -> Result<(), JsValue> {
        let words: Vec<Word> = serde_json::from_str(json).map_err(to_js)?;
        self.doc = self.doc.clone().replace_words(words).map_err(to_js)?;
        Ok(())
    }

    /// Words as a JSON array.
    #[wasm_bindgen]
    pub fn to_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.doc.words()).map_err(to_js)
    }

    /// Encode the document as hOCR.
    #[wasm_bindgen]
    pub fn to_markup(&self) -> String {
        self.doc.to_markup(&self.encoder)
    }

    /// Document text, one line per row.
    #[wasm_bindgen]
    pub fn plain_text(&self) -> String {
        self.doc.plain_text()
    }
}
