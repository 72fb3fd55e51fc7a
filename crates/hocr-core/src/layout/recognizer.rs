//! Recognizers: interchangeable producers of page structure from an image.

use image::{DynamicImage, GenericImageView};
use tracing::{info, warn};

use crate::error::Result;
use crate::hocr::HocrEncoder;
use crate::models::config::HocrConfig;
use crate::models::page::Page;

use super::binarize::{Binarizer, InkRaster};
use super::detector::ComponentDetector;
use super::grouper::LayoutGrouper;

/// Produces hierarchical page structure from an image.
pub trait Recognizer {
    /// Recognize the page layout (and text, if the recognizer reads it).
    fn recognize(&self, image: &DynamicImage) -> Result<Page>;

    /// Short name of the detection method, e.g. for the `ocr-system` meta tag.
    fn method(&self) -> &'static str;
}

/// External transcription capability (cloud OCR, vision language model, ...).
pub trait TextSource {
    /// Transcribe the words of `page`, one word per line, in document order.
    fn transcribe(&self, image: &DynamicImage, page: &Page) -> Result<String>;
}

/// Geometry-only recognizer: binarize, flood-fill, group.
///
/// Words carry placeholder text (`word_N`) and no confidence.
pub struct GeometryRecognizer {
    binarizer: Binarizer,
    detector: ComponentDetector,
    grouper: LayoutGrouper,
}

impl GeometryRecognizer {
    /// Create a recognizer with default settings.
    pub fn new() -> Self {
        Self::from_config(&HocrConfig::default())
    }

    /// Create a recognizer from configuration.
    pub fn from_config(config: &HocrConfig) -> Self {
        Self {
            binarizer: Binarizer::with_config(config.binarize.clone()),
            detector: ComponentDetector::with_config(config.detection.clone()),
            grouper: LayoutGrouper::with_config(config.grouping.clone()),
        }
    }

    /// Run detection and grouping on an already binarized raster.
    pub fn recognize_raster(&self, raster: &InkRaster) -> Page {
        let components = self.detector.detect(raster);
        self.grouper
            .build_page(&components, raster.width(), raster.height())
    }
}

impl Default for GeometryRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Recognizer for GeometryRecognizer {
    fn recognize(&self, image: &DynamicImage) -> Result<Page> {
        let (width, height) = image.dimensions();
        info!("Detecting words in {}x{} image", width, height);

        let raster = self.binarizer.binarize(image)?;
        let page = self.recognize_raster(&raster);

        info!("Detected {} words", page.word_count());
        Ok(page)
    }

    fn method(&self) -> &'static str {
        "word-detection"
    }
}

/// Runs an inner recognizer for geometry, then overlays text from a [`TextSource`].
///
/// Transcribed words are assigned to detected words in document order. If the
/// text source fails, the geometry-only page is returned.
pub struct TranscriptOverlay<R, S> {
    inner: R,
    source: S,
}

impl<R: Recognizer, S: TextSource> TranscriptOverlay<R, S> {
    /// Combine a geometry recognizer with a text source.
    pub fn new(inner: R, source: S) -> Self {
        Self { inner, source }
    }
}

impl<R: Recognizer, S: TextSource> Recognizer for TranscriptOverlay<R, S> {
    fn recognize(&self, image: &DynamicImage) -> Result<Page> {
        let mut page = self.inner.recognize(image)?;

        let text = match self.source.transcribe(image, &page) {
            Ok(text) => text,
            Err(e) => {
                warn!("Text recognition failed, using word detection only: {}", e);
                return Ok(page);
            }
        };

        let transcribed: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .collect();

        info!(
            "Mapping {} transcribed words onto {} detected words",
            transcribed.len(),
            page.word_count()
        );

        for (word, text) in page.words_mut().zip(transcribed) {
            word.text = text.to_string();
        }

        Ok(page)
    }

    fn method(&self) -> &'static str {
        "transcript-overlay"
    }
}

/// Recognize an image and encode the result as hOCR.
pub fn recognize_to_hocr<R: Recognizer + ?Sized>(
    recognizer: &R,
    image: &DynamicImage,
    encoder: &HocrEncoder,
) -> Result<String> {
    let page = recognizer.recognize(image)?;
    Ok(encoder.encode_page(&page))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HocrError;
    use image::{GrayImage, Luma};

    fn page_image() -> DynamicImage {
        let mut img = GrayImage::from_pixel(200, 120, Luma([255]));
        // Two words on one line, one word on the next.
        for (x, y, w, h) in [(10, 10, 30, 12), (100, 10, 30, 12), (10, 40, 40, 12)] {
            for yy in y..y + h {
                for xx in x..x + w {
                    img.put_pixel(xx, yy, Luma([0]));
                }
            }
        }
        DynamicImage::ImageLuma8(img)
    }

    struct FixedText(&'static str);

    impl TextSource for FixedText {
        fn transcribe(&self, _image: &DynamicImage, _page: &Page) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct Unavailable;

    impl TextSource for Unavailable {
        fn transcribe(&self, _image: &DynamicImage, _page: &Page) -> Result<String> {
            Err(HocrError::Recognition("service unavailable".to_string()))
        }
    }

    fn texts(page: &Page) -> Vec<String> {
        page.words().map(|w| w.text.clone()).collect()
    }

    #[test]
    fn test_geometry_recognizer_finds_words() {
        let page = GeometryRecognizer::new().recognize(&page_image()).unwrap();

        assert_eq!((page.width, page.height), (200, 120));
        assert_eq!(texts(&page), vec!["word_1", "word_2", "word_3"]);
        for word in page.words() {
            assert!(word.bbox.is_valid());
        }
    }

    #[test]
    fn test_overlay_assigns_text_in_order() {
        let recognizer =
            TranscriptOverlay::new(GeometryRecognizer::new(), FixedText("Dear\n  Sir \n\nALS\n"));
        let page = recognizer.recognize(&page_image()).unwrap();
        assert_eq!(texts(&page), vec!["Dear", "Sir", "ALS"]);
    }

    #[test]
    fn test_overlay_with_short_transcript_keeps_placeholders() {
        let recognizer = TranscriptOverlay::new(GeometryRecognizer::new(), FixedText("Dear"));
        let page = recognizer.recognize(&page_image()).unwrap();
        assert_eq!(texts(&page), vec!["Dear", "word_2", "word_3"]);
    }

    #[test]
    fn test_overlay_falls_back_to_geometry() {
        let recognizer = TranscriptOverlay::new(GeometryRecognizer::new(), Unavailable);
        let page = recognizer.recognize(&page_image()).unwrap();
        assert_eq!(texts(&page), vec!["word_1", "word_2", "word_3"]);
        assert_eq!(recognizer.method(), "transcript-overlay");
    }

    #[test]
    fn test_recognize_to_hocr() {
        let recognizer: &dyn Recognizer = &GeometryRecognizer::new();
        let hocr = recognize_to_hocr(recognizer, &page_image(), &HocrEncoder::new()).unwrap();
        assert!(hocr.contains("class='ocrx_word' id='word_3'"));
    }
}
