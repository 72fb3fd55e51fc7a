//! Configuration structures for detection, grouping and markup.

use serde::{Deserialize, Serialize};

/// Main configuration for the hocr pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HocrConfig {
    /// Raster binarization configuration.
    pub binarize: BinarizeConfig,

    /// Connected-component detection configuration.
    pub detection: DetectionConfig,

    /// Word/line/paragraph grouping configuration.
    pub grouping: GroupingConfig,

    /// hOCR output configuration.
    pub markup: MarkupConfig,

    /// Editable document configuration.
    pub document: DocumentConfig,
}

/// Grayscale, contrast stretch, threshold and morphology settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinarizeConfig {
    /// Stretch luminance to the full range before thresholding.
    pub normalize: bool,

    /// Ink threshold as a fraction of the channel range (0.0 - 1.0).
    pub threshold: f32,

    /// Morphological passes applied to the ink mask, in order.
    pub morphology: Vec<MorphologyStep>,
}

impl Default for BinarizeConfig {
    fn default() -> Self {
        Self {
            normalize: true,
            threshold: 0.5,
            morphology: vec![
                MorphologyStep::close(5, 1),
                MorphologyStep::open(1, 2),
                MorphologyStep::close(2, 1),
            ],
        }
    }
}

/// Morphological operation on the ink mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MorphologyOp {
    /// Dilate then erode: bridges small gaps between strokes.
    Close,
    /// Erode then dilate: removes specks thinner than the kernel.
    Open,
}

/// One morphology pass with a rectangular kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MorphologyStep {
    pub op: MorphologyOp,
    pub kernel_width: u32,
    pub kernel_height: u32,
}

impl MorphologyStep {
    pub fn close(kernel_width: u32, kernel_height: u32) -> Self {
        Self {
            op: MorphologyOp::Close,
            kernel_width,
            kernel_height,
        }
    }

    pub fn open(kernel_width: u32, kernel_height: u32) -> Self {
        Self {
            op: MorphologyOp::Open,
            kernel_width,
            kernel_height,
        }
    }
}

/// Size filter applied to connected components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Minimum component width in pixels.
    pub min_width: u32,

    /// Minimum component height in pixels.
    pub min_height: u32,

    /// Maximum component width as a divisor of image width.
    pub max_width_divisor: u32,

    /// Maximum component height as a divisor of image height.
    pub max_height_divisor: u32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_width: 5,
            min_height: 8,
            max_width_divisor: 2,
            max_height_divisor: 4,
        }
    }
}

/// Proximity thresholds for grouping, in multiples of a reference height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    /// Max horizontal gap between components of one word (x average height).
    pub word_gap_factor: i32,

    /// Max vertical gap between lines of one paragraph (x line height).
    pub paragraph_gap_factor: i32,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            word_gap_factor: 4,
            paragraph_gap_factor: 2,
        }
    }
}

/// hOCR output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkupConfig {
    /// Value of the `ocr-system` meta tag.
    pub ocr_system: String,

    /// Confidence written for words that carry none.
    pub default_confidence: f64,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            ocr_system: "hocr-edit".to_string(),
            default_confidence: 95.0,
        }
    }
}

/// Editable document settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Vertical band (pixels) treated as one row when ordering words.
    pub reading_order_tolerance: i32,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            reading_order_tolerance: 10,
        }
    }
}

impl HocrConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
