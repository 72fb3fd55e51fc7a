//! Raster binarization: grayscale, contrast stretch, threshold and morphology.

use image::{DynamicImage, GenericImageView, GrayImage, Luma};
use imageproc::contrast::{self, ThresholdType};
use imageproc::morphology::{Mask, grayscale_dilate, grayscale_erode};
use tracing::debug;

use crate::error::DetectionError;
use crate::models::config::{BinarizeConfig, MorphologyOp, MorphologyStep};

const INK: u8 = u8::MAX;

/// Largest kernel side a structuring element supports.
const MAX_KERNEL: u32 = 511;

/// A black/white raster, `true` where a pixel is ink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InkRaster {
    width: u32,
    height: u32,
    ink: Vec<bool>,
}

impl InkRaster {
    /// Wrap a row-major ink buffer.
    pub fn new(width: u32, height: u32, ink: Vec<bool>) -> Result<Self, DetectionError> {
        let expected = width as usize * height as usize;
        if ink.len() != expected {
            return Err(DetectionError::InvalidRaster {
                width,
                height,
                expected,
                actual: ink.len(),
            });
        }

        Ok(Self { width, height, ink })
    }

    /// Build a raster from rows of `#` (ink) and any other character (paper).
    pub fn from_rows(rows: &[&str]) -> Result<Self, DetectionError> {
        let height = rows.len() as u32;
        let width = rows.first().map(|r| r.chars().count()).unwrap_or(0) as u32;
        let ink = rows
            .iter()
            .flat_map(|r| r.chars().map(|c| c == '#'))
            .collect();
        Self::new(width, height, ink)
    }

    /// Read an ink mask: nonzero pixels are ink.
    pub fn from_mask(mask: &GrayImage) -> Self {
        let (width, height) = mask.dimensions();
        let ink = mask.pixels().map(|p| p[0] > 0).collect();
        Self { width, height, ink }
    }

    /// Render as an ink mask with ink at full intensity.
    pub fn to_mask(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            Luma([if self.is_ink(x, y) { INK } else { 0 }])
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Check whether the pixel at (x, y) is ink.
    pub fn is_ink(&self, x: u32, y: u32) -> bool {
        self.ink[self.index(x, y)]
    }

    /// Number of ink pixels.
    pub fn ink_count(&self) -> usize {
        self.ink.iter().filter(|&&v| v).count()
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Apply one morphology step with a rectangular kernel.
    pub fn apply(&self, step: &MorphologyStep) -> InkRaster {
        InkRaster::from_mask(&morph(&self.to_mask(), step))
    }
}

/// Rectangular kernel anchored at `len / 2` and its point reflection.
///
/// Dilation uses the kernel and erosion the reflection, so close and open
/// leave solid rectangles in place for even sizes too.
fn rect_masks(kernel_width: u32, kernel_height: u32) -> (Mask, Mask) {
    let kw = kernel_width.clamp(1, MAX_KERNEL);
    let kh = kernel_height.clamp(1, MAX_KERNEL);
    let block = GrayImage::from_pixel(kw, kh, Luma([INK]));

    let (cx, cy) = (kw / 2, kh / 2);
    let kernel = Mask::from_image(&block, cx as u8, cy as u8);
    let reflected = Mask::from_image(&block, (kw - 1 - cx) as u8, (kh - 1 - cy) as u8);
    (kernel, reflected)
}

fn morph(mask: &GrayImage, step: &MorphologyStep) -> GrayImage {
    let (kernel, reflected) = rect_masks(step.kernel_width, step.kernel_height);
    match step.op {
        MorphologyOp::Close => grayscale_erode(&grayscale_dilate(mask, &kernel), &reflected),
        MorphologyOp::Open => grayscale_dilate(&grayscale_erode(mask, &reflected), &kernel),
    }
}

/// Turns a decoded image into an ink raster.
pub struct Binarizer {
    config: BinarizeConfig,
}

impl Binarizer {
    /// Create a binarizer with default settings.
    pub fn new() -> Self {
        Self {
            config: BinarizeConfig::default(),
        }
    }

    /// Create a binarizer from configuration.
    pub fn with_config(config: BinarizeConfig) -> Self {
        Self { config }
    }

    /// Set the ink threshold (fraction of the channel range).
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.config.threshold = threshold;
        self
    }

    /// Disable all morphology passes.
    pub fn without_morphology(mut self) -> Self {
        self.config.morphology.clear();
        self
    }

    /// Binarize an image.
    pub fn binarize(&self, image: &DynamicImage) -> Result<InkRaster, DetectionError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(DetectionError::EmptyImage { width, height });
        }

        let mut gray = image.to_luma8();
        if self.config.normalize {
            gray = normalize(&gray);
        }

        // Ink is strictly darker than `cutoff`.
        let cutoff = (self.config.threshold.clamp(0.0, 1.0) * 256.0).round() as u16;
        let mut mask = match cutoff.checked_sub(1) {
            Some(level) => contrast::threshold(&gray, level as u8, ThresholdType::BinaryInverted),
            None => GrayImage::new(width, height),
        };

        for step in &self.config.morphology {
            mask = morph(&mask, step);
        }

        let raster = InkRaster::from_mask(&mask);

        debug!(
            "Binarized {}x{} image: {} ink pixels",
            width,
            height,
            raster.ink_count()
        );

        Ok(raster)
    }
}

impl Default for Binarizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Linearly map the darkest pixel to 0 and the lightest to 255.
fn normalize(image: &GrayImage) -> GrayImage {
    let (min, max) = image
        .pixels()
        .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p[0]), hi.max(p[0])));

    if max <= min {
        return image.clone();
    }

    contrast::stretch_contrast(image, min, max, 0, u8::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_dimension_mismatch() {
        let err = InkRaster::new(3, 3, vec![false; 8]).unwrap_err();
        assert!(matches!(
            err,
            DetectionError::InvalidRaster { expected: 9, actual: 8, .. }
        ));
    }

    #[test]
    fn test_threshold_at_midpoint() {
        let mut img = GrayImage::new(4, 1);
        for (x, v) in [0u8, 127, 128, 255].into_iter().enumerate() {
            img.put_pixel(x as u32, 0, Luma([v]));
        }

        let raster = Binarizer::new()
            .without_morphology()
            .binarize(&DynamicImage::ImageLuma8(img))
            .unwrap();

        assert!(raster.is_ink(0, 0));
        assert!(raster.is_ink(1, 0));
        assert!(!raster.is_ink(2, 0));
        assert!(!raster.is_ink(3, 0));
    }

    #[test]
    fn test_contrast_stretch_separates_low_contrast_scan() {
        // Faint scan: ink at 150, paper at 200. Without stretching both are paper.
        let mut img = GrayImage::from_pixel(2, 1, Luma([200]));
        img.put_pixel(0, 0, Luma([150]));
        let img = DynamicImage::ImageLuma8(img);

        let stretched = Binarizer::new().without_morphology().binarize(&img).unwrap();
        assert!(stretched.is_ink(0, 0));
        assert!(!stretched.is_ink(1, 0));

        let mut config = BinarizeConfig::default();
        config.normalize = false;
        config.morphology.clear();
        let flat = Binarizer::with_config(config).binarize(&img).unwrap();
        assert_eq!(flat.ink_count(), 0);
    }

    #[test]
    fn test_close_bridges_horizontal_gap() {
        let raster = InkRaster::from_rows(&["....##..##...."]).unwrap();
        let closed = raster.apply(&MorphologyStep::close(5, 1));
        assert_eq!(closed.ink_count(), 6);
        assert!((4..10).all(|x| closed.is_ink(x, 0)));
    }

    #[test]
    fn test_open_removes_thin_speck() {
        let raster = InkRaster::from_rows(&[
            "........",
            ".####...",
            "........",
            ".....##.",
            ".....##.",
            "........",
        ])
        .unwrap();

        let opened = raster.apply(&MorphologyStep::open(1, 2));
        assert!(!opened.is_ink(1, 1));
        assert!(opened.is_ink(5, 3));
        assert!(opened.is_ink(6, 4));
        assert_eq!(opened.ink_count(), 4);
    }

    #[test]
    fn test_even_close_keeps_block_in_place() {
        let raster = InkRaster::from_rows(&[
            "......",
            ".###..",
            ".###..",
            "......",
            "......",
        ])
        .unwrap();
        let closed = raster.apply(&MorphologyStep::close(2, 2));
        assert_eq!(closed, raster);
    }

    #[test]
    fn test_mask_conversion() {
        let raster = InkRaster::from_rows(&["#.", ".#"]).unwrap();
        let mask = raster.to_mask();
        assert_eq!(mask.get_pixel(0, 0)[0], 255);
        assert_eq!(mask.get_pixel(1, 0)[0], 0);
        assert_eq!(InkRaster::from_mask(&mask), raster);
    }

    #[test]
    fn test_empty_image_rejected() {
        let img = DynamicImage::ImageLuma8(GrayImage::new(0, 5));
        assert!(matches!(
            Binarizer::new().binarize(&img),
            Err(DetectionError::EmptyImage { .. })
        ));
    }
}
