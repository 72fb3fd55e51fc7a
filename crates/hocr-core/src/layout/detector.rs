//! Connected-component detection on a binarized raster.

use tracing::{debug, trace};

use crate::models::config::DetectionConfig;
use crate::models::geometry::PixelRegion;

use super::binarize::InkRaster;

const NEIGHBORS: [(i64, i64); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Finds glyph-sized ink regions by 8-connected flood fill.
pub struct ComponentDetector {
    config: DetectionConfig,
}

impl ComponentDetector {
    /// Create a detector with default size limits.
    pub fn new() -> Self {
        Self {
            config: DetectionConfig::default(),
        }
    }

    /// Create a detector from configuration.
    pub fn with_config(config: DetectionConfig) -> Self {
        Self { config }
    }

    /// Set the minimum component size.
    pub fn with_min_size(mut self, width: u32, height: u32) -> Self {
        self.config.min_width = width;
        self.config.min_height = height;
        self
    }

    /// Find components in raster scan order.
    ///
    /// Regions smaller than the minimum size, wider than `width / max_width_divisor`
    /// or taller than `height / max_height_divisor` are discarded.
    pub fn detect(&self, raster: &InkRaster) -> Vec<PixelRegion> {
        let (width, height) = (raster.width(), raster.height());
        let mut visited = vec![false; width as usize * height as usize];
        let mut components = Vec::new();
        let mut discarded = 0usize;

        let max_w = width / self.config.max_width_divisor.max(1);
        let max_h = height / self.config.max_height_divisor.max(1);

        for y in 0..height {
            for x in 0..width {
                let idx = y as usize * width as usize + x as usize;
                if visited[idx] || !raster.is_ink(x, y) {
                    continue;
                }

                let region = flood_fill(raster, &mut visited, x, y);
                let (w, h) = (region.width as u32, region.height as u32);

                if w >= self.config.min_width
                    && h >= self.config.min_height
                    && w <= max_w
                    && h <= max_h
                {
                    components.push(region);
                } else {
                    trace!("Discarding {}x{} component at ({}, {})", w, h, x, y);
                    discarded += 1;
                }
            }
        }

        debug!(
            "Found {} components ({} discarded) in {}x{} raster",
            components.len(),
            discarded,
            width,
            height
        );

        components
    }
}

impl Default for ComponentDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Fill the component containing (start_x, start_y) and return its bounds.
///
/// Uses an explicit stack, so dense pages cannot overflow the call stack.
fn flood_fill(raster: &InkRaster, visited: &mut [bool], start_x: u32, start_y: u32) -> PixelRegion {
    let (width, height) = (raster.width() as i64, raster.height() as i64);
    let (mut min_x, mut min_y) = (start_x as i64, start_y as i64);
    let (mut max_x, mut max_y) = (min_x, min_y);

    let mut stack = vec![(min_x, min_y)];
    visited[(min_y * width + min_x) as usize] = true;

    while let Some((x, y)) = stack.pop() {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);

        for (dx, dy) in NEIGHBORS {
            let (nx, ny) = (x + dx, y + dy);
            if nx < 0 || ny < 0 || nx >= width || ny >= height {
                continue;
            }
            let idx = (ny * width + nx) as usize;
            if visited[idx] || !raster.is_ink(nx as u32, ny as u32) {
                continue;
            }
            visited[idx] = true;
            stack.push((nx, ny));
        }
    }

    PixelRegion::new(
        min_x as i32,
        min_y as i32,
        (max_x - min_x + 1) as i32,
        (max_y - min_y + 1) as i32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank(width: u32, height: u32) -> Vec<bool> {
        vec![false; (width * height) as usize]
    }

    fn paint(ink: &mut [bool], width: u32, x: u32, y: u32, w: u32, h: u32) {
        for yy in y..y + h {
            for xx in x..x + w {
                ink[(yy * width + xx) as usize] = true;
            }
        }
    }

    #[test]
    fn test_empty_raster_has_no_components() {
        let raster = InkRaster::new(40, 40, blank(40, 40)).unwrap();
        assert!(ComponentDetector::new().detect(&raster).is_empty());
    }

    #[test]
    fn test_detects_glyph_sized_blocks_in_scan_order() {
        let (w, h) = (100, 100);
        let mut ink = blank(w, h);
        paint(&mut ink, w, 50, 10, 6, 10);
        paint(&mut ink, w, 10, 12, 5, 8);
        let raster = InkRaster::new(w, h, ink).unwrap();

        let regions = ComponentDetector::new().detect(&raster);
        assert_eq!(
            regions,
            vec![
                PixelRegion::new(50, 10, 6, 10),
                PixelRegion::new(10, 12, 5, 8),
            ]
        );
    }

    #[test]
    fn test_diagonal_pixels_are_connected() {
        // A one-pixel-wide diagonal stroke is a single 8-connected component.
        let (w, h) = (40, 40);
        let mut ink = blank(w, h);
        for i in 0..10 {
            ink[((5 + i) * w + 5 + i) as usize] = true;
        }
        let raster = InkRaster::new(w, h, ink).unwrap();

        let regions = ComponentDetector::new().detect(&raster);
        assert_eq!(regions, vec![PixelRegion::new(5, 5, 10, 10)]);
    }

    #[test]
    fn test_size_filter() {
        let (w, h) = (100, 100);
        let mut ink = blank(w, h);
        paint(&mut ink, w, 0, 0, 4, 10); // too narrow
        paint(&mut ink, w, 10, 0, 10, 7); // too short
        paint(&mut ink, w, 0, 40, 51, 10); // wider than half the image
        paint(&mut ink, w, 70, 40, 10, 26); // taller than a quarter of the image
        paint(&mut ink, w, 30, 0, 5, 8); // smallest accepted
        let raster = InkRaster::new(w, h, ink).unwrap();

        let regions = ComponentDetector::new().detect(&raster);
        assert_eq!(regions, vec![PixelRegion::new(30, 0, 5, 8)]);
    }

    #[test]
    fn test_large_region_does_not_overflow_stack() {
        let (w, h) = (1200, 1200);
        let ink = vec![true; (w * h) as usize];
        let raster = InkRaster::new(w, h, ink).unwrap();

        // The whole page is one smear and is filtered out by the size limits.
        assert!(ComponentDetector::new().detect(&raster).is_empty());
    }

    #[test]
    fn test_every_region_is_within_limits() {
        let (w, h) = (60, 60);
        let mut ink = blank(w, h);
        for i in 0..6 {
            paint(&mut ink, w, i * 9, i * 4, 3 + i, 6 + i);
        }
        let raster = InkRaster::new(w, h, ink).unwrap();

        for region in ComponentDetector::new().detect(&raster) {
            assert!(region.width >= 5 && region.height >= 8);
            assert!(region.width <= 30 && region.height <= 15);
        }
    }
}
