//! Pixel geometry shared by detection, grouping and markup.

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in pixel corners (x1, y1, x2, y2).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl BBox {
    /// Create a box from its corners.
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Get the width of the box.
    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    /// Get the height of the box.
    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    /// Vertical centre, doubled to stay in integers.
    pub fn center_y2(&self) -> i32 {
        self.y1 + self.y2
    }

    /// Check that the box has positive width and height.
    pub fn is_valid(&self) -> bool {
        self.x1 < self.x2 && self.y1 < self.y2
    }

    /// Smallest box covering both boxes.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
            x2: self.x2.max(other.x2),
            y2: self.y2.max(other.y2),
        }
    }

    /// Union of a sequence of boxes, `None` when empty.
    pub fn union_all<'a, I>(boxes: I) -> Option<BBox>
    where
        I: IntoIterator<Item = &'a BBox>,
    {
        boxes
            .into_iter()
            .fold(None, |acc: Option<BBox>, b| match acc {
                Some(a) => Some(a.union(b)),
                None => Some(*b),
            })
    }

    /// Check whether the vertical extents of two boxes overlap, widened by `tolerance`.
    pub fn overlaps_vertically(&self, other: &BBox, tolerance: i32) -> bool {
        self.y2 >= other.y1 - tolerance && self.y1 <= other.y2 + tolerance
    }
}

impl From<PixelRegion> for BBox {
    fn from(region: PixelRegion) -> Self {
        BBox {
            x1: region.x,
            y1: region.y,
            x2: region.x + region.width,
            y2: region.y + region.height,
        }
    }
}

/// A connected ink region found by flood fill, as origin plus size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRegion {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelRegion {
    /// Create a region from origin and size.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Right edge (exclusive).
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Regions with zero or negative size are noise.
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Merge regions into the single region covering all of them.
    pub fn merge(regions: &[PixelRegion]) -> Option<PixelRegion> {
        let first = regions.first()?;
        let (mut min_x, mut min_y) = (first.x, first.y);
        let (mut max_x, mut max_y) = (first.right(), first.bottom());

        for r in &regions[1..] {
            min_x = min_x.min(r.x);
            min_y = min_y.min(r.y);
            max_x = max_x.max(r.right());
            max_y = max_y.max(r.bottom());
        }

        Some(PixelRegion::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_union() {
        let a = BBox::new(10, 10, 20, 30);
        let b = BBox::new(15, 5, 40, 25);
        assert_eq!(a.union(&b), BBox::new(10, 5, 40, 30));
        assert_eq!(BBox::union_all([&a, &b]), Some(BBox::new(10, 5, 40, 30)));
        assert_eq!(BBox::union_all(std::iter::empty::<&BBox>()), None);
    }

    #[test]
    fn test_bbox_validity() {
        assert!(BBox::new(0, 0, 1, 1).is_valid());
        assert!(!BBox::new(5, 0, 5, 10).is_valid());
        assert!(!BBox::default().is_valid());
    }

    #[test]
    fn test_region_merge() {
        let merged = PixelRegion::merge(&[
            PixelRegion::new(0, 2, 5, 10),
            PixelRegion::new(8, 0, 6, 9),
        ])
        .unwrap();
        assert_eq!(merged, PixelRegion::new(0, 0, 14, 12));
        assert_eq!(BBox::from(merged), BBox::new(0, 0, 14, 12));
        assert!(PixelRegion::merge(&[]).is_none());
    }

    #[test]
    fn test_vertical_overlap_with_tolerance() {
        let line = BBox::new(0, 100, 50, 120);
        assert!(BBox::new(60, 110, 90, 130).overlaps_vertically(&line, 0));
        assert!(!BBox::new(60, 125, 90, 140).overlaps_vertically(&line, 0));
        assert!(BBox::new(60, 125, 90, 140).overlaps_vertically(&line, 7));
    }
}
