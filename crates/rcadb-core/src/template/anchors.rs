//! Anchor points and crop geometry for raster layouts.

use std::collections::HashMap;

use image::{DynamicImage, GenericImageView};

use crate::error::TemplateError;

/// Built-in anchor at the page origin.
pub const PAGE_TOP_LEFT: &str = "page-top-left";

/// A point in page pixels. May lie outside the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Signed offsets of a region's edges relative to an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Offsets {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl Offsets {
    pub const fn new(left: i64, top: i64, right: i64, bottom: i64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }
}

/// Axis-aligned rectangle in page pixels, `[left, right) x [top, bottom)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl CropRegion {
    /// Region obtained by shifting `offsets` by `anchor`.
    pub fn from_anchor(anchor: Point, offsets: Offsets) -> Self {
        Self {
            left: anchor.x + offsets.left,
            top: anchor.y + offsets.top,
            right: anchor.x + offsets.right,
            bottom: anchor.y + offsets.bottom,
        }
    }

    pub fn width(&self) -> i64 {
        (self.right - self.left).max(0)
    }

    pub fn height(&self) -> i64 {
        (self.bottom - self.top).max(0)
    }

    /// Intersect with a `width` x `height` page. `None` if nothing remains.
    pub fn clamp(&self, width: u32, height: u32) -> Option<CropRegion> {
        let clamped = CropRegion {
            left: self.left.clamp(0, i64::from(width)),
            top: self.top.clamp(0, i64::from(height)),
            right: self.right.clamp(0, i64::from(width)),
            bottom: self.bottom.clamp(0, i64::from(height)),
        };
        (clamped.width() > 0 && clamped.height() > 0).then_some(clamped)
    }

    /// Cut this region out of `image`, clamped to its bounds.
    pub fn crop(&self, image: &DynamicImage) -> Option<DynamicImage> {
        let (width, height) = image.dimensions();
        let region = self.clamp(width, height)?;
        Some(image.crop_imm(
            region.left as u32,
            region.top as u32,
            region.width() as u32,
            region.height() as u32,
        ))
    }
}

/// Collects anchor positions while a page is being resolved.
#[derive(Debug, Default)]
pub struct AnchorTableBuilder {
    points: HashMap<String, Point>,
}

impl AnchorTableBuilder {
    /// Builder seeded with [`PAGE_TOP_LEFT`].
    pub fn new() -> Self {
        let mut points = HashMap::new();
        points.insert(PAGE_TOP_LEFT.to_string(), Point::new(0, 0));
        Self { points }
    }

    pub fn insert(&mut self, name: impl Into<String>, point: Point) -> &mut Self {
        self.points.insert(name.into(), point);
        self
    }

    pub fn build(self) -> AnchorTable {
        AnchorTable {
            points: self.points,
        }
    }
}

/// Resolved anchors for one page. Read-only once built.
#[derive(Debug, Clone)]
pub struct AnchorTable {
    points: HashMap<String, Point>,
}

impl AnchorTable {
    pub fn get(&self, name: &str) -> Option<Point> {
        self.points.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Crop region for `offsets` relative to the named anchor.
    pub fn region(&self, anchor: &str, offsets: Offsets) -> Result<CropRegion, TemplateError> {
        let point = self
            .get(anchor)
            .ok_or_else(|| TemplateError::UnresolvedAnchor(anchor.to_string()))?;
        Ok(CropRegion::from_anchor(point, offsets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GrayImage;

    #[test]
    fn test_page_top_left_is_origin() {
        let table = AnchorTableBuilder::new().build();
        assert_eq!(table.get(PAGE_TOP_LEFT), Some(Point::new(0, 0)));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_region_relative_to_anchor() {
        let mut builder = AnchorTableBuilder::new();
        builder.insert("logo", Point::new(300, 200));
        let table = builder.build();

        let region = table.region("logo", Offsets::new(-4, -100, 2712, 10)).unwrap();
        assert_eq!(region, CropRegion { left: 296, top: 100, right: 3012, bottom: 210 });
        assert_eq!((region.width(), region.height()), (2716, 110));
    }

    #[test]
    fn test_unknown_anchor() {
        let table = AnchorTableBuilder::new().build();
        let err = table.region("missing", Offsets::new(0, 0, 1, 1)).unwrap_err();
        assert!(matches!(err, TemplateError::UnresolvedAnchor(name) if name == "missing"));
    }

    #[test]
    fn test_clamp_and_crop() {
        let region = CropRegion::from_anchor(Point::new(-5, 8), Offsets::new(0, 0, 20, 20));
        assert_eq!(
            region.clamp(10, 12),
            Some(CropRegion { left: 0, top: 8, right: 10, bottom: 12 })
        );

        let image = DynamicImage::ImageLuma8(GrayImage::new(10, 12));
        let cropped = region.crop(&image).unwrap();
        assert_eq!(cropped.dimensions(), (10, 4));

        let outside = CropRegion::from_anchor(Point::new(50, 50), Offsets::new(0, 0, 5, 5));
        assert!(outside.crop(&image).is_none());
    }
}
