//! Geometric template location: reference bitmaps, matching, anchor geometry.

mod anchors;
mod matcher;
mod store;

pub use anchors::{AnchorTable, AnchorTableBuilder, CropRegion, Offsets, Point, PAGE_TOP_LEFT};
pub use matcher::{MatchMethod, TemplateMatch, TemplateMatcher};
pub use store::TemplateStore;

use image::DynamicImage;
use ndarray::Array2;

/// Single-channel intensity image, rows by columns, values in `[0, 1]`.
pub type Intensity = Array2<f64>;

/// Convert an image to single-channel intensity.
pub fn to_intensity(image: &DynamicImage) -> Intensity {
    let gray = image.to_luma8();
    let (width, height) = gray.dimensions();
    Array2::from_shape_fn((height as usize, width as usize), |(y, x)| {
        f64::from(gray.get_pixel(x as u32, y as u32)[0]) / 255.0
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn test_to_intensity_layout() {
        let mut gray = GrayImage::new(3, 2);
        gray.put_pixel(2, 1, Luma([255]));
        let intensity = to_intensity(&DynamicImage::ImageLuma8(gray));

        assert_eq!(intensity.dim(), (2, 3));
        assert_eq!(intensity[[1, 2]], 1.0);
        assert_eq!(intensity[[0, 0]], 0.0);
    }
}
