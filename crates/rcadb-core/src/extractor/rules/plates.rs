//! Romanian registration plates.

use super::patterns::{PLATE_BOUNDED, PLATE_CROPPED};
use super::text::clean_text;

/// Plate in free-form page text; must be delimited by whitespace.
pub fn find_plate(text: &str) -> Option<String> {
    PLATE_BOUNDED
        .captures(text)
        .map(|caps| clean_text(&caps[1]))
}

/// Plate in text recognized from a plate-only crop.
pub fn find_plate_in_crop(text: &str) -> Option<String> {
    PLATE_CROPPED.find(text).map(|m| clean_text(m.as_str()))
}
