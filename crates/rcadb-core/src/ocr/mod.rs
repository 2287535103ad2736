//! OCR engine contract and the tesseract-backed implementation.

mod tesseract;

pub use tesseract::TesseractCli;

use std::path::PathBuf;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::OcrError;
use crate::models::config::OcrConfig;

/// Characters accepted by digit-only requests.
pub const DIGITS_WHITELIST: &str = "0123456789";

/// Characters accepted by plate requests.
pub const PLATE_WHITELIST: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Page segmentation mode: how the recognizer partitions an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSegMode {
    /// Fully automatic segmentation.
    Auto,
    /// A single column of text of variable sizes.
    SingleColumn,
    /// A single uniform block of text.
    SingleBlock,
    /// A single text line.
    SingleLine,
    /// A single word.
    SingleWord,
    /// As much text as possible, in no particular order.
    SparseText,
}

impl PageSegMode {
    /// Numeric mode understood by tesseract.
    pub fn as_number(self) -> u8 {
        match self {
            Self::Auto => 3,
            Self::SingleColumn => 4,
            Self::SingleBlock => 6,
            Self::SingleLine => 7,
            Self::SingleWord => 8,
            Self::SparseText => 11,
        }
    }
}

/// What a region is expected to contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrKind {
    /// Free text.
    Text,
    /// Digits only.
    Digits,
    /// A Romanian registration plate.
    Plate,
}

/// Parameters for one recognition call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrRequest {
    /// Content kind.
    pub kind: OcrKind,
    /// Recognition language (tesseract code, e.g. `ron`).
    pub language: String,
    /// Segmentation mode.
    pub psm: PageSegMode,
    /// Restrict recognition to these characters.
    pub char_whitelist: Option<String>,
    /// User patterns file; engines may supply their own for plates.
    pub user_patterns: Option<PathBuf>,
}

/// Turns the OCR configuration into requests for each region kind.
#[derive(Debug, Clone)]
pub struct OcrProfile {
    config: OcrConfig,
}

impl OcrProfile {
    /// Create a profile from configuration.
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    /// Build the request for a region kind.
    pub fn request(&self, kind: OcrKind) -> OcrRequest {
        let (psm, char_whitelist) = match kind {
            OcrKind::Text => (self.config.text_psm, None),
            OcrKind::Digits => (self.config.digits_psm, Some(DIGITS_WHITELIST.to_string())),
            OcrKind::Plate => (self.config.plate_psm, Some(PLATE_WHITELIST.to_string())),
        };
        OcrRequest {
            kind,
            language: self.config.language.clone(),
            psm,
            char_whitelist,
            user_patterns: None,
        }
    }
}

impl Default for OcrProfile {
    fn default() -> Self {
        Self::new(OcrConfig::default())
    }
}

/// Recognizes text in an image region. Calls block until recognition ends.
pub trait OcrEngine: Send + Sync {
    /// Recognize the text in `image` according to `request`.
    fn recognize(&self, image: &DynamicImage, request: &OcrRequest) -> Result<String, OcrError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits_request_whitelist() {
        let profile = OcrProfile::default();
        let request = profile.request(OcrKind::Digits);

        assert_eq!(request.language, "ron");
        assert_eq!(request.char_whitelist.as_deref(), Some("0123456789"));
        assert_eq!(request.psm.as_number(), 6);
    }

    #[test]
    fn test_plate_request_uses_single_line() {
        let request = OcrProfile::default().request(OcrKind::Plate);
        assert_eq!(request.psm, PageSegMode::SingleLine);
        assert!(request.char_whitelist.unwrap().starts_with("ABC"));
    }
}
