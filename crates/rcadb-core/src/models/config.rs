//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ocr::PageSegMode;

/// Main configuration for the rcadb pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RcadbConfig {
    /// OCR engine configuration.
    pub ocr: OcrConfig,

    /// Document rendering configuration.
    pub document: DocumentConfig,

    /// Template matcher configuration.
    pub matching: MatchingConfig,

    /// Reference bitmap location.
    pub templates: TemplatesConfig,

    /// Batch processing configuration.
    pub batch: BatchConfig,
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Path or name of the tesseract executable.
    pub tesseract_path: PathBuf,

    /// Recognition language.
    pub language: String,

    /// Segmentation mode for free text regions.
    pub text_psm: PageSegMode,

    /// Segmentation mode for digit-only regions.
    pub digits_psm: PageSegMode,

    /// Segmentation mode for plate regions.
    pub plate_psm: PageSegMode,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_path: PathBuf::from("tesseract"),
            language: "ron".to_string(),
            text_psm: PageSegMode::SingleBlock,
            digits_psm: PageSegMode::SingleBlock,
            plate_psm: PageSegMode::SingleLine,
        }
    }
}

/// Document rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// DPI for rendering pages handed to raster templates.
    pub render_dpi: u32,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self { render_dpi: 600 }
    }
}

/// Template matcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Minimum score (0.0 - 1.0) for accepting a location.
    pub threshold: f64,

    /// Largest downscale factor used by the coarse search.
    pub max_coarse_factor: u32,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            threshold: 0.8,
            max_coarse_factor: 8,
        }
    }
}

/// Reference bitmap location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatesConfig {
    /// Directory holding `*.png` reference bitmaps.
    pub resource_dir: PathBuf,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            resource_dir: PathBuf::from("resources"),
        }
    }
}

/// Batch processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of workers (0 = one per available CPU).
    pub workers: usize,

    /// Name of the CSV file written into the output directory.
    pub output_file: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            output_file: "db.csv".to_string(),
        }
    }
}

impl RcadbConfig {
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

    /// Effective worker count.
    pub fn worker_count(&self) -> usize {
        if self.batch.workers > 0 {
            return self.batch.workers;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: RcadbConfig =
            serde_json::from_str(r#"{ "matching": { "threshold": 0.9 } }"#).unwrap();

        assert_eq!(config.matching.threshold, 0.9);
        assert_eq!(config.matching.max_coarse_factor, 8);
        assert_eq!(config.ocr.language, "ron");
        assert_eq!(config.document.render_dpi, 600);
        assert_eq!(config.batch.output_file, "db.csv");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = RcadbConfig::default();
        config.batch.workers = 3;
        config.save(&path).unwrap();

        let loaded = RcadbConfig::from_file(&path).unwrap();
        assert_eq!(loaded.batch.workers, 3);
        assert_eq!(loaded.worker_count(), 3);
    }
}
