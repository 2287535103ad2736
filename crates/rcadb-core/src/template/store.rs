//! Named reference bitmaps, loaded once at startup.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info, warn};

use super::{to_intensity, Intensity};
use crate::error::TemplateError;

/// Read-only map from reference name to intensity bitmap.
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    references: HashMap<String, Intensity>,
}

impl TemplateStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.png` under `dir`, keyed by file stem.
    ///
    /// A missing directory yields an empty store.
    pub fn load_dir(dir: &Path) -> Result<Self, TemplateError> {
        let mut store = Self::new();
        if !dir.is_dir() {
            warn!("Reference directory {} not found; raster anchors disabled", dir.display());
            return Ok(store);
        }

        let entries = std::fs::read_dir(dir).map_err(|e| TemplateError::Load {
            name: dir.display().to_string(),
            reason: e.to_string(),
        })?;

        for entry in entries.flatten() {
            let path = entry.path();
            let is_png = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("png"));
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if !is_png {
                continue;
            }

            let image = image::open(&path).map_err(|e| TemplateError::Load {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
            debug!("Loaded reference {} ({}x{})", name, image.width(), image.height());
            store.insert(name, to_intensity(&image));
        }

        info!("Loaded {} reference bitmaps from {}", store.len(), dir.display());
        Ok(store)
    }

    pub fn insert(&mut self, name: impl Into<String>, reference: Intensity) {
        self.references.insert(name.into(), reference);
    }

    pub fn get(&self, name: &str) -> Option<&Intensity> {
        self.references.get(name)
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    /// Reference names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.references.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn test_missing_dir_is_empty() {
        let store = TemplateStore::load_dir(Path::new("/nonexistent/rcadb/refs")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_png_by_stem() {
        let dir = tempfile::tempdir().unwrap();
        let mut gray = GrayImage::new(4, 3);
        gray.put_pixel(1, 1, Luma([200]));
        gray.save(dir.path().join("insurer_nm_allianz.png")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let store = TemplateStore::load_dir(dir.path()).unwrap();

        assert_eq!(store.names(), vec!["insurer_nm_allianz"]);
        assert_eq!(store.get("insurer_nm_allianz").unwrap().dim(), (3, 4));
    }

    #[test]
    fn test_corrupt_png_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.png"), b"not png").unwrap();

        let err = TemplateStore::load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, TemplateError::Load { name, .. } if name == "broken"));
    }
}
