//! Document sources: paginated text and page bitmaps.

mod memory;
mod pdf;

pub use memory::{MemoryDocument, MemoryPage};
pub use pdf::PdfDocument;

use std::path::Path;

use image::DynamicImage;
use tracing::debug;

use crate::error::DocumentError;

/// Result type for document operations.
pub type Result<T> = std::result::Result<T, DocumentError>;

/// A read-only, multi-page document. Page indices are zero-based.
pub trait DocumentSource {
    /// Number of pages.
    fn page_count(&self) -> usize;

    /// Embedded text of a page; empty when the page does not exist.
    fn page_text(&self, page: usize) -> Result<String>;

    /// Page bitmap at the requested resolution; `None` when the page does
    /// not exist or carries no raster content.
    fn render_page(&self, page: usize, dpi: u32) -> Result<Option<DynamicImage>>;
}

/// Opens documents from the filesystem.
pub trait DocumentOpener: Send + Sync {
    /// Open the document at `path`.
    fn open(&self, path: &Path) -> Result<Box<dyn DocumentSource>>;
}

/// Opener dispatching on file extension: PDFs and single-page images.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileOpener;

impl FileOpener {
    /// Extensions this opener accepts.
    pub const EXTENSIONS: &'static [&'static str] =
        &["pdf", "png", "jpg", "jpeg", "tif", "tiff", "bmp"];

    /// Whether `path` has an extension this opener accepts.
    pub fn accepts(path: &Path) -> bool {
        let extension = extension_of(path);
        Self::EXTENSIONS.contains(&extension.as_str())
    }
}

impl DocumentOpener for FileOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn DocumentSource>> {
        let extension = extension_of(path);
        debug!("Opening {} as {}", path.display(), extension);

        match extension.as_str() {
            "pdf" => {
                let data = std::fs::read(path).map_err(|e| DocumentError::Parse(e.to_string()))?;
                Ok(Box::new(PdfDocument::from_bytes(&data)?))
            }
            "png" | "jpg" | "jpeg" | "tif" | "tiff" | "bmp" => {
                let image = image::open(path).map_err(|e| DocumentError::Parse(e.to_string()))?;
                Ok(Box::new(MemoryDocument::from_image(image)))
            }
            other => Err(DocumentError::UnsupportedFormat(other.to_string())),
        }
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_known_extensions() {
        assert!(FileOpener::accepts(Path::new("a/policy.PDF")));
        assert!(FileOpener::accepts(Path::new("scan.jpeg")));
        assert!(!FileOpener::accepts(Path::new("notes.txt")));
        assert!(!FileOpener::accepts(Path::new("no_extension")));
    }

    #[test]
    fn test_open_unsupported_format() {
        let result = FileOpener.open(Path::new("notes.txt"));
        assert!(matches!(result, Err(DocumentError::UnsupportedFormat(ext)) if ext == "txt"));
    }

    #[test]
    fn test_open_missing_pdf_is_parse_error() {
        let result = FileOpener.open(Path::new("/definitely/missing/policy.pdf"));
        assert!(matches!(result, Err(DocumentError::Parse(_))));
    }
}
