//! In-memory document: plain image inputs and synthetic pages.

use image::DynamicImage;

use super::{DocumentSource, Result};

/// One page held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryPage {
    /// Embedded text of the page.
    pub text: String,
    /// Page bitmap, if any.
    pub image: Option<DynamicImage>,
}

/// Document whose pages are already decoded.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    pages: Vec<MemoryPage>,
}

impl MemoryDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self { pages: Vec::new() }
    }

    /// One-page document wrapping a scanned image.
    pub fn from_image(image: DynamicImage) -> Self {
        Self::new().with_page(String::new(), Some(image))
    }

    /// Text-only document, one page per item.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        texts
            .into_iter()
            .fold(Self::new(), |doc, text| doc.with_page(text, None))
    }

    /// Append a page.
    pub fn with_page(mut self, text: impl Into<String>, image: Option<DynamicImage>) -> Self {
        self.pages.push(MemoryPage {
            text: text.into(),
            image,
        });
        self
    }
}

impl DocumentSource for MemoryDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, page: usize) -> Result<String> {
        Ok(self
            .pages
            .get(page)
            .map(|p| p.text.clone())
            .unwrap_or_default())
    }

    fn render_page(&self, page: usize, _dpi: u32) -> Result<Option<DynamicImage>> {
        Ok(self.pages.get(page).and_then(|p| p.image.clone()))
    }
}
