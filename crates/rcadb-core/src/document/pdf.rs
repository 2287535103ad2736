//! PDF document source using lopdf and pdf-extract.

use std::cell::OnceCell;

use image::{imageops::FilterType, DynamicImage, GenericImageView, GrayImage, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, trace};

use super::{DocumentSource, Result};
use crate::error::DocumentError;

/// Points per inch in PDF user space.
const POINTS_PER_INCH: f32 = 72.0;

/// A parsed PDF. Page text is extracted lazily, once.
pub struct PdfDocument {
    document: Document,
    raw_data: Vec<u8>,
    page_texts: OnceCell<Vec<String>>,
}

impl PdfDocument {
    /// Parse a PDF from bytes, decrypting empty-password files.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut document =
            Document::load_mem(data).map_err(|e| DocumentError::Parse(e.to_string()))?;

        let raw_data = if document.is_encrypted() {
            if document.decrypt("").is_err() {
                return Err(DocumentError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            document
                .save_to(&mut decrypted)
                .map_err(|e| DocumentError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data.to_vec()
        };

        if document.get_pages().is_empty() {
            return Err(DocumentError::NoPages);
        }

        debug!("Loaded PDF with {} pages", document.get_pages().len());
        Ok(Self {
            document,
            raw_data,
            page_texts: OnceCell::new(),
        })
    }

    fn page_texts(&self) -> Result<&[String]> {
        if let Some(texts) = self.page_texts.get() {
            return Ok(texts.as_slice());
        }
        let texts = pdf_extract::extract_text_from_mem_by_pages(&self.raw_data)
            .map_err(|e| DocumentError::TextExtraction(e.to_string()))?;
        debug!("Extracted text from {} pages", texts.len());
        Ok(self.page_texts.get_or_init(|| texts).as_slice())
    }

    fn page_id(&self, page: usize) -> Option<ObjectId> {
        let number = u32::try_from(page + 1).ok()?;
        self.document.get_pages().get(&number).copied()
    }

    /// Look up a page attribute, following `Parent` links for inherited keys.
    fn inherited<'a>(&'a self, node_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
        let mut current = Some(node_id);
        while let Some(id) = current {
            let dict = self.document.get_dictionary(id).ok()?;
            if let Ok(value) = dict.get(key) {
                return Some(value);
            }
            current = dict.get(b"Parent").and_then(Object::as_reference).ok();
        }
        None
    }

    fn resolve<'a>(&'a self, object: &'a Object) -> Option<&'a Object> {
        self.document.dereference(object).ok().map(|(_, obj)| obj)
    }

    fn page_size_points(&self, page_id: ObjectId) -> Option<(f32, f32)> {
        let media_box = self.resolve(self.inherited(page_id, b"MediaBox")?)?;
        let values: Vec<f32> = media_box
            .as_array()
            .ok()?
            .iter()
            .filter_map(|o| self.resolve(o).and_then(number_of))
            .collect();
        match values.as_slice() {
            [x0, y0, x1, y1] => Some(((x1 - x0).abs(), (y1 - y0).abs())),
            _ => None,
        }
    }

    /// Decode every raster XObject referenced by the page.
    fn page_images(&self, page_id: ObjectId) -> Vec<DynamicImage> {
        let Some(resources) = self
            .inherited(page_id, b"Resources")
            .and_then(|o| self.resolve(o))
            .and_then(|o| o.as_dict().ok())
        else {
            return Vec::new();
        };

        let Some(xobjects) = resources
            .get(b"XObject")
            .ok()
            .and_then(|o| self.resolve(o))
            .and_then(|o| o.as_dict().ok())
        else {
            return Vec::new();
        };

        xobjects
            .iter()
            .filter_map(|(_, reference)| self.resolve(reference))
            .filter_map(|object| self.decode_image(object))
            .collect()
    }

    fn decode_image(&self, object: &Object) -> Option<DynamicImage> {
        let Object::Stream(stream) = object else {
            return None;
        };
        let dict = &stream.dict;
        if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
            return None;
        }

        let width = dict.get(b"Width").ok()?.as_i64().ok()? as u32;
        let height = dict.get(b"Height").ok()?.as_i64().ok()? as u32;
        trace!("Found image object: {}x{}", width, height);

        match first_name(dict, b"Filter") {
            Some(b"DCTDecode") => {
                return image::load_from_memory_with_format(&stream.content, image::ImageFormat::Jpeg)
                    .ok();
            }
            Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
                trace!("Skipping image with unsupported filter");
                return None;
            }
            _ => {}
        }

        let bits = dict
            .get(b"BitsPerComponent")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(8);
        if bits != 8 {
            trace!("Unsupported bits per component: {}", bits);
            return None;
        }

        let data = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());
        let color_space = dict
            .get(b"ColorSpace")
            .ok()
            .and_then(|o| self.resolve(o))
            .and_then(|o| match o {
                Object::Name(name) => Some(name.as_slice()),
                Object::Array(items) => items.first().and_then(|o| o.as_name().ok()),
                _ => None,
            })
            .unwrap_or(b"DeviceRGB");

        raw_to_image(data, width, height, color_space)
    }
}

impl DocumentSource for PdfDocument {
    fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    fn page_text(&self, page: usize) -> Result<String> {
        if page >= self.page_count() {
            return Ok(String::new());
        }
        Ok(self.page_texts()?.get(page).cloned().unwrap_or_default())
    }

    fn render_page(&self, page: usize, dpi: u32) -> Result<Option<DynamicImage>> {
        let Some(page_id) = self.page_id(page) else {
            return Ok(None);
        };

        // Scanned policies carry one full-page raster; the largest image wins.
        let Some(image) = self
            .page_images(page_id)
            .into_iter()
            .max_by_key(|img| u64::from(img.width()) * u64::from(img.height()))
        else {
            debug!("Page {} has no raster content", page);
            return Ok(None);
        };

        let Some((width_pt, height_pt)) = self.page_size_points(page_id) else {
            return Ok(Some(image));
        };

        let scale = dpi as f32 / POINTS_PER_INCH;
        let target = (
            (width_pt * scale).round().max(1.0) as u32,
            (height_pt * scale).round().max(1.0) as u32,
        );
        if image.dimensions() == target {
            return Ok(Some(image));
        }

        debug!(
            "Rescaling page {} from {:?} to {:?} ({} dpi)",
            page,
            image.dimensions(),
            target,
            dpi
        );
        Ok(Some(image.resize_exact(target.0, target.1, FilterType::Lanczos3)))
    }
}

fn number_of(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

fn first_name<'a>(dict: &'a Dictionary, key: &[u8]) -> Option<&'a [u8]> {
    match dict.get(key).ok()? {
        Object::Name(name) => Some(name.as_slice()),
        Object::Array(items) => items.first().and_then(|o| o.as_name().ok()),
        _ => None,
    }
}

fn raw_to_image(data: Vec<u8>, width: u32, height: u32, color_space: &[u8]) -> Option<DynamicImage> {
    let pixels = (width as usize) * (height as usize);
    match color_space {
        b"DeviceRGB" | b"RGB" if data.len() >= pixels * 3 => {
            let mut data = data;
            data.truncate(pixels * 3);
            RgbImage::from_raw(width, height, data).map(DynamicImage::ImageRgb8)
        }
        b"DeviceGray" | b"G" if data.len() >= pixels => {
            let mut data = data;
            data.truncate(pixels);
            GrayImage::from_raw(width, height, data).map(DynamicImage::ImageLuma8)
        }
        _ => {
            trace!(
                "Could not decode image: data_len={}, colorspace={:?}",
                data.len(),
                String::from_utf8_lossy(color_space)
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_garbage() {
        let result = PdfDocument::from_bytes(b"not a pdf");
        assert!(matches!(result, Err(DocumentError::Parse(_))));
    }

    #[test]
    fn test_raw_gray_image() {
        let image = raw_to_image(vec![0, 64, 128, 255], 2, 2, b"DeviceGray").unwrap();
        assert_eq!(image.dimensions(), (2, 2));
        assert_eq!(image.to_luma8().get_pixel(1, 1)[0], 255);
    }

    #[test]
    fn test_raw_rgb_too_short() {
        assert!(raw_to_image(vec![0; 5], 2, 2, b"DeviceRGB").is_none());
    }
}
