//! Core library for Romanian RCA policy extraction.
//!
//! This crate provides:
//! - Document sources (PDF text and embedded scans, plain images)
//! - A tesseract-backed OCR adapter
//! - Reference-bitmap template matching and anchor geometry
//! - Per-insurer extractors driven by declarative manifests
//! - A first-match dispatcher and a batch pipeline producing flat records

pub mod batch;
pub mod document;
pub mod error;
pub mod extractor;
pub mod models;
pub mod ocr;
pub mod template;

pub use batch::{partition, Pipeline};
pub use document::{DocumentOpener, DocumentSource, FileOpener, MemoryDocument, PdfDocument};
pub use error::{RcadbError, Result};
pub use extractor::{Dispatcher, DocumentContext, Extractor, Registry};
pub use models::{sort_by_client_name, RcadbConfig, Record, RecordStatus};
pub use ocr::{OcrEngine, TesseractCli};
pub use template::{TemplateMatcher, TemplateStore};
