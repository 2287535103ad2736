//! Error types for the rcadb-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the rcadb library.
#[derive(Error, Debug)]
pub enum RcadbError {
    /// Document source error.
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// OCR engine error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Template resource or matching error.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// Field extraction or classification error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),
}

/// Errors raised while opening or reading a document.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// Failed to open/parse the file.
    #[error("failed to parse document: {0}")]
    Parse(String),

    /// Failed to extract embedded text.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The document is encrypted with a non-empty password.
    #[error("document is encrypted")]
    Encrypted,

    /// The document has no pages.
    #[error("document has no pages")]
    NoPages,

    /// File extension not handled by any opener.
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),
}

/// Errors raised by an OCR engine.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The OCR executable could not be started.
    #[error("failed to start OCR engine: {0}")]
    Spawn(String),

    /// The OCR engine ran but reported a failure.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Invalid image region handed to the engine.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// Temporary file handling failed.
    #[error("temporary file error: {0}")]
    TempFile(String),
}

/// Errors related to reference bitmaps and anchor resolution.
#[derive(Error, Debug)]
pub enum TemplateError {
    /// A reference bitmap could not be decoded.
    #[error("failed to load reference bitmap {name}: {reason}")]
    Load { name: String, reason: String },

    /// A region refers to an anchor that was never resolved.
    #[error("unresolved anchor: {0}")]
    UnresolvedAnchor(String),

    /// A regex in a template manifest failed to compile.
    #[error("invalid pattern in template {template}: {reason}")]
    Pattern { template: String, reason: String },
}

/// Errors produced while classifying a document or reading its fields.
///
/// None of these are fatal beyond a single document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// A field pattern did not match.
    #[error("field not found: {field}")]
    FieldNotFound { field: String },

    /// The template determined the document belongs to another insurer.
    #[error("template {template} does not match the document")]
    TemplateNotMatched { template: String },

    /// No registered template claims the document.
    #[error("unrecognized document: {}", path.display())]
    UnrecognizedDocument { path: PathBuf },

    /// Day/month/year captured but not a calendar date.
    #[error("invalid date components for {field}: {day}.{month}.{year}")]
    InvalidDateComponents {
        field: String,
        day: String,
        month: String,
        year: String,
    },

    /// The source file could not be opened or parsed.
    #[error("unreadable document {}: {reason}", path.display())]
    UnreadableDocument { path: PathBuf, reason: String },
}

/// Result type for the rcadb library.
pub type Result<T> = std::result::Result<T, RcadbError>;
