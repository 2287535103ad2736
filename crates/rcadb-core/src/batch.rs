//! Per-document pipeline shared by batch workers.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::document::{DocumentOpener, FileOpener};
use crate::error::ExtractionError;
use crate::extractor::{Dispatcher, DocumentContext, Registry};
use crate::models::{RcadbConfig, Record};
use crate::ocr::{OcrEngine, OcrProfile, TesseractCli};
use crate::template::{TemplateMatcher, TemplateStore};

/// Everything needed to turn a path into a record. Cheap to clone.
#[derive(Clone)]
pub struct Pipeline {
    dispatcher: Dispatcher,
    ocr: Arc<dyn OcrEngine>,
    opener: Arc<dyn DocumentOpener>,
    templates: Arc<TemplateStore>,
    matcher: Arc<TemplateMatcher>,
    ocr_profile: Arc<OcrProfile>,
    render_dpi: u32,
}

impl Pipeline {
    /// Pipeline with default matching, OCR profile and resolution.
    pub fn new(registry: Registry, ocr: Arc<dyn OcrEngine>, opener: Arc<dyn DocumentOpener>) -> Self {
        Self {
            dispatcher: Dispatcher::new(registry),
            ocr,
            opener,
            templates: Arc::new(TemplateStore::new()),
            matcher: Arc::new(TemplateMatcher::new()),
            ocr_profile: Arc::new(OcrProfile::default()),
            render_dpi: 600,
        }
    }

    /// Built-in templates, tesseract and file-system documents.
    pub fn from_config(config: &RcadbConfig) -> crate::Result<Self> {
        let registry = Registry::builtin()?;
        let ocr = TesseractCli::new(&config.ocr.tesseract_path)?;
        if !ocr.is_available() {
            warn!(
                "{} not runnable; raster templates will fail",
                config.ocr.tesseract_path.display()
            );
        }
        let templates = TemplateStore::load_dir(&config.templates.resource_dir)?;

        Ok(Self::new(registry, Arc::new(ocr), Arc::new(FileOpener))
            .with_templates(templates)
            .with_matcher(TemplateMatcher::from_config(&config.matching))
            .with_ocr_profile(OcrProfile::new(config.ocr.clone()))
            .with_render_dpi(config.document.render_dpi))
    }

    pub fn with_templates(mut self, templates: TemplateStore) -> Self {
        self.templates = Arc::new(templates);
        self
    }

    pub fn with_matcher(mut self, matcher: TemplateMatcher) -> Self {
        self.matcher = Arc::new(matcher);
        self
    }

    pub fn with_ocr_profile(mut self, profile: OcrProfile) -> Self {
        self.ocr_profile = Arc::new(profile);
        self
    }

    pub fn with_render_dpi(mut self, dpi: u32) -> Self {
        self.render_dpi = dpi;
        self
    }

    pub fn registry(&self) -> &Registry {
        self.dispatcher.registry()
    }

    /// Process one document. Never fails: open errors and panics while
    /// opening or extracting become an unreadable record for this document only.
    pub fn process_path(&self, path: &Path) -> Record {
        match catch_unwind(AssertUnwindSafe(|| self.open_and_dispatch(path))) {
            Ok(record) => record,
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                error!("Processing panicked on {}: {}", path.display(), reason);
                Record::unreadable(path, reason)
            }
        }
    }

    fn open_and_dispatch(&self, path: &Path) -> Record {
        let document = match self.opener.open(path) {
            Ok(document) => document,
            Err(e) => {
                let err = ExtractionError::UnreadableDocument {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                };
                warn!("{}", err);
                return Record::unreadable(path, e.to_string());
            }
        };

        let ctx = DocumentContext {
            source_path: path,
            document: document.as_ref(),
            ocr: self.ocr.as_ref(),
            ocr_profile: &self.ocr_profile,
            templates: &self.templates,
            matcher: &self.matcher,
            render_dpi: self.render_dpi,
        };
        self.dispatcher.dispatch(&ctx)
    }

    /// Process paths in order, one record per path.
    pub fn process_paths(&self, paths: &[PathBuf]) -> Vec<Record> {
        debug!("Worker processing {} documents", paths.len());
        let records: Vec<Record> = paths.iter().map(|p| self.process_path(p)).collect();
        let processed = records.iter().filter(|r| r.is_processed()).count();
        info!("Worker finished: {}/{} processed", processed, records.len());
        records
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "document processing panicked".to_string()
    }
}

/// Split `items` into `groups` contiguous, near-even groups.
///
/// Some groups are empty when there are fewer items than groups.
pub fn partition<T: Clone>(items: &[T], groups: usize) -> Vec<Vec<T>> {
    let groups = groups.max(1);
    let len = items.len();
    (0..groups)
        .map(|i| items[i * len / groups..(i + 1) * len / groups].to_vec())
        .collect()
}
