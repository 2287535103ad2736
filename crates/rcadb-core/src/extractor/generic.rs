//! One extractor type driven by a compiled manifest.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use super::manifest::{CompiledTemplate, Field, Layout, Source};
use super::rules::is_rca;
use super::{DocumentContext, Extractor};
use crate::error::ExtractionError;

/// Extractor for any manifest. Holds the text it gathered at construction.
#[derive(Debug)]
pub struct ManifestExtractor {
    template: Arc<CompiledTemplate>,
    page_text: String,
    regions: HashMap<&'static str, String>,
    matched: bool,
}

impl ManifestExtractor {
    /// Gather text from `ctx` the way the manifest's layout prescribes.
    pub fn open(template: Arc<CompiledTemplate>, ctx: &DocumentContext<'_>) -> crate::Result<Self> {
        match template.manifest().layout {
            Layout::Text(layout) => Self::from_text(template, &layout, ctx),
            Layout::Raster(layout) => Self::from_raster(template, &layout, ctx),
        }
    }

    pub(super) fn with_texts(
        template: Arc<CompiledTemplate>,
        page_text: String,
        regions: HashMap<&'static str, String>,
    ) -> Self {
        Self {
            template,
            page_text,
            regions,
            matched: false,
        }
    }

    /// Evaluate and remember the classification over the text held so far.
    pub(super) fn settle_classification(&mut self) -> bool {
        let manifest = self.template.manifest();
        let marked = is_rca(self.source_text(manifest.marker));
        let insurer = self.insurer_name();
        self.matched = marked && insurer.as_deref() == Some(manifest.insurer_name);
        debug!(
            "{}: marker={} insurer={:?} -> {}",
            manifest.short_name, marked, insurer, self.matched
        );
        self.matched
    }

    pub(super) fn regions_mut(&mut self) -> &mut HashMap<&'static str, String> {
        &mut self.regions
    }

    pub fn template_name(&self) -> &'static str {
        self.template.name()
    }

    fn source_text(&self, source: Source) -> &str {
        match source {
            Source::Page => &self.page_text,
            Source::Region(name) => self.regions.get(name).map_or("", String::as_str),
        }
    }

    fn text_field(&self, field: Field) -> Option<String> {
        let compiled = self.template.rule(field)?;
        match compiled.rule.text(field.name(), self.source_text(compiled.source)) {
            Ok(value) => Some(value),
            Err(e) => {
                self.log_miss(&e);
                None
            }
        }
    }

    fn date_field(&self, field: Field) -> Option<NaiveDate> {
        let compiled = self.template.rule(field)?;
        match compiled.rule.date(field.name(), self.source_text(compiled.source)) {
            Ok(value) => Some(value),
            Err(e) => {
                self.log_miss(&e);
                None
            }
        }
    }

    fn log_miss(&self, error: &ExtractionError) {
        debug!("{}: {}", self.template.name(), error);
    }
}

impl Extractor for ManifestExtractor {
    fn classify(&self) -> bool {
        self.matched
    }

    fn insurer_short_name(&self) -> Option<String> {
        Some(self.template.name().to_string())
    }

    fn insurer_name(&self) -> Option<String> {
        self.text_field(Field::InsurerName)
    }

    fn insurance_number(&self) -> Option<String> {
        self.text_field(Field::InsuranceNumber)
    }

    fn insurance_class(&self) -> Option<String> {
        self.text_field(Field::InsuranceClass)
    }

    fn contract_date(&self) -> Option<NaiveDate> {
        self.date_field(Field::ContractDate)
    }

    fn start_date(&self) -> Option<NaiveDate> {
        self.date_field(Field::StartDate)
    }

    fn expiration_date(&self) -> Option<NaiveDate> {
        self.date_field(Field::ExpirationDate)
    }

    fn person_name(&self) -> Option<String> {
        self.text_field(Field::PersonName)
    }

    fn car_number(&self) -> Option<String> {
        self.text_field(Field::CarNumber)
    }

    fn premium_amount(&self) -> Option<String> {
        self.text_field(Field::PremiumAmount)
    }
}
