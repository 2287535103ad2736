//! Declarative per-insurer layout descriptions and their compiled form.

use std::collections::HashMap;

use crate::error::TemplateError;
use crate::ocr::OcrKind;
use crate::template::{Offsets, PAGE_TOP_LEFT};

use super::rules::{FieldRule, PatternSpec};

/// Fields a template can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    InsurerName,
    InsuranceNumber,
    InsuranceClass,
    ContractDate,
    StartDate,
    ExpirationDate,
    PersonName,
    CarNumber,
    PremiumAmount,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Field::InsurerName => "insurer_name",
            Field::InsuranceNumber => "insurance_number",
            Field::InsuranceClass => "insurance_class",
            Field::ContractDate => "contract_date",
            Field::StartDate => "start_date",
            Field::ExpirationDate => "expiration_date",
            Field::PersonName => "person_name",
            Field::CarNumber => "car_number",
            Field::PremiumAmount => "premium_amount",
        }
    }

    pub fn is_date(self) -> bool {
        matches!(
            self,
            Field::ContractDate | Field::StartDate | Field::ExpirationDate
        )
    }
}

/// Where a rule reads its text from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Embedded text of the layout's page.
    Page,
    /// OCR text of a named crop region.
    Region(&'static str),
}

/// When a raster region is recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Before `classify()`; keep these few and small.
    Classify,
    /// Only after the page classified as a match.
    Fields,
}

/// Reference bitmap located on the page to define a named anchor.
#[derive(Debug, Clone, Copy)]
pub struct AnchorSpec {
    pub name: &'static str,
    pub reference: &'static str,
}

/// Crop region relative to an anchor.
#[derive(Debug, Clone, Copy)]
pub struct RegionSpec {
    pub name: &'static str,
    pub anchor: &'static str,
    pub offsets: Offsets,
    pub kind: OcrKind,
    pub phase: Phase,
}

impl RegionSpec {
    pub const fn new(
        name: &'static str,
        anchor: &'static str,
        offsets: Offsets,
        kind: OcrKind,
        phase: Phase,
    ) -> Self {
        Self {
            name,
            anchor,
            offsets,
            kind,
            phase,
        }
    }
}

/// A field rule as written in a manifest.
#[derive(Debug, Clone, Copy)]
pub struct RuleSpec {
    pub field: Field,
    pub source: Source,
    pub pattern: PatternSpec,
}

impl RuleSpec {
    pub const fn new(field: Field, source: Source, pattern: PatternSpec) -> Self {
        Self {
            field,
            source,
            pattern,
        }
    }
}

/// Layout read from embedded page text.
#[derive(Debug, Clone, Copy)]
pub struct TextLayout {
    /// Zero-based page holding the policy text.
    pub page: usize,
    /// Case-insensitive file-name tokens; empty means always read the page.
    pub prefilter: &'static [&'static str],
}

/// Layout read by OCR from a rendered page.
#[derive(Debug, Clone, Copy)]
pub struct RasterLayout {
    /// Candidate pages, tried in order.
    pub pages: &'static [usize],
    pub anchors: &'static [AnchorSpec],
    pub regions: &'static [RegionSpec],
}

#[derive(Debug, Clone, Copy)]
pub enum Layout {
    Text(TextLayout),
    Raster(RasterLayout),
}

/// Everything needed to recognize one insurer's policy.
#[derive(Debug, Clone, Copy)]
pub struct TemplateManifest {
    /// Short insurer code, also the template name.
    pub short_name: &'static str,
    /// Exact insurer name a matching document yields.
    pub insurer_name: &'static str,
    /// Text that must carry the RCA marker.
    pub marker: Source,
    pub layout: Layout,
    pub rules: &'static [RuleSpec],
}

#[derive(Debug)]
pub(crate) struct CompiledRule {
    pub source: Source,
    pub rule: FieldRule,
}

/// A manifest with its regexes compiled and its geometry checked.
#[derive(Debug)]
pub struct CompiledTemplate {
    manifest: &'static TemplateManifest,
    rules: HashMap<Field, CompiledRule>,
}

impl CompiledTemplate {
    /// Compile regexes and check that every region and anchor reference resolves.
    pub fn compile(manifest: &'static TemplateManifest) -> Result<Self, TemplateError> {
        let invalid = |reason: String| TemplateError::Pattern {
            template: manifest.short_name.to_string(),
            reason,
        };

        let has_source = |source: Source| match (source, &manifest.layout) {
            (Source::Page, Layout::Text(_)) => true,
            (Source::Region(name), Layout::Raster(raster)) => {
                raster.regions.iter().any(|r| r.name == name)
            }
            _ => false,
        };

        if let Layout::Raster(raster) = &manifest.layout {
            for region in raster.regions {
                let known = region.anchor == PAGE_TOP_LEFT
                    || raster.anchors.iter().any(|a| a.name == region.anchor);
                if !known {
                    return Err(invalid(format!(
                        "region {} uses undeclared anchor {}",
                        region.name, region.anchor
                    )));
                }
            }
        }

        if !has_source(manifest.marker) {
            return Err(invalid(format!("marker source {:?} is not available", manifest.marker)));
        }

        let mut rules = HashMap::new();
        for spec in manifest.rules {
            if !has_source(spec.source) {
                return Err(invalid(format!(
                    "{} reads from unavailable source {:?}",
                    spec.field.name(),
                    spec.source
                )));
            }
            if spec.field.is_date() != matches!(spec.pattern, PatternSpec::Date(_)) {
                return Err(invalid(format!(
                    "{} needs a {} pattern",
                    spec.field.name(),
                    if spec.field.is_date() { "date" } else { "text" }
                )));
            }
            let rule = FieldRule::compile(&spec.pattern)
                .map_err(|e| invalid(format!("{}: {}", spec.field.name(), e)))?;
            rules.insert(
                spec.field,
                CompiledRule {
                    source: spec.source,
                    rule,
                },
            );
        }

        if !rules.contains_key(&Field::InsurerName) {
            return Err(invalid("no insurer_name rule".to_string()));
        }

        Ok(Self { manifest, rules })
    }

    pub fn name(&self) -> &'static str {
        self.manifest.short_name
    }

    pub fn manifest(&self) -> &'static TemplateManifest {
        self.manifest
    }

    pub(crate) fn rule(&self, field: Field) -> Option<&CompiledRule> {
        self.rules.get(&field)
    }
}
