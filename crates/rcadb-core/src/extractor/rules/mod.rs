//! Rule-based field extraction over recognized or embedded text.

pub mod amounts;
pub mod dates;
pub mod patterns;
pub mod plates;
pub mod text;

pub use amounts::parse_amount;
pub use dates::{coverage_months, find_date, format_short, parse_date_parts};
pub use patterns::is_rca;
pub use plates::{find_plate, find_plate_in_crop};
pub use text::{clean_text, compact, Transform};

use chrono::NaiveDate;
use regex::Regex;

use crate::error::ExtractionError;

/// Uncompiled pattern as written in a template manifest.
#[derive(Debug, Clone, Copy)]
pub enum PatternSpec {
    /// Capture `group` of `regex`, then apply `transform`.
    Capture {
        regex: &'static str,
        group: usize,
        transform: Transform,
    },
    /// Groups 1, 2 and 3 are day, month and year.
    Date(&'static str),
    /// The whole source text.
    Whole(Transform),
    /// Plate delimited by whitespace in free text.
    Plate,
    /// Plate in a plate-only crop.
    CroppedPlate,
}

impl PatternSpec {
    /// Capture group 1 and clean it.
    pub const fn clean(regex: &'static str) -> Self {
        PatternSpec::Capture {
            regex,
            group: 1,
            transform: Transform::Clean,
        }
    }

    /// Capture `group` and trim it.
    pub const fn trim(regex: &'static str, group: usize) -> Self {
        PatternSpec::Capture {
            regex,
            group,
            transform: Transform::Trim,
        }
    }
}

/// A compiled pattern.
#[derive(Debug, Clone)]
pub enum FieldRule {
    Capture {
        regex: Regex,
        group: usize,
        transform: Transform,
    },
    Date(Regex),
    Whole(Transform),
    Plate,
    CroppedPlate,
}

impl FieldRule {
    /// Compile a manifest pattern.
    pub fn compile(spec: &PatternSpec) -> Result<Self, regex::Error> {
        Ok(match *spec {
            PatternSpec::Capture {
                regex,
                group,
                transform,
            } => FieldRule::Capture {
                regex: Regex::new(regex)?,
                group,
                transform,
            },
            PatternSpec::Date(regex) => FieldRule::Date(Regex::new(regex)?),
            PatternSpec::Whole(transform) => FieldRule::Whole(transform),
            PatternSpec::Plate => FieldRule::Plate,
            PatternSpec::CroppedPlate => FieldRule::CroppedPlate,
        })
    }

    /// Text value of `field` in `text`.
    pub fn text(&self, field: &str, text: &str) -> Result<String, ExtractionError> {
        let not_found = || ExtractionError::FieldNotFound {
            field: field.to_string(),
        };
        let value = match self {
            FieldRule::Capture {
                regex,
                group,
                transform,
            } => regex
                .captures(text)
                .and_then(|caps| caps.get(*group))
                .and_then(|m| transform.apply(m.as_str())),
            FieldRule::Whole(transform) => transform.apply(text),
            FieldRule::Plate => find_plate(text),
            FieldRule::CroppedPlate => find_plate_in_crop(text),
            FieldRule::Date(_) => None,
        };
        value.ok_or_else(not_found)
    }

    /// Date value of `field` in `text`.
    pub fn date(&self, field: &str, text: &str) -> Result<NaiveDate, ExtractionError> {
        match self {
            FieldRule::Date(regex) => find_date(field, regex, text),
            _ => Err(ExtractionError::FieldNotFound {
                field: field.to_string(),
            }),
        }
    }
}
