//! Extraction record for one insurance policy document.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::extractor::rules::amounts::parse_amount;

/// Insurance type reported for every recognized policy.
pub const RCA_TYPE: &str = "RCA";

/// Outcome of processing a single document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    /// A template claimed the document and its fields were read.
    Processed,
    /// No template claimed the document.
    Unprocessed,
    /// The document could not be opened or an extractor failed hard.
    Unreadable,
}

/// Extraction result for one document. Every field is independently optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Short insurer code (e.g. `EUROINS`).
    pub insurer_short_name: Option<String>,

    /// Policy number.
    pub insurance_number: Option<String>,

    /// Bonus-Malus class.
    pub insurance_class: Option<String>,

    /// Date the contract was issued.
    pub contract_date: Option<NaiveDate>,

    /// First day of coverage.
    pub start_date: Option<NaiveDate>,

    /// Last day of coverage.
    pub expiration_date: Option<NaiveDate>,

    /// Insured person or company.
    pub person_name: Option<String>,

    /// Never present on the supported layouts.
    pub phone: Option<String>,

    /// Insurance type, `RCA` for every recognized policy.
    #[serde(rename = "type")]
    pub record_type: Option<String>,

    /// Vehicle registration plate.
    pub car_number: Option<String>,

    /// Coverage length in whole months.
    pub coverage_months: Option<i32>,

    /// Premium as printed on the policy, cleaned of scan noise.
    pub premium_amount: Option<String>,

    /// Path of the source document.
    pub source_path: PathBuf,

    /// How the record was produced.
    pub status: RecordStatus,

    /// Reason attached to unreadable records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Record {
    /// Empty processed record for `source_path`, to be filled by an extractor.
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        Self {
            insurer_short_name: None,
            insurance_number: None,
            insurance_class: None,
            contract_date: None,
            start_date: None,
            expiration_date: None,
            person_name: None,
            phone: None,
            record_type: None,
            car_number: None,
            coverage_months: None,
            premium_amount: None,
            source_path: source_path.into(),
            status: RecordStatus::Processed,
            error: None,
        }
    }

    /// Degraded record for a document no template claimed.
    pub fn unprocessed(source_path: impl Into<PathBuf>) -> Self {
        Self {
            status: RecordStatus::Unprocessed,
            ..Self::new(source_path)
        }
    }

    /// Degraded record for a document that could not be read.
    pub fn unreadable(source_path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self {
            status: RecordStatus::Unreadable,
            error: Some(reason.into()),
            ..Self::new(source_path)
        }
    }

    /// Whether a template claimed this document.
    pub fn is_processed(&self) -> bool {
        self.status == RecordStatus::Processed
    }

    /// Source path as shown in reports.
    pub fn source(&self) -> &Path {
        &self.source_path
    }

    /// Premium parsed as a decimal (`1.234,56`, `1 234,56`, `1234.56`).
    pub fn premium_value(&self) -> Option<Decimal> {
        self.premium_amount.as_deref().and_then(parse_amount)
    }
}

/// Sort records by client name ascending; records without a name go last.
pub fn sort_by_client_name(records: &mut [Record]) {
    records.sort_by(|a, b| match (&a.person_name, &b.person_name) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
