//! Per-insurer policy extraction.
//!
//! An [`Extractor`] is built fresh for one (document, template) attempt. Its
//! constructor performs all text and OCR work up front, after which the
//! dispatcher only queries it.

mod dispatcher;
mod generic;
pub mod manifest;
mod raster;
mod registry;
pub mod rules;
mod text;
pub mod vendors;

pub use dispatcher::Dispatcher;
pub use generic::ManifestExtractor;
pub use manifest::{CompiledTemplate, Field, TemplateManifest};
pub use registry::{ExtractorFactory, Registry, RegistryBuilder};

use std::path::Path;

use chrono::NaiveDate;

use crate::document::DocumentSource;
use crate::models::{Record, RCA_TYPE};
use crate::ocr::{OcrEngine, OcrProfile};
use crate::template::{TemplateMatcher, TemplateStore};

/// Collaborators available while constructing an extractor.
#[derive(Clone, Copy)]
pub struct DocumentContext<'a> {
    pub source_path: &'a Path,
    pub document: &'a dyn DocumentSource,
    pub ocr: &'a dyn OcrEngine,
    pub ocr_profile: &'a OcrProfile,
    pub templates: &'a TemplateStore,
    pub matcher: &'a TemplateMatcher,
    pub render_dpi: u32,
}

impl DocumentContext<'_> {
    /// File name of the source, for cheap pre-filters.
    pub fn file_name(&self) -> &str {
        self.source_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }
}

/// One insurer's view of a document.
pub trait Extractor {
    /// Whether the document belongs to this insurer.
    fn classify(&self) -> bool;

    fn insurer_short_name(&self) -> Option<String>;
    fn insurer_name(&self) -> Option<String>;
    fn insurance_number(&self) -> Option<String>;
    fn insurance_class(&self) -> Option<String>;
    fn contract_date(&self) -> Option<NaiveDate>;
    fn start_date(&self) -> Option<NaiveDate>;
    fn expiration_date(&self) -> Option<NaiveDate>;
    fn person_name(&self) -> Option<String>;
    fn car_number(&self) -> Option<String>;
    fn premium_amount(&self) -> Option<String>;

    /// Insurance type, the same for every supported policy.
    fn record_type(&self) -> Option<String> {
        Some(RCA_TYPE.to_string())
    }

    /// No supported layout prints a phone number.
    fn phone(&self) -> Option<String> {
        None
    }

    fn coverage_months(&self) -> Option<i32> {
        rules::coverage_months(self.expiration_date(), self.start_date())
    }

    /// Read every field into a record.
    fn to_record(&self, source_path: &Path) -> Record {
        Record {
            insurer_short_name: self.insurer_short_name(),
            insurance_number: self.insurance_number(),
            insurance_class: self.insurance_class(),
            contract_date: self.contract_date(),
            start_date: self.start_date(),
            expiration_date: self.expiration_date(),
            person_name: self.person_name(),
            phone: self.phone(),
            record_type: self.record_type(),
            car_number: self.car_number(),
            coverage_months: self.coverage_months(),
            premium_amount: self.premium_amount(),
            ..Record::new(source_path)
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Fakes shared by extractor, dispatcher and batch tests.

    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    use image::{DynamicImage, GenericImageView};

    use crate::error::OcrError;
    use crate::ocr::{OcrEngine, OcrRequest};

    pub const EUROINS_TEXT: &str = "\
POLITA DE ASIGURARE OBLIGATORIE AUTO RCA
EUROINS ROMÂNIA ASIGURARE REASIGURARE S.A. R.C.A.
Seria RO/16/H16/DV Nr. 123456789
Nume/Denumire Asigurat/ POPESCU ION Fel, Tip, Marca
Nr. de inmatriculare: CJ07ABC Serie sasiu UU1
Clasa Bonus-Malus: B8,  Tarif de decontare
Valabilitate Contract de la 01.03.2022 până la: 28.02.2023 Contract emis în data de: 25.02.2022 10:15:
Prima de asigurare: 1.234,56 Lei, achitata integral
";

    pub const CITY_TEXT: &str = "\
POLITA AUTO RCA
DENUMIRE ASIGURATOR: CITY INSURANCE S.A. R.C.A.
Seria RO25C25HP Nr. 987654321
Nume/Denumire Asigurat Fel, Tip, Marca Model
IONESCU MARIA
Numar de inmatriculare B123ABC autoturism
Clasa Bonus-Malus B4
Valabilitate Contract de la 01/04/2022 pana la 31/03/2023 Contract emis in data de 30/03/2022, ora 12:00
Prima totala 850,00 Lei
";

    /// Answers by crop size, so each region of a layout gets its own text.
    /// Several answers for one size are handed out in order, the last one
    /// repeating.
    #[derive(Default)]
    pub struct SizeKeyedOcr {
        answers: Mutex<HashMap<(u32, u32), VecDeque<String>>>,
        pub calls: Mutex<Vec<(u32, u32)>>,
    }

    impl SizeKeyedOcr {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn answer(self, size: (u32, u32), text: &str) -> Self {
            self.answers
                .lock()
                .unwrap()
                .entry(size)
                .or_default()
                .push_back(text.to_string());
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl OcrEngine for SizeKeyedOcr {
        fn recognize(&self, image: &DynamicImage, _request: &OcrRequest) -> Result<String, OcrError> {
            let size = image.dimensions();
            self.calls.lock().unwrap().push(size);
            let mut answers = self.answers.lock().unwrap();
            let Some(queue) = answers.get_mut(&size) else {
                return Ok(String::new());
            };
            let text = if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            };
            Ok(text.unwrap_or_default())
        }
    }

    /// Fails every call, for documents that must never reach OCR.
    pub struct NoOcr;

    impl OcrEngine for NoOcr {
        fn recognize(&self, _image: &DynamicImage, _request: &OcrRequest) -> Result<String, OcrError> {
            Err(OcrError::Spawn("OCR not expected in this test".to_string()))
        }
    }
}
