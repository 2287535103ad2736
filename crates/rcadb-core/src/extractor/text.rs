//! Construction from embedded page text.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::manifest::{CompiledTemplate, TextLayout};
use super::{DocumentContext, ManifestExtractor};

impl ManifestExtractor {
    /// Read the layout's page text once and classify it.
    ///
    /// A file name that fails the pre-filter yields an extractor that does
    /// not classify, without touching the document.
    pub(super) fn from_text(
        template: Arc<CompiledTemplate>,
        layout: &TextLayout,
        ctx: &DocumentContext<'_>,
    ) -> crate::Result<Self> {
        if !passes_prefilter(layout.prefilter, ctx.file_name()) {
            debug!("{}: file name {} fails pre-filter", template.name(), ctx.file_name());
            return Ok(Self::with_texts(template, String::new(), HashMap::new()));
        }

        let text = ctx.document.page_text(layout.page)?;
        debug!("{}: page {} has {} chars of text", template.name(), layout.page, text.len());

        let mut extractor = Self::with_texts(template, text, HashMap::new());
        extractor.settle_classification();
        Ok(extractor)
    }
}

fn passes_prefilter(tokens: &[&str], file_name: &str) -> bool {
    if tokens.is_empty() {
        return true;
    }
    let file_name = file_name.to_uppercase();
    tokens
        .iter()
        .any(|token| file_name.contains(&token.to_uppercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use image::DynamicImage;

    use crate::document::{self, DocumentSource, MemoryDocument};
    use crate::error::DocumentError;
    use crate::extractor::testing::{NoOcr, CITY_TEXT, EUROINS_TEXT};
    use crate::extractor::vendors;
    use crate::extractor::{Extractor, TemplateManifest};
    use crate::ocr::OcrProfile;
    use crate::template::{TemplateMatcher, TemplateStore};

    const GRAWE_TEXT: &str = "\
Asigurare AUTO RCA
GRAWE România Asigurare SA R.C.A.
Seria GR Nr. 555111
Nume/Denumire Asigurat: VASILE GEORGE Fel, Tip, Marcă
Autoturism IS12XYZ Dacia
Clasă Bonus-Malus B0
Valabilitate Contract de la 15.01.2022 până la 14.01.2023 Contract emis în data de 10.01.2022
Primă de asigurare 1 020,00 Lei
";

    const ASIROM_TEXT: &str = "\
AUTO RCA
Asigurarea Romaneasca - ASIROM VIENNA INSURANCE GROUP S.A.
XZ123456 B-dul Carol I nr. 31-33
Nume/Denumire Asigurat: DINU ANDREI Fel, Tip, Marca
Numar inmatriculare BV22KLM valabil
Clasă  Bonus-Malus: B2 Prima de asigurare: 700,00 Lei
Valabilitate Contract  de la 01.06.2022 pâna la: 31.05.2023 Contract emis în data de 30.05.2022 ora 09:00
";

    const GENERALI_TEXT: &str = "\
GENERALI ROMANIA ASIGURARE REASIGURARE S.A.
Polita AUTO RCA
Seria RO05M3NP nr. 4444
Nume/Denumire DUMITRU ANA Fel, Tip, Marca
Nr. inmatriculare AG33BCD Ford
Clasa Bonus-Malus: B1
Valabilitate Contract de la 01.09.2022 pana la 31.08.2023 Contract emis in data de 20.08.2022
Prima de asigurare: 560,00 Lei
";

    const OMNIASIG_TEXT: &str = "\
Polita AUTO RCA
OMNIASIG VIENNA INSURANCE GROUP S.A. R.C.A.
Seria OM Nr. 777
Nume/Denumire Asigurat: STAN ELENA Fel, Tip, Marcă, Model
Vehicul CT44PQR Skoda
Primă de asigurare 640,00 Lei Clasă Bonus Malus B3 Tarif de decontare
Valabilitate Contract de la 01-10-2022 până la 30-09-2023 Contract emis în data de 28-09-2022
";

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn extract(
        manifest: &'static TemplateManifest,
        file_name: &str,
        document: &MemoryDocument,
    ) -> crate::Result<ManifestExtractor> {
        let template = Arc::new(CompiledTemplate::compile(manifest).unwrap());
        let templates = TemplateStore::new();
        let matcher = TemplateMatcher::new();
        let profile = OcrProfile::default();
        let ctx = DocumentContext {
            source_path: Path::new(file_name),
            document,
            ocr: &NoOcr,
            ocr_profile: &profile,
            templates: &templates,
            matcher: &matcher,
            render_dpi: 600,
        };
        ManifestExtractor::open(template, &ctx)
    }

    fn single_page(text: &str) -> MemoryDocument {
        MemoryDocument::from_texts([text])
    }

    #[test]
    fn test_euroins_round_trip() {
        let e = extract(&vendors::EUROINS, "EUROINS_RO16H16DV.pdf", &single_page(EUROINS_TEXT)).unwrap();

        assert!(e.classify());
        assert_eq!(e.insurer_short_name().as_deref(), Some("EUROINS"));
        assert_eq!(e.insurance_number().as_deref(), Some("123456789"));
        assert_eq!(e.insurance_class().as_deref(), Some("B8"));
        assert_eq!(e.start_date(), date(2022, 3, 1));
        assert_eq!(e.expiration_date(), date(2023, 2, 28));
        assert_eq!(e.contract_date(), date(2022, 2, 25));
        assert_eq!(e.person_name().as_deref(), Some("POPESCU ION"));
        assert_eq!(e.car_number().as_deref(), Some("CJ07ABC"));
        assert_eq!(e.premium_amount().as_deref(), Some("1.234,56"));
        assert_eq!(e.coverage_months(), Some(11));
        assert_eq!(e.record_type().as_deref(), Some("RCA"));
        assert_eq!(e.phone(), None);
    }

    #[test]
    fn test_city_round_trip() {
        let e = extract(&vendors::CITY, "city-policy.pdf", &single_page(CITY_TEXT)).unwrap();

        assert!(e.classify());
        assert_eq!(e.insurer_name().as_deref(), Some("CITY INSURANCE S.A."));
        assert_eq!(e.insurance_number().as_deref(), Some("987654321"));
        assert_eq!(e.insurance_class().as_deref(), Some("B4"));
        assert_eq!(e.start_date(), date(2022, 4, 1));
        assert_eq!(e.expiration_date(), date(2023, 3, 31));
        assert_eq!(e.contract_date(), date(2022, 3, 30));
        assert_eq!(e.person_name().as_deref(), Some("IONESCU MARIA"));
        assert_eq!(e.car_number().as_deref(), Some("B123ABC"));
        assert_eq!(e.premium_amount().as_deref(), Some("850,00"));
    }

    #[test]
    fn test_grawe_round_trip() {
        let e = extract(&vendors::GRAWE, "scan_001.pdf", &single_page(GRAWE_TEXT)).unwrap();

        assert!(e.classify());
        assert_eq!(e.insurance_number().as_deref(), Some("555111"));
        assert_eq!(e.insurance_class().as_deref(), Some("B0"));
        assert_eq!(e.start_date(), date(2022, 1, 15));
        assert_eq!(e.expiration_date(), date(2023, 1, 14));
        assert_eq!(e.contract_date(), date(2022, 1, 10));
        assert_eq!(e.person_name().as_deref(), Some("VASILE GEORGE"));
        assert_eq!(e.car_number().as_deref(), Some("IS12XYZ"));
        assert_eq!(e.premium_amount().as_deref(), Some("1 020,00"));
    }

    #[test]
    fn test_asirom_round_trip() {
        let e = extract(&vendors::ASIROM, "XZ123456.pdf", &single_page(ASIROM_TEXT)).unwrap();

        assert!(e.classify());
        assert_eq!(e.insurance_number().as_deref(), Some("XZ123456"));
        assert_eq!(e.insurance_class().as_deref(), Some("B2"));
        assert_eq!(e.start_date(), date(2022, 6, 1));
        assert_eq!(e.expiration_date(), date(2023, 5, 31));
        assert_eq!(e.contract_date(), date(2022, 5, 30));
        assert_eq!(e.person_name().as_deref(), Some("DINU ANDREI"));
        assert_eq!(e.car_number().as_deref(), Some("BV22KLM"));
        assert_eq!(e.premium_amount().as_deref(), Some("700,00"));
    }

    #[test]
    fn test_generali_reads_fifth_page() {
        let document = MemoryDocument::from_texts(["cover", "terms", "terms", "terms", GENERALI_TEXT]);
        let e = extract(&vendors::GENERALI, "Generali_2022.pdf", &document).unwrap();

        assert!(e.classify());
        assert_eq!(e.insurance_number().as_deref(), Some("4444"));
        assert_eq!(e.insurance_class().as_deref(), Some("B1"));
        assert_eq!(e.start_date(), date(2022, 9, 1));
        assert_eq!(e.expiration_date(), date(2023, 8, 31));
        assert_eq!(e.contract_date(), date(2022, 8, 20));
        assert_eq!(e.person_name().as_deref(), Some("DUMITRU ANA"));
        assert_eq!(e.car_number().as_deref(), Some("AG33BCD"));
        assert_eq!(e.premium_amount().as_deref(), Some("560,00"));
    }

    #[test]
    fn test_generali_short_document_does_not_classify() {
        let e = extract(&vendors::GENERALI, "generali.pdf", &single_page(GENERALI_TEXT)).unwrap();
        assert!(!e.classify());
    }

    #[test]
    fn test_omniasig_round_trip() {
        let e = extract(&vendors::OMNIASIG, "policy.pdf", &single_page(OMNIASIG_TEXT)).unwrap();

        assert!(e.classify());
        assert_eq!(e.insurance_number().as_deref(), Some("777"));
        assert_eq!(e.insurance_class().as_deref(), Some("B3"));
        assert_eq!(e.start_date(), date(2022, 10, 1));
        assert_eq!(e.expiration_date(), date(2023, 9, 30));
        assert_eq!(e.contract_date(), date(2022, 9, 28));
        assert_eq!(e.person_name().as_deref(), Some("STAN ELENA"));
        assert_eq!(e.car_number().as_deref(), Some("CT44PQR"));
        assert_eq!(e.premium_amount().as_deref(), Some("640,00"));
    }

    /// Fails every read.
    struct SealedDocument;

    impl DocumentSource for SealedDocument {
        fn page_count(&self) -> usize {
            1
        }
        fn page_text(&self, _page: usize) -> document::Result<String> {
            Err(DocumentError::TextExtraction("page was read".to_string()))
        }
        fn render_page(&self, _page: usize, _dpi: u32) -> document::Result<Option<DynamicImage>> {
            Err(DocumentError::Parse("page was rendered".to_string()))
        }
    }

    #[test]
    fn test_prefilter_rejects_without_reading() {
        let template = Arc::new(CompiledTemplate::compile(&vendors::EUROINS).unwrap());
        let templates = TemplateStore::new();
        let matcher = TemplateMatcher::new();
        let profile = OcrProfile::default();
        let ctx = DocumentContext {
            source_path: Path::new("unrelated.pdf"),
            document: &SealedDocument,
            ocr: &NoOcr,
            ocr_profile: &profile,
            templates: &templates,
            matcher: &matcher,
            render_dpi: 600,
        };

        let e = ManifestExtractor::open(template, &ctx).unwrap();

        assert!(!e.classify());
        assert_eq!(e.insurance_number(), None);
        assert_eq!(e.insurer_short_name().as_deref(), Some("EUROINS"));
    }

    #[test]
    fn test_missing_marker_does_not_classify() {
        let text = EUROINS_TEXT.replace("AUTO RCA", "CASCO");
        let e = extract(&vendors::EUROINS, "euroins.pdf", &single_page(&text)).unwrap();

        assert!(!e.classify());
        assert_eq!(e.insurance_number().as_deref(), Some("123456789"));
    }

    #[test]
    fn test_invalid_date_fails_only_that_field() {
        let text = EUROINS_TEXT.replace("de la 01.03.2022", "de la 29.02.2021");
        let e = extract(&vendors::EUROINS, "euroins.pdf", &single_page(&text)).unwrap();

        assert!(e.classify());
        assert_eq!(e.start_date(), None);
        assert_eq!(e.expiration_date(), date(2023, 2, 28));
        assert_eq!(e.coverage_months(), None);
    }

    #[test]
    fn test_other_insurer_text_does_not_classify() {
        let e = extract(&vendors::GRAWE, "x.pdf", &single_page(OMNIASIG_TEXT)).unwrap();
        assert!(!e.classify());
    }

    #[test]
    fn test_prefilter_tokens() {
        assert!(passes_prefilter(&[], "anything.pdf"));
        assert!(passes_prefilter(&["EUROINS", "RO16H16DV"], "ro16h16dv_0001.pdf"));
        assert!(!passes_prefilter(&["CITY"], "euroins.pdf"));
    }
}
