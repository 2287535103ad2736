//! Layout manifests for the supported insurers, in registration order.

use super::manifest::{
    AnchorSpec, Field, Layout, Phase, RasterLayout, RegionSpec, RuleSpec, Source,
    TemplateManifest, TextLayout,
};
use super::rules::{PatternSpec, Transform};
use crate::ocr::OcrKind;
use crate::template::{Offsets, PAGE_TOP_LEFT};

use Field::*;
use PatternSpec::{Date, Plate};

const PAGE: Source = Source::Page;

// Region names shared by the raster layouts
const CONTRACT: &str = "contract";
const INSURER: &str = "insurer";
const NUMBER: &str = "number";
const START_END: &str = "start_end";
const AMOUNT_CLASS: &str = "amount_class";
const PERSON: &str = "person";
const CAR: &str = "car";

const fn region(name: &'static str) -> Source {
    Source::Region(name)
}

/// Policy number region: digits, slashes and spaces, compacted.
const DIGIT_RUN: PatternSpec = PatternSpec::Capture {
    regex: r"([\s\d/]*)",
    group: 1,
    transform: Transform::Compact,
};

pub static EUROINS: TemplateManifest = TemplateManifest {
    short_name: "EUROINS",
    insurer_name: "EUROINS ROMÂNIA ASIGURARE REASIGURARE S.A.",
    marker: PAGE,
    layout: Layout::Text(TextLayout {
        page: 0,
        prefilter: &["EUROINS", "RO16H16DV"],
    }),
    rules: &[
        RuleSpec::new(InsurerName, PAGE, PatternSpec::clean(r"(EUROINS.*)R.C")),
        RuleSpec::new(InsuranceNumber, PAGE, PatternSpec::trim(r"Seria(.*)Nr\.(.*)", 2)),
        RuleSpec::new(InsuranceClass, PAGE, PatternSpec::clean(r"Clasa Bonus-Malus:(.*),  Tarif de decontare")),
        RuleSpec::new(StartDate, PAGE, Date(r"Contract de la(.*)\.(.*)\.(.*)până la")),
        RuleSpec::new(ExpirationDate, PAGE, Date(r"până la:(.*)\.(.*)\.(.*) Contract")),
        RuleSpec::new(ContractDate, PAGE, Date(r"Contract emis în data de:(.*)\.(.*)\.(.*) (.*):")),
        RuleSpec::new(PersonName, PAGE, PatternSpec::trim(r"Nume/Denumire Asigurat/(.*)Fel, Tip, Marca", 1)),
        RuleSpec::new(CarNumber, PAGE, Plate),
        RuleSpec::new(PremiumAmount, PAGE, PatternSpec::clean(r"Prima de asigurare:(.*)Lei,")),
    ],
};

pub static CITY: TemplateManifest = TemplateManifest {
    short_name: "CITY",
    insurer_name: "CITY INSURANCE S.A.",
    marker: PAGE,
    layout: Layout::Text(TextLayout {
        page: 0,
        prefilter: &["CITY", "RO25C25HP"],
    }),
    rules: &[
        RuleSpec::new(InsurerName, PAGE, PatternSpec::clean(r"DENUMIRE ASIGURATOR:(.*)R.C")),
        RuleSpec::new(InsuranceNumber, PAGE, PatternSpec::trim(r"Seria(.*)Nr\.(.*)", 2)),
        RuleSpec::new(InsuranceClass, PAGE, PatternSpec::clean(r"Clasa Bonus-Malus(.*)")),
        RuleSpec::new(StartDate, PAGE, Date(r"Valabilitate Contract de la(.*)/(.*)/(.*)pana la")),
        RuleSpec::new(ExpirationDate, PAGE, Date(r"pana la(.*)/(.*)/(.*)Contract")),
        RuleSpec::new(ContractDate, PAGE, Date(r"Contract emis in data de(.*)/(.*)/(.*), ora")),
        RuleSpec::new(
            PersonName,
            PAGE,
            PatternSpec::trim(r"Nume/Denumire Asigurat Fel, Tip, Marca.*[\r\n]+([^\r\n]+)", 1),
        ),
        RuleSpec::new(CarNumber, PAGE, Plate),
        RuleSpec::new(PremiumAmount, PAGE, PatternSpec::clean(r"Prima totala(.*)Lei")),
    ],
};

pub static GRAWE: TemplateManifest = TemplateManifest {
    short_name: "GRAWE",
    insurer_name: "GRAWE România Asigurare SA",
    marker: PAGE,
    layout: Layout::Text(TextLayout {
        page: 0,
        prefilter: &[],
    }),
    rules: &[
        RuleSpec::new(InsurerName, PAGE, PatternSpec::clean(r"(GRAWE.*)R.C")),
        RuleSpec::new(InsuranceNumber, PAGE, PatternSpec::trim(r"Seria(.*)Nr\.(.*)", 2)),
        RuleSpec::new(InsuranceClass, PAGE, PatternSpec::clean(r"Clasă Bonus-Malus(.*)")),
        RuleSpec::new(StartDate, PAGE, Date(r"Valabilitate Contract de la(.*)\.(.*)\.(.*)până la")),
        RuleSpec::new(ExpirationDate, PAGE, Date(r"până la(.*)\.(.*)\.(.*)Contract")),
        RuleSpec::new(ContractDate, PAGE, Date(r"Contract emis în data de(.*)\.(.*)\.(.*)")),
        RuleSpec::new(PersonName, PAGE, PatternSpec::trim(r"Nume/Denumire Asigurat:(.*)Fel, Tip, Marcă", 1)),
        RuleSpec::new(CarNumber, PAGE, Plate),
        RuleSpec::new(PremiumAmount, PAGE, PatternSpec::clean(r"Primă de asigurare(.*)Lei")),
    ],
};

pub static ASIROM: TemplateManifest = TemplateManifest {
    short_name: "ASIROM",
    insurer_name: "ASIROM VIENNA INSURANCE GROUP",
    marker: PAGE,
    layout: Layout::Text(TextLayout {
        page: 0,
        prefilter: &["ASIROM", "XZ"],
    }),
    rules: &[
        RuleSpec::new(InsurerName, PAGE, PatternSpec::clean(r"Asigurarea Romaneasca - (.*)S\.A\.")),
        RuleSpec::new(
            InsuranceNumber,
            PAGE,
            PatternSpec::trim(r"([0-9A-Za-z]+)\s*B-dul Carol I nr. 31-33", 1),
        ),
        RuleSpec::new(InsuranceClass, PAGE, PatternSpec::clean(r"Clasă  Bonus-Malus:(.*)Prima de asigurare")),
        RuleSpec::new(StartDate, PAGE, Date(r"Valabilitate Contract  de la(.*)\.(.*)\.(.*)pâna la")),
        RuleSpec::new(ExpirationDate, PAGE, Date(r"pâna la:(.*)\.(.*)\.(.*) Contract")),
        RuleSpec::new(ContractDate, PAGE, Date(r"Contract emis în data de(.*)\.(.*)\.(.*)ora")),
        RuleSpec::new(PersonName, PAGE, PatternSpec::trim(r"Nume/Denumire Asigurat:(.*)Fel, Tip, Marca", 1)),
        RuleSpec::new(CarNumber, PAGE, Plate),
        RuleSpec::new(PremiumAmount, PAGE, PatternSpec::clean(r"Prima de asigurare:(.*)Lei")),
    ],
};

pub static GENERALI: TemplateManifest = TemplateManifest {
    short_name: "GENERALI",
    insurer_name: "GENERALI ROMANIA ASIGURARE REASIGURARE",
    marker: PAGE,
    layout: Layout::Text(TextLayout {
        page: 4,
        prefilter: &["GENERALI", "RO05M3NP"],
    }),
    rules: &[
        RuleSpec::new(InsurerName, PAGE, PatternSpec::clean(r"(.*)S\.A\.")),
        RuleSpec::new(InsuranceNumber, PAGE, PatternSpec::trim(r"Seria(.*)nr\.(.*)", 2)),
        RuleSpec::new(InsuranceClass, PAGE, PatternSpec::clean(r"Clasa Bonus-Malus:(.*)")),
        RuleSpec::new(StartDate, PAGE, Date(r"Valabilitate Contract de la(.*)\.(.*)\.(.*)pana la")),
        RuleSpec::new(ExpirationDate, PAGE, Date(r"pana la(.*)\.(.*)\.(.*)Contract emis")),
        RuleSpec::new(ContractDate, PAGE, Date(r"Contract emis in data de(.*)\.(.*)\.(.*)")),
        RuleSpec::new(PersonName, PAGE, PatternSpec::trim(r"Nume/Denumire(.*)Fel, Tip, Marca", 1)),
        RuleSpec::new(CarNumber, PAGE, Plate),
        RuleSpec::new(PremiumAmount, PAGE, PatternSpec::clean(r"Prima de asigurare:(.*)Lei")),
    ],
};

pub static OMNIASIG: TemplateManifest = TemplateManifest {
    short_name: "OMNIASIG",
    insurer_name: "OMNIASIG VIENNA INSURANCE GROUP",
    marker: PAGE,
    layout: Layout::Text(TextLayout {
        page: 0,
        prefilter: &[],
    }),
    rules: &[
        RuleSpec::new(InsurerName, PAGE, PatternSpec::clean(r"(.*)S\.A\. R\.C\.")),
        RuleSpec::new(InsuranceNumber, PAGE, PatternSpec::trim(r"Seria(.*)Nr\.(.*)", 2)),
        RuleSpec::new(InsuranceClass, PAGE, PatternSpec::clean(r"Clasă Bonus Malus(.*)Tarif")),
        RuleSpec::new(StartDate, PAGE, Date(r"Valabilitate Contract de la(.*)-(.*)-(.*)până la")),
        RuleSpec::new(ExpirationDate, PAGE, Date(r"până la(.*)-(.*)-(.*)Contract emis")),
        RuleSpec::new(ContractDate, PAGE, Date(r"Contract emis în data de(.*)-(.*)-(.*)")),
        RuleSpec::new(PersonName, PAGE, PatternSpec::trim(r"Nume/Denumire Asigurat:(.*)Fel, Tip, Marcă,", 1)),
        RuleSpec::new(CarNumber, PAGE, Plate),
        RuleSpec::new(PremiumAmount, PAGE, PatternSpec::clean(r"Primă de asigurare(.*)Lei\s*Clasă")),
    ],
};

pub static AXERIA: TemplateManifest = TemplateManifest {
    short_name: "AXERIA",
    insurer_name: "AXERIA IARD",
    marker: region(CONTRACT),
    layout: Layout::Raster(RasterLayout {
        pages: &[2],
        anchors: &[],
        regions: &[
            RegionSpec::new(CONTRACT, PAGE_TOP_LEFT, Offsets::new(140, 3631, 2931, 3730), OcrKind::Text, Phase::Classify),
            RegionSpec::new(INSURER, PAGE_TOP_LEFT, Offsets::new(140, 3917, 2011, 4005), OcrKind::Text, Phase::Classify),
            RegionSpec::new(NUMBER, PAGE_TOP_LEFT, Offsets::new(1598, 1111, 2761, 1325), OcrKind::Digits, Phase::Fields),
            RegionSpec::new(START_END, PAGE_TOP_LEFT, Offsets::new(130, 5682, 4814, 5810), OcrKind::Text, Phase::Fields),
            RegionSpec::new(AMOUNT_CLASS, PAGE_TOP_LEFT, Offsets::new(130, 5808, 4814, 5930), OcrKind::Text, Phase::Fields),
            RegionSpec::new(PERSON, PAGE_TOP_LEFT, Offsets::new(1064, 4397, 2685, 4547), OcrKind::Text, Phase::Fields),
            RegionSpec::new(CAR, PAGE_TOP_LEFT, Offsets::new(183, 1478, 1572, 1635), OcrKind::Plate, Phase::Fields),
        ],
    }),
    rules: &[
        RuleSpec::new(InsurerName, region(INSURER), PatternSpec::clean(r"(.*)SA LYON — SUCURSALA BUCURESTI")),
        RuleSpec::new(InsuranceNumber, region(NUMBER), DIGIT_RUN),
        RuleSpec::new(InsuranceClass, region(AMOUNT_CLASS), PatternSpec::clean(r"Clasa\s*Bonus\s*Malus(.*)Tarif")),
        RuleSpec::new(StartDate, region(START_END), Date(r"Contract\s*de\s*la(.*)\.(.*)\.(.*)până")),
        RuleSpec::new(ExpirationDate, region(START_END), Date(r"până\s*la:(.*)\.(.*)\.(.*)Contract emis")),
        RuleSpec::new(
            ContractDate,
            region(START_END),
            Date(r"Contract\s*emis\s*în\s*data:(.*)\.(.*)\.(.*)\s(.*):(.*)"),
        ),
        RuleSpec::new(PersonName, region(PERSON), PatternSpec::Whole(Transform::Clean)),
        RuleSpec::new(CarNumber, region(CAR), PatternSpec::CroppedPlate),
        RuleSpec::new(PremiumAmount, region(AMOUNT_CLASS), PatternSpec::clean(r"Prima\s*de\s*asigurare(.*)Lei Clasa")),
    ],
};

/// Anchor at the insurer-name banner, located by reference bitmap.
const ALLIANZ_BANNER: &str = "insurer-nm-allianz";

pub static ALLIANZ: TemplateManifest = TemplateManifest {
    short_name: "ALLIANZ",
    insurer_name: "ALLIANZ - ŢIRIAC ASIGURĂRI",
    marker: region(CONTRACT),
    layout: Layout::Raster(RasterLayout {
        pages: &[0, 2],
        anchors: &[AnchorSpec {
            name: ALLIANZ_BANNER,
            reference: "insurer_nm_allianz",
        }],
        regions: &[
            RegionSpec::new(CONTRACT, ALLIANZ_BANNER, Offsets::new(-4, -100, 2712, 10), OcrKind::Text, Phase::Classify),
            RegionSpec::new(INSURER, ALLIANZ_BANNER, Offsets::new(0, 0, 2254, 118), OcrKind::Text, Phase::Classify),
            RegionSpec::new(NUMBER, PAGE_TOP_LEFT, Offsets::new(1582, 1186, 2773, 1344), OcrKind::Digits, Phase::Fields),
            RegionSpec::new(AMOUNT_CLASS, ALLIANZ_BANNER, Offsets::new(-6, 1580, 4786, 1704), OcrKind::Text, Phase::Fields),
            RegionSpec::new(START_END, ALLIANZ_BANNER, Offsets::new(-6, 1470, 4786, 1578), OcrKind::Text, Phase::Fields),
            RegionSpec::new(PERSON, ALLIANZ_BANNER, Offsets::new(1092, 324, 2636, 510), OcrKind::Text, Phase::Fields),
            RegionSpec::new(CAR, PAGE_TOP_LEFT, Offsets::new(180, 1600, 1566, 1756), OcrKind::Plate, Phase::Fields),
        ],
    }),
    rules: &[
        RuleSpec::new(InsurerName, region(INSURER), PatternSpec::clean(r"Denumire asigurator:(.*)S\.A\.")),
        RuleSpec::new(InsuranceNumber, region(NUMBER), DIGIT_RUN),
        RuleSpec::new(InsuranceClass, region(AMOUNT_CLASS), PatternSpec::clean(r"Clasa Bonus Malus(.*)Tarif decontare")),
        RuleSpec::new(StartDate, region(START_END), Date(r"Valabilitate Contract de la(.*)\.(.*)\.(.*)până")),
        RuleSpec::new(ExpirationDate, region(START_END), Date(r"la:(.*)\.(.*)\.(.*)Contract emis")),
        RuleSpec::new(ContractDate, region(START_END), Date(r"Contract emis în data(.*)\.(.*)\.(.*)")),
        RuleSpec::new(PersonName, region(PERSON), PatternSpec::Whole(Transform::Clean)),
        RuleSpec::new(CarNumber, region(CAR), PatternSpec::CroppedPlate),
        RuleSpec::new(
            PremiumAmount,
            region(AMOUNT_CLASS),
            PatternSpec::clean(r"Prima de asigurare(.*)(RO0N|RON|R0N) Clasa Bonus"),
        ),
    ],
};

pub static GROUPAMA: TemplateManifest = TemplateManifest {
    short_name: "GROUPAMA",
    insurer_name: "GROUPAMA ASIGURĂRI",
    marker: region(CONTRACT),
    layout: Layout::Raster(RasterLayout {
        pages: &[0],
        anchors: &[],
        regions: &[
            RegionSpec::new(CONTRACT, PAGE_TOP_LEFT, Offsets::new(193, 3507, 2182, 3607), OcrKind::Text, Phase::Classify),
            RegionSpec::new(INSURER, PAGE_TOP_LEFT, Offsets::new(193, 3609, 1450, 3702), OcrKind::Text, Phase::Classify),
            RegionSpec::new(NUMBER, PAGE_TOP_LEFT, Offsets::new(1476, 996, 2544, 1122), OcrKind::Digits, Phase::Fields),
            RegionSpec::new(START_END, PAGE_TOP_LEFT, Offsets::new(193, 5115, 4788, 5223), OcrKind::Text, Phase::Fields),
            RegionSpec::new(AMOUNT_CLASS, PAGE_TOP_LEFT, Offsets::new(193, 5211, 4788, 5313), OcrKind::Text, Phase::Fields),
            RegionSpec::new(PERSON, PAGE_TOP_LEFT, Offsets::new(954, 3945, 2728, 4114), OcrKind::Text, Phase::Fields),
            RegionSpec::new(CAR, PAGE_TOP_LEFT, Offsets::new(193, 1306, 1454, 1373), OcrKind::Plate, Phase::Fields),
        ],
    }),
    rules: &[
        RuleSpec::new(InsurerName, region(INSURER), PatternSpec::clean(r"(.*)S\.A\.")),
        RuleSpec::new(InsuranceNumber, region(NUMBER), DIGIT_RUN),
        RuleSpec::new(InsuranceClass, region(AMOUNT_CLASS), PatternSpec::clean(r"Clasă\s*Bonus-Malus:(.*)")),
        RuleSpec::new(StartDate, region(START_END), Date(r"Contract\s*de\s*la(.*)-(.*)-(.*)până")),
        RuleSpec::new(ExpirationDate, region(START_END), Date(r"până\s*la(.*)-(.*)-(.*)Contract emis")),
        RuleSpec::new(
            ContractDate,
            region(START_END),
            Date(r"Contract\s*emis\s*în\s*data\s*de(.*)-(.*)-(.*)"),
        ),
        RuleSpec::new(PersonName, region(PERSON), PatternSpec::Whole(Transform::Clean)),
        RuleSpec::new(CarNumber, region(CAR), PatternSpec::CroppedPlate),
        RuleSpec::new(PremiumAmount, region(AMOUNT_CLASS), PatternSpec::clean(r"Prima\s*de\s*asigurare(.*)LEI")),
    ],
};

/// Every built-in manifest. Text layouts come first; order decides ties.
pub static BUILTIN: [&TemplateManifest; 9] = [
    &EUROINS, &CITY, &GRAWE, &ASIROM, &GENERALI, &OMNIASIG, &AXERIA, &ALLIANZ, &GROUPAMA,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::manifest::CompiledTemplate;

    #[test]
    fn test_builtin_manifests_compile() {
        for manifest in BUILTIN {
            CompiledTemplate::compile(manifest)
                .unwrap_or_else(|e| panic!("{} failed: {}", manifest.short_name, e));
        }
    }

    #[test]
    fn test_builtin_order() {
        let names: Vec<_> = BUILTIN.iter().map(|m| m.short_name).collect();
        assert_eq!(
            names,
            vec!["EUROINS", "CITY", "GRAWE", "ASIROM", "GENERALI", "OMNIASIG", "AXERIA", "ALLIANZ", "GROUPAMA"]
        );
    }

    #[test]
    fn test_raster_classify_regions_precede_fields() {
        for manifest in BUILTIN {
            if let Layout::Raster(raster) = &manifest.layout {
                let classify: Vec<_> = raster
                    .regions
                    .iter()
                    .filter(|r| r.phase == Phase::Classify)
                    .map(|r| r.name)
                    .collect();
                assert_eq!(classify, vec![CONTRACT, INSURER], "{}", manifest.short_name);
            }
        }
    }
}
