//! Construction from rendered pages: anchor resolution, cropping, OCR.

use std::collections::HashMap;
use std::sync::Arc;

use image::DynamicImage;
use tracing::{debug, trace};

use super::manifest::{CompiledTemplate, Phase, RasterLayout, RegionSpec};
use super::{DocumentContext, ManifestExtractor};
use crate::error::{OcrError, TemplateError};
use crate::template::{to_intensity, AnchorTable, AnchorTableBuilder, CropRegion};

impl ManifestExtractor {
    /// Try each candidate page until one classifies.
    ///
    /// Per page: every anchor is located first, then every crop region is
    /// computed from the finished anchor table. Only classification regions
    /// are recognized before `classify()`; field regions follow on success.
    /// A page whose anchors cannot be located is skipped.
    pub(super) fn from_raster(
        template: Arc<CompiledTemplate>,
        layout: &RasterLayout,
        ctx: &DocumentContext<'_>,
    ) -> crate::Result<Self> {
        let name = template.name();

        for &page in layout.pages {
            let Some(image) = ctx.document.render_page(page, ctx.render_dpi)? else {
                debug!("{}: page {} has no bitmap", name, page);
                continue;
            };

            let Some(anchors) = resolve_anchors(name, layout, &image, ctx) else {
                continue;
            };

            let regions = layout
                .regions
                .iter()
                .map(|spec| Ok((spec, anchors.region(spec.anchor, spec.offsets)?)))
                .collect::<Result<Vec<(&RegionSpec, CropRegion)>, TemplateError>>()?;

            let mut extractor = Self::with_texts(template.clone(), String::new(), HashMap::new());
            for (spec, region) in regions.iter().filter(|(s, _)| s.phase == Phase::Classify) {
                let text = recognize(ctx, &image, spec, region)?;
                extractor.regions_mut().insert(spec.name, text);
            }

            if !extractor.settle_classification() {
                debug!("{}: page {} does not classify", name, page);
                continue;
            }

            for (spec, region) in regions.iter().filter(|(s, _)| s.phase == Phase::Fields) {
                let text = recognize(ctx, &image, spec, region)?;
                extractor.regions_mut().insert(spec.name, text);
            }
            debug!("{}: classified on page {}", name, page);
            return Ok(extractor);
        }

        Ok(Self::with_texts(template, String::new(), HashMap::new()))
    }
}

/// Locate every declared anchor. `None` if any reference is missing or not found.
fn resolve_anchors(
    template: &str,
    layout: &RasterLayout,
    image: &DynamicImage,
    ctx: &DocumentContext<'_>,
) -> Option<AnchorTable> {
    let mut builder = AnchorTableBuilder::new();
    if layout.anchors.is_empty() {
        return Some(builder.build());
    }

    let page = to_intensity(image);
    for anchor in layout.anchors {
        let Some(reference) = ctx.templates.get(anchor.reference) else {
            debug!("{}: reference bitmap {} not loaded", template, anchor.reference);
            return None;
        };
        let Some(found) = ctx.matcher.locate(&page, reference) else {
            debug!("{}: anchor {} not found", template, anchor.name);
            return None;
        };
        trace!("{}: anchor {} at {:?}", template, anchor.name, found.top_left());
        builder.insert(anchor.name, found.top_left());
    }
    Some(builder.build())
}

fn recognize(
    ctx: &DocumentContext<'_>,
    image: &DynamicImage,
    spec: &RegionSpec,
    region: &CropRegion,
) -> Result<String, OcrError> {
    let Some(crop) = region.crop(image) else {
        debug!("Region {} {:?} lies outside the page", spec.name, region);
        return Ok(String::new());
    };
    let text = ctx.ocr.recognize(&crop, &ctx.ocr_profile.request(spec.kind))?;
    debug!("Region {}: {:?}", spec.name, text);
    Ok(text)
}
