//! First-match classification over the registry.

use tracing::{debug, info, warn};

use super::{DocumentContext, Registry};
use crate::error::{ExtractionError, RcadbError};
use crate::models::Record;

/// Tries registered templates in order and commits to the first match.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Registry,
}

impl Dispatcher {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Classify one document and read its fields.
    ///
    /// No template after the first match is constructed. A template that
    /// fails to construct is skipped. With no match, the record carries only
    /// the source path.
    pub fn dispatch(&self, ctx: &DocumentContext<'_>) -> Record {
        let path = ctx.source_path;

        for (name, factory) in self.registry.iter() {
            let extractor = match factory(ctx) {
                Ok(extractor) => extractor,
                Err(RcadbError::Extraction(ExtractionError::TemplateNotMatched { .. })) => {
                    debug!("{}: skipped {}", name, path.display());
                    continue;
                }
                Err(e) => {
                    warn!("{}: failed on {}: {}", name, path.display(), e);
                    continue;
                }
            };

            if extractor.classify() {
                info!("{} matched {}", name, path.display());
                return extractor.to_record(path);
            }
            debug!(
                "{}",
                ExtractionError::TemplateNotMatched {
                    template: name.to_string()
                }
            );
        }

        info!(
            "{}",
            ExtractionError::UnrecognizedDocument {
                path: path.to_path_buf()
            }
        );
        Record::unprocessed(path)
    }
}
