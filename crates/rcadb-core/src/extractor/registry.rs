//! Ordered table of extractor constructors, built once at startup.

use std::fmt;
use std::sync::Arc;

use tracing::info;

use super::manifest::CompiledTemplate;
use super::vendors::BUILTIN;
use super::{DocumentContext, Extractor, ManifestExtractor, TemplateManifest};
use crate::error::TemplateError;

/// Builds an extractor for one document.
pub type ExtractorFactory =
    Arc<dyn Fn(&DocumentContext<'_>) -> crate::Result<Box<dyn Extractor>> + Send + Sync>;

struct Entry {
    name: String,
    factory: ExtractorFactory,
}

/// Immutable, ordered list of named extractor factories.
#[derive(Clone, Default)]
pub struct Registry {
    entries: Arc<Vec<Entry>>,
}

impl Registry {
    /// Every built-in insurer, in registration order.
    pub fn builtin() -> Result<Self, TemplateError> {
        let mut builder = RegistryBuilder::new();
        for manifest in BUILTIN {
            builder.register_manifest(manifest)?;
        }
        let registry = builder.build();
        info!("Registered {} templates", registry.len());
        Ok(registry)
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Template names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &ExtractorFactory)> {
        self.entries.iter().map(|e| (e.name.as_str(), &e.factory))
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry").field("templates", &self.names()).finish()
    }
}

/// Collects factories; registration order is dispatch order.
#[derive(Default)]
pub struct RegistryBuilder {
    entries: Vec<Entry>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&DocumentContext<'_>) -> crate::Result<Box<dyn Extractor>> + Send + Sync + 'static,
    {
        self.entries.push(Entry {
            name: name.into(),
            factory: Arc::new(factory),
        });
        self
    }

    /// Compile a manifest and register the generic extractor for it.
    pub fn register_manifest(
        &mut self,
        manifest: &'static TemplateManifest,
    ) -> Result<&mut Self, TemplateError> {
        let template = Arc::new(CompiledTemplate::compile(manifest)?);
        Ok(self.register(manifest.short_name, move |ctx| {
            let extractor = ManifestExtractor::open(template.clone(), ctx)?;
            Ok(Box::new(extractor) as Box<dyn Extractor>)
        }))
    }

    pub fn build(self) -> Registry {
        Registry {
            entries: Arc::new(self.entries),
        }
    }
}
