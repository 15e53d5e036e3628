//! Name-to-implementation sink registry.

use parking_lot::RwLock;
use std::collections::HashMap;

use super::{Exporter, FileExporter};
use crate::errors::ExportError;

/// Factory function producing a fresh exporter instance.
pub type ExporterFactory = Box<dyn Fn() -> Box<dyn Exporter> + Send + Sync>;

/// Registry resolving sink class names to exporter factories.
///
/// Dispatch is an explicit registration table: an unknown class name is a
/// configuration error surfaced through [`ExportError::UnknownExporter`],
/// which the dispatcher treats like any other per-sink failure.
#[derive(Default)]
pub struct SinkRegistry {
    factories: RwLock<HashMap<String, ExporterFactory>>,
}

impl SinkRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry pre-populated with the built-in exporters.
    #[must_use]
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.register(FileExporter::CLASS, Box::new(|| Box::new(FileExporter)));
        registry
    }

    /// Registers a factory under a class name, replacing any previous
    /// entry for that name.
    pub fn register(&self, class: impl Into<String>, factory: ExporterFactory) {
        self.factories.write().insert(class.into(), factory);
    }

    /// Resolves a class name to a fresh exporter instance.
    pub fn resolve(&self, class: &str) -> Result<Box<dyn Exporter>, ExportError> {
        let factories = self.factories.read();
        factories
            .get(class)
            .map(|factory| factory())
            .ok_or_else(|| ExportError::UnknownExporter(class.to_string()))
    }

    /// Whether a class name is registered.
    #[must_use]
    pub fn contains(&self, class: &str) -> bool {
        self.factories.read().contains_key(class)
    }

    /// Lists registered class names, sorted.
    #[must_use]
    pub fn exporter_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for SinkRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkRegistry")
            .field("exporters", &self.exporter_names())
            .finish()
    }
}
