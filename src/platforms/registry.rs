//! Ordered registry of platform extractors.

use super::{default_extractors, PlatformExtractor};
use crate::manifest::Manifest;
use tracing::debug;

/// Platform name returned when nothing matches.
pub const UNKNOWN_PLATFORM: &str = "unknown";

/// Extractors in registration order.
///
/// Immutable once built; share it behind an `Arc` across concurrent
/// analyses.
pub struct PlatformRegistry {
    extractors: Vec<Box<dyn PlatformExtractor>>,
}

impl PlatformRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self {
            extractors: Vec::new(),
        }
    }

    /// Registry with the built-in vendors: openai, google, adobe, microsoft.
    pub fn with_default_platforms() -> Self {
        let mut registry = Self::new();
        for extractor in default_extractors() {
            registry.register(extractor);
        }
        registry
    }

    /// Append an extractor. A duplicate key replaces the existing entry and
    /// keeps its position.
    pub fn register(&mut self, extractor: Box<dyn PlatformExtractor>) {
        let key = extractor.identity().key.clone();
        match self
            .extractors
            .iter_mut()
            .find(|e| e.identity().key == key)
        {
            Some(slot) => *slot = extractor,
            None => self.extractors.push(extractor),
        }
    }

    pub fn platform_names(&self) -> Vec<String> {
        self.extractors
            .iter()
            .map(|e| e.identity().key.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&dyn PlatformExtractor> {
        self.extractors
            .iter()
            .find(|e| e.identity().key == name)
            .map(|e| e.as_ref())
    }

    /// Which vendor produced the content.
    ///
    /// For each platform in order: any raw-byte marker hit matches; failing
    /// that, a manifest whose first claim generator names the company
    /// matches. First match wins. No match yields [`UNKNOWN_PLATFORM`].
    pub fn identify(
        &self,
        manifest: Option<&Manifest>,
        raw: &[u8],
    ) -> (&str, Option<&dyn PlatformExtractor>) {
        for extractor in &self.extractors {
            let identity = extractor.identity();
            if identity.matches_raw(raw) {
                debug!(platform = %identity.key, "platform matched on raw markers");
                return (identity.key.as_str(), Some(extractor.as_ref()));
            }
            if manifest.is_some_and(|m| identity.matches_generator(m)) {
                debug!(platform = %identity.key, "platform matched on claim generator");
                return (identity.key.as_str(), Some(extractor.as_ref()));
            }
        }
        (UNKNOWN_PLATFORM, None)
    }
}

impl Default for PlatformRegistry {
    fn default() -> Self {
        Self::with_default_platforms()
    }
}
