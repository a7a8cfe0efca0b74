//! Vendor platform identification and metadata extraction.
//!
//! Each vendor implements [`PlatformExtractor`]: it owns a marker table, an
//! AI-indicator table and its own AI-classification policy. Extractors never
//! look at each other's data. Adding a vendor means implementing the trait
//! and registering an instance; neither the registry nor the detector change.
//!
//! ```ignore
//! struct Midjourney { identity: PlatformIdentity }
//!
//! impl PlatformExtractor for Midjourney {
//!     fn identity(&self) -> &PlatformIdentity { &self.identity }
//!     fn extract_metadata(&self, manifest: Option<&Manifest>, raw: &[u8]) -> ExtractedMetadata {
//!         let mut md = ExtractedMetadata::for_company(&self.identity.company);
//!         md.detected_markers = self.search_raw_data(raw);
//!         md
//!     }
//!     fn is_ai_generated(&self, md: &ExtractedMetadata) -> bool {
//!         !md.detected_markers.is_empty()
//!     }
//! }
//!
//! registry.register(Box::new(Midjourney { identity: PlatformIdentity::new(
//!     "midjourney", "Midjourney", &["Midjourney"], &["ai_generated"]) }));
//! ```

pub mod adobe;
pub mod google;
pub mod microsoft;
pub mod openai;
pub mod registry;

pub use adobe::AdobeExtractor;
pub use google::GoogleExtractor;
pub use microsoft::MicrosoftExtractor;
pub use openai::OpenAiExtractor;
pub use registry::{PlatformRegistry, UNKNOWN_PLATFORM};

use crate::manifest::Manifest;
use serde::{Deserialize, Serialize};

/// Placeholder for fields a vendor always reports but could not fill.
pub const UNKNOWN: &str = "Unknown";

/// Static description of a vendor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformIdentity {
    /// Registry key, e.g. `"openai"`.
    pub key: String,
    /// Company name, compared against the manifest's claim generator.
    pub company: String,
    /// Literal byte markers, searched case-sensitively in declared order.
    pub markers: Vec<String>,
    /// Assertion labels/values that suggest generative origin.
    pub ai_indicators: Vec<String>,
}

impl PlatformIdentity {
    pub fn new(key: &str, company: &str, markers: &[&str], ai_indicators: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            company: company.to_string(),
            markers: markers.iter().map(|m| m.to_string()).collect(),
            ai_indicators: ai_indicators.iter().map(|m| m.to_string()).collect(),
        }
    }

    /// Markers present in `raw`, in table order, without duplicates.
    ///
    /// Matching is a plain byte substring test, equivalent to searching a
    /// single-byte decoding of the file: no input byte is ever rejected.
    pub fn search(&self, raw: &[u8]) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        for marker in &self.markers {
            if marker.is_empty() || found.contains(marker) {
                continue;
            }
            if memchr::memmem::find(raw, marker.as_bytes()).is_some() {
                found.push(marker.clone());
            }
        }
        found
    }

    /// Whether any marker occurs in `raw`; stops at the first hit.
    pub fn matches_raw(&self, raw: &[u8]) -> bool {
        self.markers
            .iter()
            .filter(|m| !m.is_empty())
            .any(|m| memchr::memmem::find(raw, m.as_bytes()).is_some())
    }

    /// Whether the manifest's first claim generator names this company.
    pub fn matches_generator(&self, manifest: &Manifest) -> bool {
        match manifest.first_generator_name() {
            Some(name) => name
                .to_lowercase()
                .contains(&self.company.to_lowercase()),
            None => false,
        }
    }

    /// First AI indicator (in table order) found in an assertion label or
    /// its serialized data, case-insensitively.
    pub fn find_ai_indicator(&self, manifest: &Manifest) -> Option<String> {
        let haystacks: Vec<(String, String)> = manifest
            .assertions
            .iter()
            .map(|a| {
                let data = if a.data.is_null() {
                    String::new()
                } else {
                    a.data.to_string().to_lowercase()
                };
                (a.label.to_lowercase(), data)
            })
            .collect();

        self.ai_indicators
            .iter()
            .find(|ind| {
                let needle = ind.to_lowercase();
                haystacks
                    .iter()
                    .any(|(label, data)| label.contains(&needle) || data.contains(&needle))
            })
            .cloned()
    }
}

/// Vendor metadata extracted for one analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractedMetadata {
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub software: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub producer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_feature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_indicator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generative_type: Option<String>,
    pub detected_markers: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub assertions: Vec<String>,
}

impl ExtractedMetadata {
    pub fn for_company(company: &str) -> Self {
        Self {
            company: company.to_string(),
            ..Default::default()
        }
    }

    pub(crate) fn lower(field: &Option<String>) -> String {
        field.as_deref().unwrap_or_default().to_lowercase()
    }

    pub(crate) fn has_marker(&self, marker: &str) -> bool {
        self.detected_markers.iter().any(|m| m == marker)
    }
}

/// Per-vendor extraction contract.
pub trait PlatformExtractor: Send + Sync {
    /// Static identity of the vendor.
    fn identity(&self) -> &PlatformIdentity;

    /// Defaults, then manifest fields, then raw-byte marker overlay.
    fn extract_metadata(&self, manifest: Option<&Manifest>, raw: &[u8]) -> ExtractedMetadata;

    /// Vendor policy over the extracted fields.
    fn is_ai_generated(&self, metadata: &ExtractedMetadata) -> bool;

    /// Shared marker search; vendors do not override it.
    fn search_raw_data(&self, raw: &[u8]) -> Vec<String> {
        self.identity().search(raw)
    }

    fn company_name(&self) -> &str {
        &self.identity().company
    }
}

/// Every built-in extractor, in registration order.
pub fn default_extractors() -> Vec<Box<dyn PlatformExtractor>> {
    vec![
        Box::new(OpenAiExtractor::new()),
        Box::new(GoogleExtractor::new()),
        Box::new(AdobeExtractor::new()),
        Box::new(MicrosoftExtractor::new()),
    ]
}
