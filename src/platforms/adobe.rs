//! Adobe products: Firefly, Photoshop, Illustrator.

use super::{ExtractedMetadata, PlatformExtractor, PlatformIdentity, UNKNOWN};
use crate::manifest::Manifest;

const MARKERS: &[&str] = &[
    "Adobe",
    "Firefly",
    "Adobe Firefly",
    "Photoshop",
    "Adobe Photoshop",
    "Illustrator",
    "Adobe Sensei",
];

const AI_INDICATORS: &[&str] = &["firefly", "generative fill", "ai_generated"];

pub struct AdobeExtractor {
    identity: PlatformIdentity,
}

impl AdobeExtractor {
    pub fn new() -> Self {
        Self {
            identity: PlatformIdentity::new("adobe", "Adobe", MARKERS, AI_INDICATORS),
        }
    }
}

impl Default for AdobeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformExtractor for AdobeExtractor {
    fn identity(&self) -> &PlatformIdentity {
        &self.identity
    }

    fn extract_metadata(&self, manifest: Option<&Manifest>, raw: &[u8]) -> ExtractedMetadata {
        let mut md = ExtractedMetadata::for_company(&self.identity.company);
        md.software = Some(UNKNOWN.to_string());
        md.version = Some(UNKNOWN.to_string());

        if let Some(m) = manifest {
            if let Some(info) = m.first_generator() {
                if let Some(name) = &info.name {
                    md.software = Some(name.clone());
                }
                if let Some(version) = &info.version {
                    md.version = Some(version.clone());
                }
            }
            if m
                .assertions
                .iter()
                .any(|a| a.label.to_lowercase().contains("generative"))
            {
                md.ai_feature = Some("Generative AI".to_string());
            }
            md.ai_indicator = self.identity.find_ai_indicator(m);
            md.assertions = m.assertion_labels();
        }

        let found = self.search_raw_data(raw);
        if !found.is_empty() {
            if found.iter().any(|m| m == "Firefly") {
                md.software = Some("Adobe Firefly".to_string());
                md.ai_feature = Some("AI Image Generation".to_string());
            } else if found.iter().any(|m| m == "Photoshop") {
                md.software = Some("Adobe Photoshop".to_string());
            }
            md.detected_markers = found;
        }

        md
    }

    /// Firefly is always generative; Photoshop and Illustrator are human
    /// tools unless a generative feature was recorded.
    fn is_ai_generated(&self, md: &ExtractedMetadata) -> bool {
        if ExtractedMetadata::lower(&md.software).contains("firefly") {
            return true;
        }
        if md.ai_feature.is_some() {
            return true;
        }
        md.ai_indicator.is_some()
    }
}
