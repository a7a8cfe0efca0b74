//! Microsoft products: Designer, Bing Image Creator, Copilot.

use super::{ExtractedMetadata, PlatformExtractor, PlatformIdentity, UNKNOWN};
use crate::manifest::Manifest;

const MARKERS: &[&str] = &[
    "Microsoft",
    "Microsoft Designer",
    "Designer",
    "Bing Image Creator",
    "Copilot",
    "Microsoft Copilot",
];

const AI_INDICATORS: &[&str] = &["ai_generated", "designer", "copilot"];

const AI_PRODUCTS: &[&str] = &["designer", "bing image creator", "copilot"];

pub struct MicrosoftExtractor {
    identity: PlatformIdentity,
}

impl MicrosoftExtractor {
    pub fn new() -> Self {
        Self {
            identity: PlatformIdentity::new("microsoft", "Microsoft", MARKERS, AI_INDICATORS),
        }
    }
}

impl Default for MicrosoftExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformExtractor for MicrosoftExtractor {
    fn identity(&self) -> &PlatformIdentity {
        &self.identity
    }

    fn extract_metadata(&self, manifest: Option<&Manifest>, raw: &[u8]) -> ExtractedMetadata {
        let mut md = ExtractedMetadata::for_company(&self.identity.company);
        md.software = Some(UNKNOWN.to_string());
        md.service = Some(UNKNOWN.to_string());

        if let Some(m) = manifest {
            if let Some(name) = m.first_generator().and_then(|g| g.name.clone()) {
                md.software = Some(name);
            }
            if let Some(issuer) = m
                .signature_info
                .as_ref()
                .and_then(|s| s.issuer.as_deref())
                .filter(|i| i.contains("Microsoft"))
            {
                md.company = issuer.to_string();
            }
            md.ai_indicator = self.identity.find_ai_indicator(m);
            md.assertions = m.assertion_labels();
        }

        md.detected_markers = self.search_raw_data(raw);
        if !md.detected_markers.is_empty() {
            if md.has_marker("Designer") {
                md.software = Some("Microsoft Designer".to_string());
                md.service = Some("AI Design Tool".to_string());
            }
            if md.has_marker("Bing Image Creator") {
                md.software = Some("Bing Image Creator".to_string());
                md.service = Some("AI Image Generation".to_string());
            }
            if md.has_marker("Copilot") {
                md.software = Some("Microsoft Copilot".to_string());
            }
        }

        md
    }

    fn is_ai_generated(&self, md: &ExtractedMetadata) -> bool {
        let software = ExtractedMetadata::lower(&md.software);
        if AI_PRODUCTS.iter().any(|p| software.contains(p)) {
            return true;
        }
        md.ai_indicator.is_some()
    }
}
