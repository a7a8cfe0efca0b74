//! Google products: Media Processing Services, Gemini, Imagen, Pixel Camera.

use super::{ExtractedMetadata, PlatformExtractor, PlatformIdentity, UNKNOWN};
use crate::manifest::Manifest;

const MARKERS: &[&str] = &[
    "Google LLC",
    "Google Media Processing",
    "Google Media Processing Services",
    "Gemini",
    "Bard",
    "Imagen",
    "Pixel Camera",
    "Google Photos",
    "Google AI",
];

const AI_INDICATORS: &[&str] = &["ai_generated", "synthetic", "generative"];

const AI_SERVICES: &[&str] = &["media processing", "gemini", "imagen", "google ai"];

/// Camera products record real captures even though Google also ships
/// generative services.
const CAMERA_PRODUCTS: &[&str] = &["pixel camera"];

pub struct GoogleExtractor {
    identity: PlatformIdentity,
}

impl GoogleExtractor {
    pub fn new() -> Self {
        Self {
            identity: PlatformIdentity::new("google", "Google", MARKERS, AI_INDICATORS),
        }
    }
}

impl Default for GoogleExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformExtractor for GoogleExtractor {
    fn identity(&self) -> &PlatformIdentity {
        &self.identity
    }

    fn extract_metadata(&self, manifest: Option<&Manifest>, raw: &[u8]) -> ExtractedMetadata {
        let mut md = ExtractedMetadata::for_company(&self.identity.company);
        md.software = Some(UNKNOWN.to_string());
        md.service = Some(UNKNOWN.to_string());
        md.certificate = Some(UNKNOWN.to_string());

        if let Some(m) = manifest {
            if let Some(name) = m.first_generator().and_then(|g| g.name.clone()) {
                md.software = Some(name);
            }
            if let Some(sig) = &m.signature_info {
                if let Some(issuer) = sig.issuer.as_deref().filter(|i| i.contains("Google")) {
                    md.company = issuer.to_string();
                }
                if let Some(cn) = &sig.common_name {
                    md.certificate = Some(cn.clone());
                }
            }
            md.ai_indicator = self.identity.find_ai_indicator(m);
            md.assertions = m.assertion_labels();
        }

        // Sub-product names are often only visible in the raw bytes, so the
        // markers override the generator name here.
        let found = self.search_raw_data(raw);
        if !found.is_empty() {
            if found.iter().any(|m| m.contains("Google Media Processing")) {
                md.service = Some("Google Media Processing Services".to_string());
                md.software = Some("Google AI".to_string());
            }
            if found.iter().any(|m| m == "Gemini") {
                md.software = Some("Gemini".to_string());
            }
            if found.iter().any(|m| m == "Pixel Camera") {
                md.software = Some("Pixel Camera".to_string());
            }
            md.detected_markers = found;
        }

        md
    }

    fn is_ai_generated(&self, md: &ExtractedMetadata) -> bool {
        let software = ExtractedMetadata::lower(&md.software);
        let service = ExtractedMetadata::lower(&md.service);

        if CAMERA_PRODUCTS.iter().any(|p| software.contains(p)) {
            return false;
        }

        if AI_SERVICES
            .iter()
            .any(|s| service.contains(s) || software.contains(s))
        {
            return true;
        }

        md.ai_indicator.is_some()
    }
}
