//! Manifest → platform → metadata → AI flag → signature pipeline.
//!
//! Shared by the orchestrator's embedded-manifest tier and by every
//! `/validate/*` endpoint, so both surfaces reach the same conclusion for the
//! same bytes.

use crate::error::{DetectorError, Result};
use crate::io::{read_raw, spill_to_temp, IOLimits};
use crate::manifest::jumbf::{self, MarkerHit};
use crate::manifest::{
    C2paTool, Manifest, ManifestRead, ManifestReader, ManifestStore, ValidationReport,
};
use crate::platforms::{ExtractedMetadata, PlatformRegistry};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub const MESSAGE_AI: &str = "AI-generated content detected";
pub const MESSAGE_HUMAN: &str = "Human-created content";
pub const MESSAGE_UNRECOGNIZED: &str = "No C2PA manifest or platform not recognized";

/// A recognised platform and what its extractor concluded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inspection {
    pub platform: String,
    pub company: String,
    pub metadata: ExtractedMetadata,
    pub ai_generated: bool,
    /// Whether the reader produced a manifest at all.
    pub manifest_found: bool,
    /// Always false when no manifest was obtained.
    pub signature_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub validation: Option<ValidationReport>,
}

impl Inspection {
    pub fn message(&self) -> &'static str {
        if self.ai_generated {
            MESSAGE_AI
        } else {
            MESSAGE_HUMAN
        }
    }
}

/// Wire shape of the `/validate/*` endpoints, also decoded by the remote
/// verification client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResponse {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub metadata: Option<ExtractedMetadata>,
    /// `null` when no platform was recognised.
    #[serde(default)]
    pub ai_detected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub signature_valid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub url: Option<String>,
}

impl ValidationResponse {
    pub fn unrecognized() -> Self {
        Self {
            is_valid: false,
            message: Some(MESSAGE_UNRECOGNIZED.to_string()),
            ..Default::default()
        }
    }

    /// Response for an inspection result; `None` means nothing was recognised.
    pub fn from_inspection(inspection: Option<Inspection>) -> Self {
        let Some(found) = inspection else {
            return Self::unrecognized();
        };
        Self {
            is_valid: true,
            message: Some(found.message().to_string()),
            platform: Some(found.platform),
            company: Some(found.company),
            ai_detected: Some(found.ai_generated),
            signature_valid: Some(found.signature_valid),
            metadata: Some(found.metadata),
            url: None,
        }
    }

    pub fn with_signature(mut self, signature_valid: bool) -> Self {
        self.signature_valid = Some(signature_valid);
        self
    }

    pub fn without_signature(mut self) -> Self {
        self.signature_valid = None;
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Runs the embedded-manifest pipeline against a file or an upload.
///
/// Cheap to clone; the reader and registry are shared read-only.
#[derive(Clone)]
pub struct ManifestInspector {
    reader: Arc<dyn ManifestReader>,
    registry: Arc<PlatformRegistry>,
    limits: IOLimits,
}

impl ManifestInspector {
    pub fn new(
        reader: Arc<dyn ManifestReader>,
        registry: Arc<PlatformRegistry>,
        limits: IOLimits,
    ) -> Self {
        Self {
            reader,
            registry,
            limits,
        }
    }

    pub fn with_limits(mut self, limits: IOLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn reader_available(&self) -> bool {
        self.reader.is_available()
    }

    pub fn registry(&self) -> &PlatformRegistry {
        &self.registry
    }

    /// Inspect a file on disk. `Ok(None)` when no platform was recognised.
    pub fn inspect_file(&self, path: &Path) -> Result<Option<Inspection>> {
        let raw = read_raw(path, &self.limits)?;
        Ok(self.inspect_with(path, &raw.bytes))
    }

    /// Inspect uploaded bytes. They are handed to the reader through a
    /// per-call temporary file carrying `extension`; the file is removed on
    /// return, including on error.
    pub fn inspect_bytes(&self, bytes: &[u8], extension: Option<&str>) -> Result<Option<Inspection>> {
        let temp = spill_to_temp(bytes, extension)?;
        Ok(self.inspect_with(temp.path(), bytes))
    }

    fn inspect_with(&self, path: &Path, raw: &[u8]) -> Option<Inspection> {
        let ManifestRead {
            manifest,
            signature_valid,
            validation,
        } = self.reader.read(path);
        let (platform, extractor) = self.registry.identify(manifest.as_ref(), raw);
        let Some(extractor) = extractor else {
            debug!(file = ?path, "no platform recognised");
            return None;
        };

        let metadata = extractor.extract_metadata(manifest.as_ref(), raw);
        let ai_generated = extractor.is_ai_generated(&metadata);

        debug!(
            platform,
            ai_generated,
            signature_valid,
            manifest_found = manifest.is_some(),
            "manifest inspection finished"
        );

        Some(Inspection {
            platform: platform.to_string(),
            company: metadata.company.clone(),
            metadata,
            ai_generated,
            manifest_found: manifest.is_some(),
            signature_valid,
            validation,
        })
    }
}

/// Why the manifest store could not be read, in the HTTP error shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreError {
    pub error: &'static str,
    pub detail: String,
}

/// Full provenance picture of one file for manual inspection: the whole
/// manifest store, its validation verdict, the platform the registry
/// settles on and the raw C2PA/JUMBF marker hits. The marker scan does not
/// depend on the store, so files with broken signatures still show where
/// their C2PA data sits.
#[derive(Debug, Clone, Serialize)]
pub struct ManifestDump {
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<ManifestStore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_error: Option<StoreError>,
    pub platform: String,
    pub platform_markers: Vec<String>,
    pub raw_markers: Vec<MarkerHit>,
}

impl ManifestDump {
    pub fn collect(
        tool: &C2paTool,
        registry: &PlatformRegistry,
        path: &Path,
        limits: &IOLimits,
    ) -> Result<Self> {
        let raw = read_raw(path, limits)?;
        let (store, store_error) = match tool.read_store(path) {
            Ok(store) => (Some(store), None),
            Err(failure) => {
                let detail = failure.to_string();
                let error = DetectorError::from(failure).kind();
                (None, Some(StoreError { error, detail }))
            }
        };

        let active = store.as_ref().and_then(ManifestStore::active);
        let (platform, extractor) = registry.identify(active, &raw.bytes);
        let platform_markers = extractor
            .map(|e| e.search_raw_data(&raw.bytes))
            .unwrap_or_default();

        Ok(Self {
            file: path.display().to_string(),
            validation: store.as_ref().map(ManifestStore::validation_report),
            store_error,
            platform: platform.to_string(),
            platform_markers,
            raw_markers: jumbf::scan(&raw.bytes),
            store,
        })
    }

    pub fn active_manifest(&self) -> Option<&Manifest> {
        self.store.as_ref()?.active()
    }

    /// A store was read or at least one raw marker was seen.
    pub fn found_anything(&self) -> bool {
        self.store.is_some() || !self.raw_markers.is_empty()
    }
}
