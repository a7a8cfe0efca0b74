//! C2PA manifest data model and the reader seam.
//!
//! Manifests are produced by an external reader and treated as read-only.
//! Every field is serde-defaulted so partially populated manifests decode.

pub mod c2patool;
pub mod jumbf;

pub use c2patool::{C2paTool, ReadFailure};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// One entry of `claim_generator_info`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaimGeneratorInfo {
    pub name: Option<String>,
    pub version: Option<String>,
}

impl ClaimGeneratorInfo {
    pub fn new(name: impl Into<String>, version: Option<&str>) -> Self {
        Self {
            name: Some(name.into()),
            version: version.map(str::to_string),
        }
    }
}

/// Signer details attached to the claim signature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignatureInfo {
    pub issuer: Option<String>,
    pub organization: Option<String>,
    pub common_name: Option<String>,
    pub alg: Option<String>,
    pub time: Option<String>,
}

/// A single provenance assertion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Assertion {
    pub label: String,
    pub data: serde_json::Value,
}

impl Assertion {
    pub fn new(label: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            label: label.into(),
            data,
        }
    }
}

/// The active manifest of a file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    /// Legacy single-string generator, e.g. `"Adobe_Photoshop/25.0 adobe_c2pa/0.7"`.
    pub claim_generator: Option<String>,
    pub claim_generator_info: Vec<ClaimGeneratorInfo>,
    pub signature_info: Option<SignatureInfo>,
    pub assertions: Vec<Assertion>,
    pub title: Option<String>,
    pub format: Option<String>,
    pub creator: Option<String>,
    pub author: Option<String>,
    pub producer: Option<String>,
}

impl Manifest {
    /// First structured claim generator, if any.
    pub fn first_generator(&self) -> Option<&ClaimGeneratorInfo> {
        self.claim_generator_info.first()
    }

    /// Name of the first claim generator, falling back to the legacy string.
    pub fn first_generator_name(&self) -> Option<&str> {
        self.first_generator()
            .and_then(|g| g.name.as_deref())
            .or(self.claim_generator.as_deref())
    }

    /// Labels of all assertions in manifest order.
    pub fn assertion_labels(&self) -> Vec<String> {
        self.assertions
            .iter()
            .filter(|a| !a.label.is_empty())
            .map(|a| a.label.clone())
            .collect()
    }
}

/// A validation status entry as reported by the C2PA toolchain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationStatus {
    pub code: String,
    pub url: Option<String>,
    pub explanation: Option<String>,
}

/// Per-manifest status buckets emitted by newer toolchain releases.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusCodes {
    pub success: Vec<ValidationStatus>,
    pub informational: Vec<ValidationStatus>,
    pub failure: Vec<ValidationStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationResults {
    #[serde(rename = "activeManifest")]
    pub active_manifest: Option<StatusCodes>,
}

/// Whole manifest store as printed by the reader tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestStore {
    pub active_manifest: Option<String>,
    pub manifests: BTreeMap<String, Manifest>,
    pub validation_status: Vec<ValidationStatus>,
    pub validation_results: Option<ValidationResults>,
    pub validation_state: Option<String>,
}

impl ManifestStore {
    /// The manifest named by `active_manifest`.
    pub fn active(&self) -> Option<&Manifest> {
        let label = self.active_manifest.as_deref()?;
        self.manifests.get(label)
    }

    /// Signature verdict for the active manifest.
    ///
    /// An explicit `validation_state` wins; otherwise the store is valid
    /// when no failure codes were reported.
    pub fn validation_report(&self) -> ValidationReport {
        let mut statuses: Vec<String> =
            self.validation_status.iter().map(|s| s.code.clone()).collect();
        if let Some(active) = self
            .validation_results
            .as_ref()
            .and_then(|r| r.active_manifest.as_ref())
        {
            statuses.extend(active.failure.iter().map(|s| s.code.clone()));
        }

        let valid = match self.validation_state.as_deref() {
            Some(state) => matches!(state, "Valid" | "Trusted"),
            None => statuses.is_empty() && self.active().is_some(),
        };

        ValidationReport {
            valid,
            state: self.validation_state.clone(),
            statuses,
        }
    }
}

/// Outcome of signature validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub statuses: Vec<String>,
}

/// Active manifest and its signature verdict taken from one read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManifestRead {
    pub manifest: Option<Manifest>,
    /// Always false when `manifest` is `None`.
    pub signature_valid: bool,
    pub validation: Option<ValidationReport>,
}

/// Seam over the external manifest reader.
///
/// Implementations must never panic or leak collaborator errors: a read
/// failure is `None`, a validation failure is `(false, None)`.
pub trait ManifestReader: Send + Sync {
    /// Whether the underlying reader exists in this runtime.
    fn is_available(&self) -> bool;

    /// Active manifest of the file, or `None` on any read/parse failure.
    fn read_manifest(&self, path: &Path) -> Option<Manifest>;

    /// Signature validity plus the report it was derived from.
    fn validate_signature(&self, path: &Path) -> (bool, Option<ValidationReport>);

    /// Manifest plus signature verdict. Validation only runs when a
    /// manifest was found. Readers that decode the whole store in one pass
    /// override this so both halves come from the same read.
    fn read(&self, path: &Path) -> ManifestRead {
        let Some(manifest) = self.read_manifest(path) else {
            return ManifestRead::default();
        };
        let (signature_valid, validation) = self.validate_signature(path);
        ManifestRead {
            manifest: Some(manifest),
            signature_valid,
            validation,
        }
    }
}
