//! Analysis result model: verdicts, confidence tiers and per-tier outcomes.

use crate::classifier::ClassifierStatus;
use crate::error::Result;
use crate::inspect::Inspection;
use crate::remote::RemoteOutcome;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Final classification of a file's origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "file_not_found")]
    FileNotFound,
    #[serde(rename = "AI_DETECTED_C2PA_API")]
    AiDetectedC2paApi,
    #[serde(rename = "HUMAN_VERIFIED_C2PA_API")]
    HumanVerifiedC2paApi,
    #[serde(rename = "AI_DETECTED_C2PA")]
    AiDetectedC2pa,
    #[serde(rename = "HUMAN_VERIFIED")]
    HumanVerified,
    #[serde(rename = "NO_C2PA_FOUND")]
    NoC2paFound,
    #[serde(rename = "AI_LIKELY")]
    AiLikely,
    #[serde(rename = "HUMAN_LIKELY")]
    HumanLikely,
    #[serde(rename = "UNCERTAIN")]
    Uncertain,
    #[serde(rename = "UNSUPPORTED_FORMAT")]
    UnsupportedFormat,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        use Verdict::*;
        match self {
            FileNotFound => "file_not_found",
            AiDetectedC2paApi => "AI_DETECTED_C2PA_API",
            HumanVerifiedC2paApi => "HUMAN_VERIFIED_C2PA_API",
            AiDetectedC2pa => "AI_DETECTED_C2PA",
            HumanVerified => "HUMAN_VERIFIED",
            NoC2paFound => "NO_C2PA_FOUND",
            AiLikely => "AI_LIKELY",
            HumanLikely => "HUMAN_LIKELY",
            Uncertain => "UNCERTAIN",
            UnsupportedFormat => "UNSUPPORTED_FORMAT",
        }
    }

    /// Whether the verdict points at generative origin.
    pub fn is_ai(&self) -> bool {
        matches!(
            self,
            Verdict::AiDetectedC2paApi | Verdict::AiDetectedC2pa | Verdict::AiLikely
        )
    }

    /// Whether the verdict points at human origin.
    pub fn is_human(&self) -> bool {
        matches!(
            self,
            Verdict::HumanVerifiedC2paApi | Verdict::HumanVerified | Verdict::HumanLikely
        )
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse trust label, fixed by the tier that resolved the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Confidence {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "medium-high")]
    MediumHigh,
    #[serde(rename = "high")]
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::None => "none",
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::MediumHigh => "medium-high",
            Confidence::High => "high",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of the embedded-manifest tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManifestStatus {
    /// No manifest reader in this runtime.
    Unavailable,
    NoPlatformDetected,
    /// AI and validly signed.
    AiConfirmed,
    /// AI, but unsigned or with an invalid signature.
    AiConfirmedUnsigned,
    /// Not AI and validly signed.
    HumanVerified,
    /// Not AI, unsigned or invalid. Not conclusive.
    SignatureInvalid,
    /// The file's own bytes could not be read.
    Error,
}

impl ManifestStatus {
    pub fn as_str(&self) -> &'static str {
        use ManifestStatus::*;
        match self {
            Unavailable => "unavailable",
            NoPlatformDetected => "no_platform_detected",
            AiConfirmed => "ai_confirmed",
            AiConfirmedUnsigned => "ai_confirmed_unsigned",
            HumanVerified => "human_verified",
            SignatureInvalid => "signature_invalid",
            Error => "error",
        }
    }

    /// Status for a recognised platform.
    pub fn from_flags(ai_generated: bool, signature_valid: bool) -> Self {
        match (ai_generated, signature_valid) {
            (true, true) => ManifestStatus::AiConfirmed,
            (true, false) => ManifestStatus::AiConfirmedUnsigned,
            (false, true) => ManifestStatus::HumanVerified,
            (false, false) => ManifestStatus::SignatureInvalid,
        }
    }

    /// Verdict when this tier is conclusive.
    pub fn resolution(&self) -> Option<(Verdict, Confidence)> {
        match self {
            ManifestStatus::AiConfirmed => Some((Verdict::AiDetectedC2pa, Confidence::High)),
            ManifestStatus::AiConfirmedUnsigned => {
                Some((Verdict::AiDetectedC2pa, Confidence::MediumHigh))
            }
            ManifestStatus::HumanVerified => Some((Verdict::HumanVerified, Confidence::High)),
            _ => None,
        }
    }
}

impl fmt::Display for ManifestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tier-2 outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestOutcome {
    pub status: ManifestStatus,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub inspection: Option<Inspection>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl ManifestOutcome {
    pub fn new(status: ManifestStatus) -> Self {
        Self {
            status,
            inspection: None,
            error: None,
        }
    }

    pub fn inspected(inspection: Inspection) -> Self {
        Self {
            status: ManifestStatus::from_flags(inspection.ai_generated, inspection.signature_valid),
            inspection: Some(inspection),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(ManifestStatus::Error)
        }
    }
}

/// Tier-3 outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionOutcome {
    pub status: ClassifierStatus,
    /// AI probability in `[0, 1]`.
    pub score: f64,
}

impl DetectionOutcome {
    pub fn resolution(&self) -> (Verdict, Confidence) {
        match self.status {
            ClassifierStatus::AiLikely => (Verdict::AiLikely, Confidence::Medium),
            ClassifierStatus::HumanLikely => (Verdict::HumanLikely, Confidence::Medium),
            _ => (Verdict::Uncertain, Confidence::Low),
        }
    }
}

/// Everything one analysis produced. Tiers never attempted stay `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub file: String,
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sha256: Option<String>,
    pub analyzed_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub api: Option<RemoteOutcome>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub manifest: Option<ManifestOutcome>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub detection: Option<DetectionOutcome>,
    pub final_verdict: Verdict,
    pub confidence: Confidence,
}

impl AnalysisResult {
    /// Fresh result for `path`; the verdict is set by the orchestrator.
    pub fn new(path: &Path) -> Self {
        Self {
            file: path.display().to_string(),
            exists: false,
            size_bytes: None,
            sha256: None,
            analyzed_at: Utc::now(),
            api: None,
            manifest: None,
            detection: None,
            final_verdict: Verdict::Uncertain,
            confidence: Confidence::None,
        }
    }

    /// Names of the tiers that ran, in order.
    pub fn tiers_attempted(&self) -> Vec<&'static str> {
        let mut tiers = Vec::new();
        if self.api.is_some() {
            tiers.push("api");
        }
        if self.manifest.is_some() {
            tiers.push("manifest");
        }
        if self.detection.is_some() {
            tiers.push("detection");
        }
        tiers
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
