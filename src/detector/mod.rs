//! Three-tier detection orchestrator.
//!
//! Tier 1 asks the remote verification service, tier 2 reads the embedded
//! manifest and resolves the vendor platform, tier 3 runs the image
//! classifier. Tiers run strictly in sequence and the first conclusive one
//! decides the verdict; later tiers are never attempted.

pub mod result;

pub use result::{
    AnalysisResult, Confidence, DetectionOutcome, ManifestOutcome, ManifestStatus, Verdict,
};

use crate::classifier::{HttpClassifier, ImageClassifier};
use crate::config::DetectorConfig;
use crate::inspect::ManifestInspector;
use crate::io::{sha256_file, IOLimits};
use crate::manifest::{C2paTool, ManifestReader};
use crate::media::MediaKind;
use crate::platforms::PlatformRegistry;
use crate::remote::{HttpVerifier, RemoteOutcome, RemoteStatus, RemoteVerifier};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn};

/// Which collaborators this detector can reach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollaboratorStatus {
    pub manifest_reader: bool,
    pub classifier: bool,
    pub platforms: Vec<String>,
}

/// The orchestrator. Collaborators are shared read-only, so one detector
/// can serve concurrent analyses.
#[derive(Clone)]
pub struct Detector {
    remote: Arc<dyn RemoteVerifier>,
    inspector: ManifestInspector,
    classifier: Arc<dyn ImageClassifier>,
}

impl Detector {
    /// Wire the concrete adapters described by `config`.
    pub fn from_config(config: &DetectorConfig) -> Self {
        Self::with_collaborators(
            Arc::new(HttpVerifier::new(&config.remote)),
            Arc::new(C2paTool::new(&config.manifest)),
            Arc::new(HttpClassifier::new(&config.classifier)),
            Arc::new(PlatformRegistry::with_default_platforms()),
        )
        .with_io_limits(IOLimits::from(&config.io))
    }

    pub fn with_collaborators(
        remote: Arc<dyn RemoteVerifier>,
        reader: Arc<dyn ManifestReader>,
        classifier: Arc<dyn ImageClassifier>,
        registry: Arc<PlatformRegistry>,
    ) -> Self {
        Self {
            remote,
            inspector: ManifestInspector::new(reader, registry, IOLimits::default()),
            classifier,
        }
    }

    pub fn with_io_limits(mut self, limits: IOLimits) -> Self {
        self.inspector = self.inspector.with_limits(limits);
        self
    }

    pub fn inspector(&self) -> &ManifestInspector {
        &self.inspector
    }

    pub fn collaborator_status(&self) -> CollaboratorStatus {
        CollaboratorStatus {
            manifest_reader: self.inspector.reader_available(),
            classifier: self.classifier.is_available(),
            platforms: self.inspector.registry().platform_names(),
        }
    }

    /// Analyse one file. Never fails: every problem becomes a tier status.
    pub fn analyze(&self, path: impl AsRef<Path>) -> AnalysisResult {
        let path = path.as_ref();
        let span = info_span!("analyze", file = %path.display());
        let _guard = span.enter();

        let mut result = AnalysisResult::new(path);
        if !path.exists() {
            return finish(result, Verdict::FileNotFound, Confidence::None);
        }
        result.exists = true;
        match sha256_file(path) {
            Ok((digest, size)) => {
                result.sha256 = Some(digest);
                result.size_bytes = Some(size);
            }
            Err(e) => debug!("Could not hash {:?}: {}", path, e),
        }

        let api = self.check_remote(path);
        let resolved = remote_resolution(&api);
        result.api = Some(api);
        if let Some((verdict, confidence)) = resolved {
            return finish(result, verdict, confidence);
        }

        let manifest = self.check_embedded(path);
        let resolved = manifest.status.resolution();
        result.manifest = Some(manifest);
        if let Some((verdict, confidence)) = resolved {
            return finish(result, verdict, confidence);
        }

        match MediaKind::from_path(path) {
            MediaKind::Video => finish(result, Verdict::NoC2paFound, Confidence::None),
            MediaKind::Image => {
                let (status, score) = self.classifier.detect(path);
                debug!(status = status.as_str(), score, "heuristic tier");
                let detection = DetectionOutcome { status, score };
                let (verdict, confidence) = detection.resolution();
                result.detection = Some(detection);
                finish(result, verdict, confidence)
            }
            MediaKind::Other => finish(result, Verdict::UnsupportedFormat, Confidence::None),
        }
    }

    /// Tier 1.
    pub fn check_remote(&self, path: &Path) -> RemoteOutcome {
        let outcome = self.remote.check(path);
        debug!(status = outcome.status.as_str(), "remote tier");
        outcome
    }

    /// Tier 2.
    pub fn check_embedded(&self, path: &Path) -> ManifestOutcome {
        if !self.inspector.reader_available() {
            debug!("manifest tier: reader unavailable");
            return ManifestOutcome::new(ManifestStatus::Unavailable);
        }

        let outcome = match self.inspector.inspect_file(path) {
            Ok(Some(inspection)) => ManifestOutcome::inspected(inspection),
            Ok(None) => ManifestOutcome::new(ManifestStatus::NoPlatformDetected),
            Err(e) => {
                warn!("Manifest tier could not read {:?}: {}", path, e);
                ManifestOutcome::failed(e.to_string())
            }
        };
        debug!(status = outcome.status.as_str(), "manifest tier");
        outcome
    }
}

fn remote_resolution(outcome: &RemoteOutcome) -> Option<(Verdict, Confidence)> {
    if outcome.status != RemoteStatus::ApiSuccess {
        return None;
    }
    if outcome.ai_detected() {
        Some((Verdict::AiDetectedC2paApi, Confidence::High))
    } else {
        Some((Verdict::HumanVerifiedC2paApi, Confidence::High))
    }
}

fn finish(mut result: AnalysisResult, verdict: Verdict, confidence: Confidence) -> AnalysisResult {
    result.final_verdict = verdict;
    result.confidence = confidence;
    info!(
        verdict = verdict.as_str(),
        confidence = confidence.as_str(),
        tiers = ?result.tiers_attempted(),
        "analysis finished"
    );
    result
}
