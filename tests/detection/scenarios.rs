use crate::common::{temp_media, CountingClassifier, CountingReader, CountingRemote};
use provenant::classifier::ClassifierStatus;
use provenant::detector::{Confidence, Detector, ManifestStatus, Verdict};
use provenant::inspect::ValidationResponse;
use provenant::manifest::{ClaimGeneratorInfo, Manifest, SignatureInfo};
use provenant::platforms::PlatformRegistry;
use provenant::remote::{RemoteOutcome, RemoteStatus};
use std::sync::Arc;

fn registry() -> Arc<PlatformRegistry> {
    Arc::new(PlatformRegistry::with_default_platforms())
}

fn generated_by(name: &str) -> Manifest {
    Manifest {
        claim_generator_info: vec![ClaimGeneratorInfo::new(name, Some("1.0"))],
        signature_info: Some(SignatureInfo {
            issuer: Some("Truepic Lens CA".into()),
            common_name: Some("OpenAI Media Signer".into()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[test]
fn remote_success_short_circuits_later_tiers() {
    let remote = CountingRemote::new(RemoteOutcome::success(ValidationResponse {
        is_valid: true,
        platform: Some("openai".into()),
        ai_detected: Some(true),
        ..Default::default()
    }));
    let reader = CountingReader::new(Some(generated_by("ChatGPT")), true);
    let classifier = CountingClassifier::new(ClassifierStatus::HumanLikely, 0.1);
    let detector = Detector::with_collaborators(
        remote.clone(),
        reader.clone(),
        classifier.clone(),
        registry(),
    );

    let file = temp_media(b"ChatGPT image bytes", "png");
    let result = detector.analyze(file.path());

    assert_eq!(result.final_verdict, Verdict::AiDetectedC2paApi);
    assert_eq!(result.confidence, Confidence::High);
    assert_eq!(result.tiers_attempted(), vec!["api"]);
    assert_eq!(remote.calls(), 1);
    assert_eq!(reader.reads(), 0);
    assert_eq!(classifier.calls(), 0);
}

#[test]
fn remote_human_verdict() {
    let remote = CountingRemote::new(RemoteOutcome::success(ValidationResponse {
        is_valid: true,
        ai_detected: Some(false),
        ..Default::default()
    }));
    let detector = Detector::with_collaborators(
        remote,
        CountingReader::unavailable(),
        CountingClassifier::unavailable(),
        registry(),
    );
    let file = temp_media(b"signed camera photo", "jpg");
    let result = detector.analyze(file.path());
    assert_eq!(result.final_verdict, Verdict::HumanVerifiedC2paApi);
    assert_eq!(result.confidence, Confidence::High);
}

#[test]
fn signed_chatgpt_manifest_is_ai_with_high_confidence() {
    let reader = CountingReader::new(Some(generated_by("ChatGPT")), true);
    let classifier = CountingClassifier::new(ClassifierStatus::HumanLikely, 0.1);
    let detector = Detector::with_collaborators(
        CountingRemote::new(RemoteOutcome::unavailable(None)),
        reader.clone(),
        classifier.clone(),
        registry(),
    );

    let file = temp_media(b"\x89PNG....c2pa....ChatGPT....", "png");
    let result = detector.analyze(file.path());

    assert_eq!(result.final_verdict, Verdict::AiDetectedC2pa);
    assert_eq!(result.confidence, Confidence::High);
    assert_eq!(result.tiers_attempted(), vec!["api", "manifest"]);

    let manifest = result.manifest.as_ref().unwrap();
    assert_eq!(manifest.status, ManifestStatus::AiConfirmed);
    let inspection = manifest.inspection.as_ref().unwrap();
    assert_eq!(inspection.platform, "openai");
    assert_eq!(inspection.company, "OpenAI");
    assert!(inspection.metadata.detected_markers.contains(&"ChatGPT".to_string()));
    assert_eq!(reader.validations(), 1);
    assert_eq!(classifier.calls(), 0);
}

#[test]
fn unsigned_ai_manifest_is_medium_high() {
    let detector = Detector::with_collaborators(
        CountingRemote::new(RemoteOutcome::unavailable(None)),
        CountingReader::new(Some(generated_by("ChatGPT")), false),
        CountingClassifier::unavailable(),
        registry(),
    );
    let file = temp_media(b"....ChatGPT....", "png");
    let result = detector.analyze(file.path());
    assert_eq!(result.final_verdict, Verdict::AiDetectedC2pa);
    assert_eq!(result.confidence, Confidence::MediumHigh);
    assert_eq!(
        result.manifest.unwrap().status,
        ManifestStatus::AiConfirmedUnsigned
    );
}

#[test]
fn signed_photoshop_manifest_is_human_verified() {
    let manifest = Manifest {
        claim_generator_info: vec![ClaimGeneratorInfo::new("Adobe Photoshop", Some("25.0"))],
        ..Default::default()
    };
    let classifier = CountingClassifier::new(ClassifierStatus::AiLikely, 0.9);
    let detector = Detector::with_collaborators(
        CountingRemote::new(RemoteOutcome::unavailable(None)),
        CountingReader::new(Some(manifest), true),
        classifier.clone(),
        registry(),
    );
    let file = temp_media(b"plain jpeg body", "jpg");
    let result = detector.analyze(file.path());
    assert_eq!(result.final_verdict, Verdict::HumanVerified);
    assert_eq!(result.confidence, Confidence::High);
    assert_eq!(classifier.calls(), 0);
}

#[test]
fn camera_capture_without_signature_falls_through_to_classifier() {
    let reader = CountingReader::new(None, true);
    let classifier = CountingClassifier::new(ClassifierStatus::HumanLikely, 0.2);
    let detector = Detector::with_collaborators(
        CountingRemote::new(RemoteOutcome::http_error(503)),
        reader.clone(),
        classifier.clone(),
        registry(),
    );
    let file = temp_media(b"..Google..Pixel Camera..", "jpg");
    let result = detector.analyze(file.path());

    let manifest = result.manifest.as_ref().unwrap();
    assert_eq!(manifest.status, ManifestStatus::SignatureInvalid);
    let inspection = manifest.inspection.as_ref().unwrap();
    assert_eq!(inspection.platform, "google");
    assert!(!inspection.ai_generated);
    assert_eq!(reader.validations(), 0);

    assert_eq!(classifier.calls(), 1);
    assert_eq!(result.final_verdict, Verdict::HumanLikely);
    assert_eq!(result.confidence, Confidence::Medium);
    assert_eq!(result.tiers_attempted(), vec!["api", "manifest", "detection"]);
    assert_eq!(result.api.unwrap().status, RemoteStatus::ApiError);
}

#[test]
fn classifier_ai_likely() {
    let detector = Detector::with_collaborators(
        CountingRemote::new(RemoteOutcome::unavailable(None)),
        CountingReader::new(None, false),
        CountingClassifier::new(ClassifierStatus::AiLikely, 0.87),
        registry(),
    );
    let file = temp_media(b"no vendor text at all", "webp");
    let result = detector.analyze(file.path());
    assert_eq!(
        result.manifest.as_ref().unwrap().status,
        ManifestStatus::NoPlatformDetected
    );
    assert_eq!(result.final_verdict, Verdict::AiLikely);
    assert_eq!(result.confidence, Confidence::Medium);
    assert!((result.detection.unwrap().score - 0.87).abs() < 1e-12);
}

#[test]
fn video_without_manifest_never_reaches_classifier() {
    let classifier = CountingClassifier::new(ClassifierStatus::AiLikely, 0.99);
    let detector = Detector::with_collaborators(
        CountingRemote::new(RemoteOutcome::no_manifest("No manifest")),
        CountingReader::new(None, false),
        classifier.clone(),
        registry(),
    );
    let file = temp_media(b"\x00\x00\x00\x18ftypmp42", "MP4");
    let result = detector.analyze(file.path());
    assert_eq!(result.final_verdict, Verdict::NoC2paFound);
    assert_eq!(result.confidence, Confidence::None);
    assert!(result.detection.is_none());
    assert_eq!(classifier.calls(), 0);
}

#[test]
fn image_with_no_markers_and_no_classifier_is_uncertain() {
    let detector = Detector::with_collaborators(
        CountingRemote::new(RemoteOutcome::unavailable(None)),
        CountingReader::new(None, false),
        CountingClassifier::unavailable(),
        registry(),
    );
    let file = temp_media(b"\xff\xd8\xff\xe0 just pixels", "jpg");
    let result = detector.analyze(file.path());
    assert_eq!(result.final_verdict, Verdict::Uncertain);
    assert_eq!(result.confidence, Confidence::Low);
    assert_eq!(result.size_bytes, Some(16));
    assert_eq!(result.sha256.as_ref().map(String::len), Some(64));
}

#[test]
fn unavailable_reader_is_skipped() {
    let reader = CountingReader::unavailable();
    let detector = Detector::with_collaborators(
        CountingRemote::new(RemoteOutcome::unavailable(None)),
        reader.clone(),
        CountingClassifier::unavailable(),
        registry(),
    );
    let file = temp_media(b"...Firefly...", "png");
    let result = detector.analyze(file.path());
    assert_eq!(
        result.manifest.as_ref().unwrap().status,
        ManifestStatus::Unavailable
    );
    assert_eq!(reader.reads(), 0);
    assert_eq!(result.final_verdict, Verdict::Uncertain);
}

#[test]
fn unsupported_extension() {
    let classifier = CountingClassifier::new(ClassifierStatus::AiLikely, 0.9);
    let detector = Detector::with_collaborators(
        CountingRemote::new(RemoteOutcome::unavailable(None)),
        CountingReader::new(None, false),
        classifier.clone(),
        registry(),
    );
    let file = temp_media(b"%PDF-1.7", "pdf");
    let result = detector.analyze(file.path());
    assert_eq!(result.final_verdict, Verdict::UnsupportedFormat);
    assert_eq!(result.confidence, Confidence::None);
    assert_eq!(classifier.calls(), 0);
}

#[test]
fn missing_file_touches_no_collaborator() {
    let remote = CountingRemote::new(RemoteOutcome::unavailable(None));
    let reader = CountingReader::new(None, true);
    let detector = Detector::with_collaborators(
        remote.clone(),
        reader.clone(),
        CountingClassifier::unavailable(),
        registry(),
    );
    let result = detector.analyze("/definitely/not/here.png");
    assert_eq!(result.final_verdict, Verdict::FileNotFound);
    assert_eq!(result.confidence, Confidence::None);
    assert!(!result.exists);
    assert_eq!(remote.calls(), 0);
    assert_eq!(reader.reads(), 0);
}

#[test]
fn repeated_analysis_is_deterministic() {
    let detector = Detector::with_collaborators(
        CountingRemote::new(RemoteOutcome::unavailable(None)),
        CountingReader::new(Some(generated_by("DALL-E")), true),
        CountingClassifier::unavailable(),
        registry(),
    );
    let file = temp_media(b"..DALL-E..Truepic..", "png");
    let a = detector.analyze(file.path());
    let b = detector.analyze(file.path());
    assert_eq!(a.final_verdict, b.final_verdict);
    assert_eq!(a.confidence, b.confidence);
    assert_eq!(a.manifest, b.manifest);
    assert_eq!(a.sha256, b.sha256);
}

#[test]
fn json_result_carries_wire_names() {
    let detector = Detector::with_collaborators(
        CountingRemote::new(RemoteOutcome::unavailable(None)),
        CountingReader::new(Some(generated_by("ChatGPT")), true),
        CountingClassifier::unavailable(),
        registry(),
    );
    let file = temp_media(b"ChatGPT", "png");
    let json = detector.analyze(file.path()).to_json_string().unwrap();
    let v: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(v["final_verdict"], "AI_DETECTED_C2PA");
    assert_eq!(v["confidence"], "high");
    assert_eq!(v["api"]["status"], "api_unavailable");
    assert_eq!(v["manifest"]["status"], "ai_confirmed");
    assert!(v.get("detection").is_none());
}
