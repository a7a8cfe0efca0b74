use crate::common::{temp_media, CountingClassifier, CountingReader, HttpStub};
use provenant::classifier::{ClassifierStatus, HttpClassifier, ImageClassifier};
use provenant::config::{ClassifierConfig, RemoteConfig};
use provenant::detector::{Confidence, Detector, Verdict};
use provenant::platforms::PlatformRegistry;
use provenant::remote::{HttpVerifier, RemoteStatus, RemoteVerifier};
use std::sync::Arc;

fn verifier(stub: &HttpStub) -> HttpVerifier {
    HttpVerifier::new(&RemoteConfig {
        enabled: true,
        endpoint: format!("{}/", stub.base_url),
        timeout_secs: 5,
    })
}

fn classifier(stub: &HttpStub, token: Option<&str>) -> HttpClassifier {
    let config = ClassifierConfig {
        endpoint: Some(stub.url("/classify")),
        timeout_secs: 5,
        ..Default::default()
    };
    HttpClassifier::with_token(&config, token.map(str::to_string))
}

#[test]
fn verifier_uploads_multipart_and_decodes_success() {
    let stub = HttpStub::start(
        200,
        r#"{"isValid":true,"platform":"openai","company":"OpenAI","aiDetected":true,"signatureValid":true,"message":"AI-generated content detected"}"#,
    );
    let file = temp_media(b"image-bytes", "png");
    let outcome = verifier(&stub).check(file.path());

    assert_eq!(outcome.status, RemoteStatus::ApiSuccess);
    assert!(outcome.ai_detected());
    let response = outcome.response.unwrap();
    assert_eq!(response.platform.as_deref(), Some("openai"));
    assert_eq!(response.signature_valid, Some(true));

    let requests = stub.finish();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, "/validate/file");
    assert!(requests[0]
        .header("content-type")
        .unwrap()
        .starts_with("multipart/form-data"));
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("image-bytes"));
}

#[test]
fn verifier_keeps_success_when_metadata_has_unexpected_types() {
    let stub = HttpStub::start(
        200,
        r#"{"isValid":true,"platform":"openai","aiDetected":true,"metadata":{"company":"OpenAI","generative_type":{"kind":"text-to-image"},"detected_markers":["ChatGPT"]}}"#,
    );
    let file = temp_media(b"image-bytes", "png");
    let outcome = verifier(&stub).check(file.path());

    assert_eq!(outcome.status, RemoteStatus::ApiSuccess);
    assert!(outcome.ai_detected());
    let metadata = outcome.response.unwrap().metadata.unwrap();
    assert_eq!(metadata.company, "OpenAI");
    assert_eq!(metadata.detected_markers, vec!["ChatGPT"]);
    assert!(metadata.generative_type.unwrap().contains("text-to-image"));
    stub.finish();
}

#[test]
fn verifier_streams_large_file_with_length() {
    let stub = HttpStub::start(200, r#"{"isValid":false}"#);
    let payload = vec![b'v'; 3 * 1024 * 1024 / 2];
    let file = temp_media(&payload, "mp4");
    let outcome = verifier(&stub).check(file.path());
    assert_eq!(outcome.status, RemoteStatus::NoManifestApi);

    let requests = stub.finish();
    assert!(requests[0].header("content-length").is_some());
    assert!(requests[0].body.len() > payload.len());
}

#[test]
fn verifier_maps_invalid_answer_to_no_manifest() {
    let stub = HttpStub::start(
        200,
        r#"{"isValid":false,"aiDetected":null,"message":"No C2PA manifest or platform not recognized"}"#,
    );
    let file = temp_media(b"x", "jpg");
    let outcome = verifier(&stub).check(file.path());
    assert_eq!(outcome.status, RemoteStatus::NoManifestApi);
    assert_eq!(
        outcome.message.as_deref(),
        Some("No C2PA manifest or platform not recognized")
    );
    stub.finish();
}

#[test]
fn verifier_maps_server_error_to_api_error() {
    let stub = HttpStub::start(500, r#"{"error":"internal"}"#);
    let file = temp_media(b"x", "jpg");
    let outcome = verifier(&stub).check(file.path());
    assert_eq!(outcome.status, RemoteStatus::ApiError);
    assert_eq!(outcome.status_code, Some(500));
    stub.finish();
}

#[test]
fn verifier_maps_garbage_body_to_api_error() {
    let stub = HttpStub::start(200, "not json");
    let file = temp_media(b"x", "jpg");
    let outcome = verifier(&stub).check(file.path());
    assert_eq!(outcome.status, RemoteStatus::ApiError);
    assert!(outcome.error.is_some());
    stub.finish();
}

#[test]
fn detector_with_live_verifier_stops_at_tier_one() {
    let stub = HttpStub::start(200, r#"{"isValid":true,"aiDetected":false}"#);
    let reader = CountingReader::new(None, true);
    let classifier = CountingClassifier::unavailable();
    let detector = Detector::with_collaborators(
        Arc::new(verifier(&stub)),
        reader.clone(),
        classifier.clone(),
        Arc::new(PlatformRegistry::with_default_platforms()),
    );
    let file = temp_media(b"camera jpeg", "jpg");
    let result = detector.analyze(file.path());
    assert_eq!(result.final_verdict, Verdict::HumanVerifiedC2paApi);
    assert_eq!(result.confidence, Confidence::High);
    assert_eq!(reader.reads(), 0);
    stub.finish();
}

#[test]
fn classifier_sends_bearer_token_and_scores_ai_label() {
    let stub = HttpStub::start(
        200,
        r#"[{"label":"artificial","score":0.91},{"label":"human","score":0.09}]"#,
    );
    let file = temp_media(b"\xff\xd8\xffpixels", "jpg");
    let (status, score) = classifier(&stub, Some("secret-token")).detect(file.path());
    assert_eq!(status, ClassifierStatus::AiLikely);
    assert!((score - 0.91).abs() < 1e-9);

    let requests = stub.finish();
    assert_eq!(
        requests[0].header("authorization"),
        Some("Bearer secret-token")
    );
    assert_eq!(requests[0].body, b"\xff\xd8\xffpixels");
}

#[test]
fn classifier_inverts_human_label() {
    let stub = HttpStub::start(200, r#"[[{"label":"human","score":0.8}]]"#);
    let file = temp_media(b"pixels", "png");
    let (status, score) = classifier(&stub, None).detect(file.path());
    assert_eq!(status, ClassifierStatus::HumanLikely);
    assert!((score - 0.2).abs() < 1e-9);
    let requests = stub.finish();
    assert!(requests[0].header("authorization").is_none());
}

#[test]
fn classifier_http_failure_is_error() {
    let stub = HttpStub::start(503, r#"{"error":"model is loading"}"#);
    let file = temp_media(b"pixels", "png");
    assert_eq!(
        classifier(&stub, None).detect(file.path()),
        (ClassifierStatus::Error, 0.0)
    );
    stub.finish();
}
