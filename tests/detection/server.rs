use crate::common::{CountingReader, HttpStub};
use axum::body::Bytes;
use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use base64::Engine;
use provenant::config::ServerConfig;
use provenant::inspect::ManifestInspector;
use provenant::io::IOLimits;
use provenant::manifest::{ClaimGeneratorInfo, Manifest, ManifestReader};
use provenant::platforms::PlatformRegistry;
use provenant::server::{router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;

fn test_server(reader: Arc<dyn ManifestReader>) -> TestServer {
    test_server_with(reader, ServerConfig::default())
}

fn test_server_with(reader: Arc<dyn ManifestReader>, config: ServerConfig) -> TestServer {
    let inspector = ManifestInspector::new(
        reader,
        Arc::new(PlatformRegistry::with_default_platforms()),
        IOLimits::default(),
    );
    let state = AppState::new(inspector, config).unwrap();
    TestServer::new(router(Arc::new(state))).unwrap()
}

fn capped(max_upload_bytes: usize) -> ServerConfig {
    ServerConfig {
        max_upload_bytes,
        ..Default::default()
    }
}

fn firefly_manifest() -> Manifest {
    Manifest {
        claim_generator_info: vec![ClaimGeneratorInfo::new("Adobe Firefly", None)],
        ..Default::default()
    }
}

#[tokio::test]
async fn health_and_platforms() {
    let server = test_server(CountingReader::unavailable());

    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["c2pa_available"], false);
    assert_eq!(body["platforms"], 4);

    let body: Value = server.get("/platforms").await.json();
    assert_eq!(body["count"], 4);
    assert_eq!(
        body["platforms"],
        json!(["openai", "google", "adobe", "microsoft"])
    );

    let body: Value = server.get("/").await.json();
    assert_eq!(body["service"], "provenant");
    assert!(body["endpoints"]["validate_file"].is_string());
}

#[tokio::test]
async fn validate_file_recognises_signed_firefly() {
    let reader = CountingReader::new(Some(firefly_manifest()), true);
    let server = test_server(reader.clone());

    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(b"\x89PNG...Adobe Firefly...".to_vec())
            .file_name("generated.png")
            .mime_type("image/png"),
    );
    let response = server.post("/validate/file").multipart(form).await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["isValid"], true);
    assert_eq!(body["platform"], "adobe");
    assert_eq!(body["company"], "Adobe");
    assert_eq!(body["aiDetected"], true);
    assert_eq!(body["signatureValid"], true);
    assert_eq!(body["message"], "AI-generated content detected");
    assert_eq!(body["metadata"]["software"], "Adobe Firefly");
    assert_eq!(reader.validations(), 1);
}

#[tokio::test]
async fn validate_file_unrecognised_is_not_an_error() {
    let server = test_server(CountingReader::new(None, false));
    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(b"ordinary bytes".to_vec()).file_name("holiday.jpg"),
    );
    let response = server.post("/validate/file").multipart(form).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["isValid"], false);
    assert!(body["aiDetected"].is_null());
    assert_eq!(body["signatureValid"], false);
    assert_eq!(body["message"], "No C2PA manifest or platform not recognized");
}

#[tokio::test]
async fn validate_file_without_file_field_is_400() {
    let server = test_server(CountingReader::unavailable());
    let form = MultipartForm::new().add_text("note", "no file here");
    let response = server.post("/validate/file").multipart(form).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "missing_input");
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn validate_base64_data_url() {
    let server = test_server(CountingReader::new(None, false));
    let encoded =
        base64::engine::general_purpose::STANDARD.encode(b"....Bing Image Creator....");
    let response = server
        .post("/validate/base64")
        .json(&json!({ "fileData": format!("data:image/jpeg;base64,{}", encoded) }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["isValid"], true);
    assert_eq!(body["platform"], "microsoft");
    assert_eq!(body["aiDetected"], true);
    assert_eq!(body["signatureValid"], false);
}

#[tokio::test]
async fn validate_base64_rejects_bad_payload() {
    let server = test_server(CountingReader::unavailable());
    let response = server
        .post("/validate/base64")
        .json(&json!({ "fileData": "@@@ definitely not base64 @@@" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "parse_failure");
}

#[tokio::test]
async fn validate_url_fetches_and_echoes_url() {
    let stub = HttpStub::start(200, "..Adobe Firefly..");
    let url = stub.url("/assets/render.png");
    let server = test_server(CountingReader::new(None, false));

    let response = server
        .post("/validate/url")
        .json(&json!({ "url": url }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["isValid"], true);
    assert_eq!(body["platform"], "adobe");
    assert_eq!(body["url"], url.as_str());
    assert!(body.get("signatureValid").is_none());

    let requests = tokio::task::spawn_blocking(move || stub.finish())
        .await
        .unwrap();
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].path, "/assets/render.png");
}

#[tokio::test]
async fn validate_url_rejects_other_schemes() {
    let server = test_server(CountingReader::unavailable());
    let response = server
        .post("/validate/url")
        .json(&json!({ "url": "ftp://example.com/a.png" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn validate_url_upstream_failure_is_500() {
    let stub = HttpStub::start(404, "{}");
    let server = test_server(CountingReader::unavailable());
    let response = server
        .post("/validate/url")
        .json(&json!({ "url": stub.url("/missing.png") }))
        .await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "transport_failure");
    tokio::task::spawn_blocking(move || stub.finish()).await.unwrap();
}

#[tokio::test]
async fn validate_url_refuses_body_over_upload_cap() {
    let stub = HttpStub::start(200, format!("..Adobe Firefly..{}", "x".repeat(4096)));
    let server = test_server_with(CountingReader::new(None, false), capped(1024));

    let response = server
        .post("/validate/url")
        .json(&json!({ "url": stub.url("/big.png") }))
        .await;
    assert_eq!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = response.json();
    assert_eq!(body["error"], "too_large");
    tokio::task::spawn_blocking(move || stub.finish()).await.unwrap();
}

#[tokio::test]
async fn validate_url_under_cap_still_succeeds() {
    let stub = HttpStub::start(200, "..Adobe Firefly..");
    let server = test_server_with(CountingReader::new(None, false), capped(1024));

    let response = server
        .post("/validate/url")
        .json(&json!({ "url": stub.url("/small.png") }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["platform"], "adobe");
    tokio::task::spawn_blocking(move || stub.finish()).await.unwrap();
}

#[tokio::test]
async fn malformed_json_body_uses_error_shape() {
    let server = test_server(CountingReader::unavailable());
    let response = server
        .post("/validate/base64")
        .bytes(Bytes::from_static(b"{\"fileData\": "))
        .content_type("application/json")
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "parse_failure");
    assert!(body["detail"].is_string());

    let response = server
        .post("/validate/url")
        .json(&json!({ "link": "https://example.com/a.png" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "parse_failure");
}

#[tokio::test]
async fn validate_file_rejects_documents() {
    let server = test_server(CountingReader::new(Some(firefly_manifest()), true));
    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(b"%PDF-1.7 Adobe Firefly".to_vec()).file_name("brochure.pdf"),
    );
    let response = server.post("/validate/file").multipart(form).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "unsupported_format");
}
