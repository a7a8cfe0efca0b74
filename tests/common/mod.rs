//! Shared test utilities: temp media files, counting mock collaborators and a
//! canned-response HTTP stub.

#![allow(dead_code)]

use provenant::classifier::{ClassifierStatus, ImageClassifier};
use provenant::manifest::{Manifest, ManifestReader, ValidationReport};
use provenant::remote::{RemoteOutcome, RemoteVerifier};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use tempfile::NamedTempFile;
use tokio::sync::oneshot;

/// Creates a temporary file with the given content and extension.
///
/// The file is removed when the returned handle is dropped.
pub fn temp_media(content: &[u8], extension: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("provenant-test-")
        .suffix(&format!(".{}", extension))
        .tempfile()
        .unwrap();
    file.write_all(content).unwrap();
    file.flush().unwrap();
    file
}

/// Remote verifier answering a fixed outcome and counting calls.
pub struct CountingRemote {
    outcome: RemoteOutcome,
    pub calls: AtomicUsize,
}

impl CountingRemote {
    pub fn new(outcome: RemoteOutcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RemoteVerifier for CountingRemote {
    fn check(&self, _: &Path) -> RemoteOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

/// Manifest reader with a canned manifest and signature result.
pub struct CountingReader {
    available: bool,
    manifest: Option<Manifest>,
    signature_valid: bool,
    pub reads: AtomicUsize,
    pub validations: AtomicUsize,
}

impl CountingReader {
    pub fn new(manifest: Option<Manifest>, signature_valid: bool) -> Arc<Self> {
        Arc::new(Self {
            available: true,
            manifest,
            signature_valid,
            reads: AtomicUsize::new(0),
            validations: AtomicUsize::new(0),
        })
    }

    pub fn unavailable() -> Arc<Self> {
        Arc::new(Self {
            available: false,
            manifest: None,
            signature_valid: false,
            reads: AtomicUsize::new(0),
            validations: AtomicUsize::new(0),
        })
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn validations(&self) -> usize {
        self.validations.load(Ordering::SeqCst)
    }
}

impl ManifestReader for CountingReader {
    fn is_available(&self) -> bool {
        self.available
    }

    fn read_manifest(&self, _: &Path) -> Option<Manifest> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if !self.available {
            return None;
        }
        self.manifest.clone()
    }

    fn validate_signature(&self, _: &Path) -> (bool, Option<ValidationReport>) {
        self.validations.fetch_add(1, Ordering::SeqCst);
        (
            self.signature_valid,
            Some(ValidationReport {
                valid: self.signature_valid,
                ..Default::default()
            }),
        )
    }
}

/// Classifier answering a fixed status/score.
pub struct CountingClassifier {
    available: bool,
    answer: (ClassifierStatus, f64),
    pub calls: AtomicUsize,
}

impl CountingClassifier {
    pub fn new(status: ClassifierStatus, score: f64) -> Arc<Self> {
        Arc::new(Self {
            available: true,
            answer: (status, score),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn unavailable() -> Arc<Self> {
        Arc::new(Self {
            available: false,
            answer: (ClassifierStatus::Unavailable, 0.0),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ImageClassifier for CountingClassifier {
    fn is_available(&self) -> bool {
        self.available
    }

    fn detect(&self, _: &Path) -> (ClassifierStatus, f64) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer
    }
}

/// A request captured by [`HttpStub`].
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Clone)]
struct StubState {
    status: StatusCode,
    body: Bytes,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

async fn answer(
    State(stub): State<StubState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    stub.requests.lock().unwrap().push(CapturedRequest {
        method,
        path: uri.path().to_string(),
        headers,
        body: body.to_vec(),
    });
    (
        stub.status,
        [(header::CONTENT_TYPE, "application/json")],
        stub.body,
    )
        .into_response()
}

/// axum server on its own thread and runtime, answering every request with
/// one canned response. Usable from sync and async tests alike.
pub struct HttpStub {
    pub base_url: String,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl HttpStub {
    pub fn start(status: u16, body: impl Into<Vec<u8>>) -> Self {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            status: StatusCode::from_u16(status).unwrap(),
            body: Bytes::from(body.into()),
            requests: requests.clone(),
        };
        let app = Router::new().fallback(answer).with_state(state);
        let (shutdown, stopped) = oneshot::channel::<()>();

        let handle = std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).unwrap();
                axum::serve(listener, app)
                    .with_graceful_shutdown(async {
                        let _ = stopped.await;
                    })
                    .await
                    .unwrap();
            });
        });

        Self {
            base_url,
            requests,
            shutdown: Some(shutdown),
            handle: Some(handle),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Stop the server and return what it saw.
    pub fn finish(mut self) -> Vec<CapturedRequest> {
        self.stop();
        let requests = self.requests.lock().unwrap().clone();
        requests
    }

    fn stop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for HttpStub {
    fn drop(&mut self) {
        // Signal only; joining here could block an async test's runtime
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}
