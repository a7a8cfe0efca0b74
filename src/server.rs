//! HTTP verification service.
//!
//! Exposes the embedded-manifest pipeline over `/validate/file`,
//! `/validate/base64` and `/validate/url`. An unrecognised file is a normal
//! `200` answer with `isValid: false`; only request and transport problems
//! become HTTP errors with an `{error, detail}` body.

use crate::config::{DetectorConfig, ServerConfig};
use crate::error::{DetectorError, Result};
use crate::inspect::{Inspection, ManifestInspector, ValidationResponse};
use crate::io::IOLimits;
use crate::manifest::C2paTool;
use crate::media::{is_non_media, upload_extension};
use crate::platforms::PlatformRegistry;
use crate::timeout::{with_timeout, Deadline};
use axum::{
    body::Body,
    extract::{
        multipart::MultipartError, rejection::JsonRejection, DefaultBodyLimit, Multipart, State,
    },
    http::{Request, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use base64::Engine;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

pub struct AppState {
    inspector: ManifestInspector,
    http: reqwest::Client,
    config: ServerConfig,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(inspector: ManifestInspector, config: ServerConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .build()
            .map_err(|e| DetectorError::Internal(format!("HTTP client: {}", e)))?;
        Ok(Self {
            inspector,
            http,
            config,
        })
    }

    pub fn from_config(config: &DetectorConfig) -> Result<Self> {
        let inspector = ManifestInspector::new(
            Arc::new(C2paTool::new(&config.manifest)),
            Arc::new(PlatformRegistry::with_default_platforms()),
            IOLimits::from(&config.io),
        );
        Self::new(inspector, config.server.clone())
    }
}

impl IntoResponse for DetectorError {
    fn into_response(self) -> Response {
        let status = match self {
            DetectorError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ if self.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            warn!("Request failed: {}", self);
        }
        let body = json!({
            "error": self.kind(),
            "detail": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

pub fn router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace = TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
        tracing::info_span!(
            "request",
            request_id = %uuid::Uuid::new_v4(),
            method = %req.method(),
            uri = %req.uri(),
        )
    });

    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/platforms", get(platforms))
        .route("/validate/file", post(validate_file))
        .route("/validate/base64", post(validate_base64))
        .route("/validate/url", post(validate_url))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(trace)
        .with_state(state)
}

/// Bind and serve until the listener fails.
pub async fn serve(state: SharedState, bind: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn root(State(state): State<SharedState>) -> Json<Value> {
    Json(json!({
        "service": "provenant",
        "version": env!("CARGO_PKG_VERSION"),
        "architecture": "modular",
        "supported_platforms": state.inspector.registry().platform_names(),
        "endpoints": {
            "validate_file": "POST /validate/file",
            "validate_base64": "POST /validate/base64",
            "validate_url": "POST /validate/url",
            "platforms": "GET /platforms",
            "health": "GET /health",
        }
    }))
}

async fn health(State(state): State<SharedState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "c2pa_available": state.inspector.reader_available(),
        "platforms": state.inspector.registry().len(),
    }))
}

async fn platforms(State(state): State<SharedState>) -> Json<Value> {
    let names = state.inspector.registry().platform_names();
    Json(json!({
        "count": names.len(),
        "platforms": names,
    }))
}

/// Run the inspector on the blocking pool; the manifest tool is a
/// subprocess.
async fn inspect_upload(
    state: &SharedState,
    bytes: Vec<u8>,
    extension: Option<String>,
) -> Result<Option<Inspection>> {
    let inspector = state.inspector.clone();
    tokio::task::spawn_blocking(move || inspector.inspect_bytes(&bytes, extension.as_deref()))
        .await
        .map_err(|e| DetectorError::Internal(format!("inspection task: {}", e)))?
}

/// Body rejections keep the `{error, detail}` shape; an oversized body
/// stays a 413.
fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>, limit: usize) -> Result<T> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            Err(DetectorError::TooLarge { limit })
        }
        Err(rejection) => Err(DetectorError::ParseFailure(rejection.body_text())),
    }
}

fn multipart_error(err: MultipartError, limit: usize) -> DetectorError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        DetectorError::TooLarge { limit }
    } else {
        DetectorError::ParseFailure(err.body_text())
    }
}

/// Known non-media extensions are refused; an unknown one still gets the
/// raw marker scan.
fn ensure_media(extension: Option<&str>) -> Result<()> {
    match extension {
        Some(ext) if is_non_media(ext) => Err(DetectorError::UnsupportedFormat(format!(
            "'.{}' is not an image or video",
            ext
        ))),
        _ => Ok(()),
    }
}

async fn validate_file(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Result<Json<ValidationResponse>> {
    let limit = state.config.max_upload_bytes;
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| multipart_error(e, limit))?;
        upload = Some((file_name, content_type, bytes));
        break;
    }

    let (file_name, content_type, bytes) =
        upload.ok_or_else(|| DetectorError::MissingInput("multipart field 'file'".to_string()))?;
    if bytes.is_empty() {
        return Err(DetectorError::MissingInput("empty upload".to_string()));
    }

    let extension = upload_extension(file_name.as_deref(), content_type.as_deref(), &bytes);
    debug!(file_name = ?file_name, extension = ?extension, size = bytes.len(), "file upload");
    ensure_media(extension.as_deref())?;

    let inspection = inspect_upload(&state, bytes.to_vec(), extension).await?;
    let response = match inspection {
        Some(found) => ValidationResponse::from_inspection(Some(found)),
        None => ValidationResponse::unrecognized().with_signature(false),
    };
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Base64Request {
    pub file_data: String,
    #[serde(default)]
    pub format: Option<String>,
}

/// Accepts bare base64 or a `data:<mime>;base64,` URL.
fn decode_base64_payload(data: &str) -> Result<(Vec<u8>, Option<String>)> {
    let (mime, payload) = match data.strip_prefix("data:").and_then(|d| d.split_once(',')) {
        Some((header, payload)) => (
            header.strip_suffix(";base64").map(str::to_string),
            payload,
        ),
        None => (None, data),
    };
    let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(cleaned.as_bytes())
        .map_err(|e| DetectorError::ParseFailure(format!("fileData is not valid base64: {}", e)))?;
    Ok((bytes, mime))
}

async fn validate_base64(
    State(state): State<SharedState>,
    payload: std::result::Result<Json<Base64Request>, JsonRejection>,
) -> Result<Json<ValidationResponse>> {
    let request = json_body(payload, state.config.max_upload_bytes)?;
    let (bytes, embedded_mime) = decode_base64_payload(&request.file_data)?;
    if bytes.is_empty() {
        return Err(DetectorError::MissingInput("empty fileData".to_string()));
    }

    let mime = request.format.or(embedded_mime);
    let extension = upload_extension(None, mime.as_deref(), &bytes);
    debug!(extension = ?extension, size = bytes.len(), "base64 upload");
    ensure_media(extension.as_deref())?;

    let inspection = inspect_upload(&state, bytes, extension).await?;
    Ok(Json(ValidationResponse::from_inspection(inspection)))
}

#[derive(Debug, Deserialize)]
pub struct UrlRequest {
    pub url: String,
}

async fn fetch_remote(state: &SharedState, url: &str) -> Result<(Vec<u8>, Option<String>)> {
    let parsed = reqwest::Url::parse(url)
        .map_err(|e| DetectorError::ParseFailure(format!("invalid url {}: {}", url, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(DetectorError::ParseFailure(format!(
            "unsupported url scheme: {}",
            parsed.scheme()
        )));
    }

    let deadline = Deadline::new(state.config.fetch_timeout_secs, "url fetch");
    let limit = state.config.max_upload_bytes;
    let http = state.http.clone();
    with_timeout(deadline, async move {
        let mut response = http
            .get(parsed)
            .send()
            .await
            .map_err(|e| DetectorError::TransportFailure(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(DetectorError::TransportFailure(format!(
                "HTTP {} fetching remote file",
                status.as_u16()
            )));
        }
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string());
        if response.content_length().is_some_and(|len| len > limit as u64) {
            return Err(DetectorError::TooLarge { limit });
        }
        // Content-Length may be absent or wrong; the cap holds per chunk
        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| DetectorError::TransportFailure(e.to_string()))?
        {
            if bytes.len() + chunk.len() > limit {
                return Err(DetectorError::TooLarge { limit });
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok::<_, DetectorError>((bytes, content_type))
    })
    .await
}

fn url_file_name(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    parsed
        .path_segments()?
        .next_back()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

async fn validate_url(
    State(state): State<SharedState>,
    payload: std::result::Result<Json<UrlRequest>, JsonRejection>,
) -> Result<Json<ValidationResponse>> {
    let request = json_body(payload, state.config.max_upload_bytes)?;
    let (bytes, content_type) = fetch_remote(&state, &request.url).await?;
    let extension = upload_extension(
        url_file_name(&request.url).as_deref(),
        content_type.as_deref(),
        &bytes,
    );
    debug!(url = %request.url, extension = ?extension, size = bytes.len(), "url fetch");
    ensure_media(extension.as_deref())?;

    let inspection = inspect_upload(&state, bytes, extension).await?;
    Ok(Json(
        ValidationResponse::from_inspection(inspection)
            .without_signature()
            .with_url(request.url),
    ))
}
