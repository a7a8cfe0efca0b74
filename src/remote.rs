//! Remote verification service client (tier 1).
//!
//! Uploads the file to a running provenance service and translates the
//! transport outcome into a [`RemoteStatus`]. Nothing here returns an error:
//! connection failures, non-2xx answers and decode failures all become
//! statuses the orchestrator can fall through on.

use crate::config::RemoteConfig;
use crate::inspect::ValidationResponse;
use crate::platforms::ExtractedMetadata;
use reqwest::blocking::{multipart, Client};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs::File;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// Outcome class of a remote check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteStatus {
    /// The service found and verified a manifest.
    ApiSuccess,
    /// The service answered but found no manifest or platform.
    NoManifestApi,
    /// The service could not be reached.
    ApiUnavailable,
    /// Non-2xx answer or any other transport/decode failure.
    ApiError,
}

impl RemoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteStatus::ApiSuccess => "api_success",
            RemoteStatus::NoManifestApi => "no_manifest_api",
            RemoteStatus::ApiUnavailable => "api_unavailable",
            RemoteStatus::ApiError => "api_error",
        }
    }
}

/// Tier-1 status plus whatever the service told us.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteOutcome {
    pub status: RemoteStatus,
    /// Decoded service answer, on `api_success`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub response: Option<ValidationResponse>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl RemoteOutcome {
    fn bare(status: RemoteStatus) -> Self {
        Self {
            status,
            response: None,
            message: None,
            status_code: None,
            error: None,
        }
    }

    pub fn success(response: ValidationResponse) -> Self {
        Self {
            response: Some(response),
            ..Self::bare(RemoteStatus::ApiSuccess)
        }
    }

    pub fn no_manifest(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::bare(RemoteStatus::NoManifestApi)
        }
    }

    pub fn unavailable(message: Option<String>) -> Self {
        Self {
            message,
            ..Self::bare(RemoteStatus::ApiUnavailable)
        }
    }

    pub fn http_error(status_code: u16) -> Self {
        Self {
            status_code: Some(status_code),
            ..Self::bare(RemoteStatus::ApiError)
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::bare(RemoteStatus::ApiError)
        }
    }

    /// The service's `aiDetected` flag; absent counts as human.
    pub fn ai_detected(&self) -> bool {
        self.response
            .as_ref()
            .and_then(|r| r.ai_detected)
            .unwrap_or(false)
    }
}

/// Service answer as sent on the wire. Only `isValid` and `aiDetected`
/// decide the tier, so `metadata` is kept loose: other deployments may put
/// non-string values in fields we model as strings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteBody {
    #[serde(default)]
    is_valid: bool,
    #[serde(default)]
    platform: Option<String>,
    #[serde(default)]
    company: Option<String>,
    #[serde(default)]
    metadata: Option<Value>,
    #[serde(default)]
    ai_detected: Option<bool>,
    #[serde(default)]
    signature_valid: Option<bool>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

impl From<RemoteBody> for ValidationResponse {
    fn from(body: RemoteBody) -> Self {
        Self {
            is_valid: body.is_valid,
            platform: body.platform,
            company: body.company,
            metadata: body.metadata.and_then(loose_metadata),
            ai_detected: body.ai_detected,
            signature_valid: body.signature_valid,
            message: body.message,
            url: body.url,
        }
    }
}

const LIST_FIELDS: &[&str] = &["detected_markers", "assertions"];

fn as_text(value: Value) -> Value {
    match value {
        Value::String(_) => value,
        other => Value::String(other.to_string()),
    }
}

/// Coerce a metadata object into [`ExtractedMetadata`]: scalars and objects
/// in text fields become their JSON text, nulls are dropped and a lone value
/// in a list field becomes a one-element list.
fn loose_metadata(value: Value) -> Option<ExtractedMetadata> {
    let Value::Object(fields) = value else {
        return None;
    };
    let coerced: Map<String, Value> = fields
        .into_iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(key, v)| {
            let v = if LIST_FIELDS.contains(&key.as_str()) {
                match v {
                    Value::Array(items) => Value::Array(
                        items.into_iter().filter(|i| !i.is_null()).map(as_text).collect(),
                    ),
                    single => Value::Array(vec![as_text(single)]),
                }
            } else {
                as_text(v)
            };
            (key, v)
        })
        .collect();
    match serde_json::from_value(Value::Object(coerced)) {
        Ok(metadata) => Some(metadata),
        Err(e) => {
            debug!("Remote metadata ignored: {}", e);
            None
        }
    }
}

/// Seam over the remote verification service.
pub trait RemoteVerifier: Send + Sync {
    fn check(&self, path: &Path) -> RemoteOutcome;
}

/// `RemoteVerifier` speaking the service's own `/validate/file` contract.
pub struct HttpVerifier {
    endpoint: String,
    client: Option<Client>,
    enabled: bool,
}

impl HttpVerifier {
    pub fn new(config: &RemoteConfig) -> Self {
        let client = match Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
        {
            Ok(c) => Some(c),
            Err(e) => {
                warn!("Remote verifier disabled, HTTP client init failed: {}", e);
                None
            }
        };

        Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            client,
            enabled: config.enabled,
        }
    }

    /// A verifier that never contacts anything.
    pub fn disabled() -> Self {
        Self {
            endpoint: String::new(),
            client: None,
            enabled: false,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn upload(&self, client: &Client, path: &Path) -> RemoteOutcome {
        let (file, length) = match File::open(path).and_then(|f| {
            let length = f.metadata()?.len();
            Ok((f, length))
        }) {
            Ok(opened) => opened,
            Err(e) => return RemoteOutcome::error(format!("read {}: {}", path.display(), e)),
        };
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        // Streamed from the handle; videos can be far larger than memory
        let part = match multipart::Part::reader_with_length(file, length)
            .file_name(file_name)
            .mime_str("application/octet-stream")
        {
            Ok(p) => p,
            Err(e) => return RemoteOutcome::error(e.to_string()),
        };
        let form = multipart::Form::new().part("file", part);

        let url = format!("{}/validate/file", self.endpoint);
        let response = match client.post(&url).multipart(form).send() {
            Ok(r) => r,
            Err(e) if e.is_connect() => {
                debug!("Remote verifier unreachable at {}: {}", url, e);
                return RemoteOutcome::unavailable(None);
            }
            Err(e) if e.is_timeout() => {
                warn!("Remote verifier timed out: {}", e);
                return RemoteOutcome::error(format!("timed out: {}", e));
            }
            Err(e) => {
                warn!("Remote verifier request failed: {}", e);
                return RemoteOutcome::error(e.to_string());
            }
        };

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            warn!("Remote verifier answered HTTP {}", status.as_u16());
            return RemoteOutcome::http_error(status.as_u16());
        }

        match response.json::<RemoteBody>().map(ValidationResponse::from) {
            Ok(body) if body.is_valid => RemoteOutcome::success(body),
            Ok(body) => RemoteOutcome::no_manifest(
                body.message.unwrap_or_else(|| "No manifest".to_string()),
            ),
            Err(e) => {
                warn!("Remote verifier sent an undecodable body: {}", e);
                RemoteOutcome::error(e.to_string())
            }
        }
    }
}

impl RemoteVerifier for HttpVerifier {
    fn check(&self, path: &Path) -> RemoteOutcome {
        if !self.enabled {
            return RemoteOutcome::unavailable(Some("remote verification disabled".to_string()));
        }
        let Some(client) = &self.client else {
            return RemoteOutcome::unavailable(Some("HTTP client unavailable".to_string()));
        };
        let outcome = self.upload(client, path);
        debug!(status = outcome.status.as_str(), "remote verification finished");
        outcome
    }
}
