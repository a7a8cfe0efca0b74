//! Configuration for the detector and its collaborators.
//!
//! Provides centralized configuration with sensible defaults. Every section
//! is `#[serde(default)]`, so a config file only needs the keys it changes.

use crate::error::{DetectorError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable overriding `remote.endpoint`.
pub const ENV_API_ENDPOINT: &str = "PROVENANT_API_ENDPOINT";
/// Environment variable overriding `classifier.endpoint`.
pub const ENV_CLASSIFIER_ENDPOINT: &str = "PROVENANT_CLASSIFIER_ENDPOINT";
/// Environment variable overriding `manifest.tool_path`.
pub const ENV_C2PATOOL_PATH: &str = "C2PATOOL_PATH";
/// Environment variable overriding `server.bind`.
pub const ENV_BIND: &str = "PROVENANT_BIND";

/// Master configuration for the detection pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Remote verification service (tier 1).
    pub remote: RemoteConfig,
    /// Embedded manifest reader (tier 2).
    pub manifest: ManifestConfig,
    /// Heuristic image classifier (tier 3).
    pub classifier: ClassifierConfig,
    /// Bounded file reading.
    pub io: IOConfig,
    /// HTTP surface.
    pub server: ServerConfig,
}

impl DetectorConfig {
    /// Load configuration from an optional JSON file, then apply environment
    /// overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_json_file(p)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a JSON configuration file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| {
            DetectorError::ParseFailure(format!("config {}: {}", path.display(), e))
        })
    }

    /// Apply overrides from a key lookup (normally the process environment).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = non_empty(ENV_API_ENDPOINT) {
            debug!("remote endpoint overridden from {}", ENV_API_ENDPOINT);
            self.remote.endpoint = v;
        }
        if let Some(v) = non_empty(ENV_CLASSIFIER_ENDPOINT) {
            debug!("classifier endpoint overridden from {}", ENV_CLASSIFIER_ENDPOINT);
            self.classifier.endpoint = Some(v);
        }
        if let Some(v) = non_empty(ENV_C2PATOOL_PATH) {
            self.manifest.tool_path = Some(PathBuf::from(v));
        }
        if let Some(v) = non_empty(ENV_BIND) {
            self.server.bind = v;
        }
    }
}

/// Remote verification service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// When false the service is never contacted (offline mode).
    pub enabled: bool,
    /// Base URL of the verification service (default: http://localhost:8000).
    pub endpoint: String,
    /// Request timeout in seconds (default: 10).
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "http://localhost:8000".to_string(),
            timeout_secs: crate::timeout::REMOTE_CHECK_TIMEOUT_SECONDS,
        }
    }
}

/// Manifest reader configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// Explicit path to the `c2patool` executable; PATH lookup otherwise.
    pub tool_path: Option<PathBuf>,
    /// Maximum runtime of a single tool invocation (default: 30).
    pub timeout_secs: u64,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            tool_path: None,
            timeout_secs: 30,
        }
    }
}

/// Heuristic classifier configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Inference endpoint; the classifier is unavailable when unset.
    pub endpoint: Option<String>,
    /// Name of the environment variable holding a bearer token.
    pub token_env: String,
    /// Request timeout in seconds (default: 30).
    pub timeout_secs: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            token_env: "HF_API_TOKEN".to_string(),
            timeout_secs: 30,
        }
    }
}

/// I/O configuration for file reading.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IOConfig {
    /// Maximum bytes scanned for markers (default: 268435456 = 256MB).
    pub max_read_bytes: u64,
}

impl Default for IOConfig {
    fn default() -> Self {
        Self {
            max_read_bytes: 256 * 1024 * 1024,
        }
    }
}

/// HTTP surface configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address (default: 0.0.0.0:8000).
    pub bind: String,
    /// Timeout for `POST /validate/url` fetches (default: 30).
    pub fetch_timeout_secs: u64,
    /// Largest accepted request body (default: 52428800 = 50MB).
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
            fetch_timeout_secs: crate::timeout::URL_FETCH_TIMEOUT_SECONDS,
            max_upload_bytes: 50 * 1024 * 1024,
        }
    }
}
