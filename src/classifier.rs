//! Image heuristic classifier (tier 3).
//!
//! Wraps an image-classification inference endpoint answering with
//! `[{"label": ..., "score": ...}]`. The winning label/score pair is
//! normalised into the probability that the image is AI-generated.

use crate::config::ClassifierConfig;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// `ai_likely` at or above this AI probability.
pub const AI_THRESHOLD: f64 = 0.55;

/// `human_likely` at or below this AI probability.
pub const HUMAN_THRESHOLD: f64 = 0.45;

/// Label fragments that mean "generated".
const AI_LABELS: &[&str] = &["artificial", "ai", "fake"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierStatus {
    Unavailable,
    AiLikely,
    HumanLikely,
    Uncertain,
    Error,
}

impl ClassifierStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassifierStatus::Unavailable => "unavailable",
            ClassifierStatus::AiLikely => "ai_likely",
            ClassifierStatus::HumanLikely => "human_likely",
            ClassifierStatus::Uncertain => "uncertain",
            ClassifierStatus::Error => "error",
        }
    }
}

/// One entry of the inference response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub score: f64,
}

/// AI probability for a label/score pair; a label meaning "human/real"
/// has its score inverted.
pub fn normalize(label: &str, score: f64) -> f64 {
    let label = label.to_lowercase();
    let score = score.clamp(0.0, 1.0);
    if AI_LABELS.iter().any(|l| label.contains(l)) {
        score
    } else {
        1.0 - score
    }
}

/// Threshold an AI probability.
pub fn classify_score(ai_score: f64) -> ClassifierStatus {
    if ai_score >= AI_THRESHOLD {
        ClassifierStatus::AiLikely
    } else if ai_score <= HUMAN_THRESHOLD {
        ClassifierStatus::HumanLikely
    } else {
        ClassifierStatus::Uncertain
    }
}

/// Highest-scoring prediction of a response. Some endpoints wrap the list
/// in a second array.
pub fn top_prediction(body: &Value) -> Option<Prediction> {
    let list = match body.as_array()?.first() {
        Some(Value::Array(inner)) => inner.clone(),
        _ => body.as_array()?.clone(),
    };
    list.into_iter()
        .filter_map(|v| serde_json::from_value::<Prediction>(v).ok())
        .filter(|p| p.score.is_finite())
        .max_by(|a, b| a.score.total_cmp(&b.score))
}

/// Seam over the image classifier.
pub trait ImageClassifier: Send + Sync {
    fn is_available(&self) -> bool;

    /// Status and AI probability in `[0, 1]`; `0.0` when no score exists.
    fn detect(&self, path: &Path) -> (ClassifierStatus, f64);
}

/// `ImageClassifier` backed by an HTTP inference endpoint.
pub struct HttpClassifier {
    endpoint: Option<String>,
    token: Option<String>,
    client: Option<Client>,
}

impl HttpClassifier {
    /// Reads the bearer token from the environment variable named in the
    /// config.
    pub fn new(config: &ClassifierConfig) -> Self {
        let token = std::env::var(&config.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty());
        Self::with_token(config, token)
    }

    pub fn with_token(config: &ClassifierConfig, token: Option<String>) -> Self {
        let endpoint = config
            .endpoint
            .clone()
            .filter(|e| !e.trim().is_empty());

        let client = match &endpoint {
            Some(_) => match Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
            {
                Ok(c) => Some(c),
                Err(e) => {
                    warn!("Classifier disabled, HTTP client init failed: {}", e);
                    None
                }
            },
            None => {
                debug!("No classifier endpoint configured");
                None
            }
        };

        Self {
            endpoint,
            token,
            client,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            endpoint: None,
            token: None,
            client: None,
        }
    }

    fn infer(&self, client: &Client, endpoint: &str, path: &Path) -> Result<Prediction, String> {
        let bytes = std::fs::read(path).map_err(|e| format!("read {}: {}", path.display(), e))?;

        let mut request = client
            .post(endpoint)
            .header("content-type", "application/octet-stream")
            .body(bytes);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().map_err(|e| format!("request failed: {}", e))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            return Err(format!("HTTP {}: {}", status.as_u16(), snippet));
        }

        let body: Value = response
            .json()
            .map_err(|e| format!("undecodable response: {}", e))?;
        top_prediction(&body).ok_or_else(|| "response carried no predictions".to_string())
    }
}

impl ImageClassifier for HttpClassifier {
    fn is_available(&self) -> bool {
        self.endpoint.is_some() && self.client.is_some()
    }

    fn detect(&self, path: &Path) -> (ClassifierStatus, f64) {
        let (Some(client), Some(endpoint)) = (&self.client, &self.endpoint) else {
            return (ClassifierStatus::Unavailable, 0.0);
        };

        match self.infer(client, endpoint, path) {
            Ok(prediction) => {
                let ai_score = normalize(&prediction.label, prediction.score);
                let status = classify_score(ai_score);
                debug!(
                    label = %prediction.label,
                    score = prediction.score,
                    ai_score,
                    status = status.as_str(),
                    "classifier prediction"
                );
                (status, ai_score)
            }
            Err(e) => {
                warn!("Classifier failed on {:?}: {}", path, e);
                (ClassifierStatus::Error, 0.0)
            }
        }
    }
}
