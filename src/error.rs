//! Error types for the provenance detector.
//!
//! Collaborator failures (manifest tool, verification service, classifier)
//! never surface here: adapters fold them into typed statuses. This enum
//! covers the caller's own inputs, configuration and the HTTP boundary.

use thiserror::Error;

/// Main error type for detector operations.
#[derive(Debug, Error)]
pub enum DetectorError {
    /// File absent, empty upload, missing form field
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// Manifest library or classifier not present in the runtime
    #[error("Collaborator unavailable: {0}")]
    CollaboratorUnavailable(String),

    /// Manifest, config or request body could not be decoded
    #[error("Parse failure: {0}")]
    ParseFailure(String),

    /// Connection refused, non-2xx response, broken transfer
    #[error("Transport failure: {0}")]
    TransportFailure(String),

    /// Extension outside the supported image/video sets
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Request body or fetched resource exceeds the configured cap
    #[error("Payload exceeds {limit} bytes")]
    TooLarge { limit: usize },

    /// Bounded operation ran out of time
    #[error("Operation timeout after {seconds}s")]
    Timeout { seconds: u64 },

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DetectorError {
    /// Whether the failure was caused by the request rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DetectorError::MissingInput(_)
                | DetectorError::ParseFailure(_)
                | DetectorError::UnsupportedFormat(_)
                | DetectorError::TooLarge { .. }
        )
    }

    /// Short machine-friendly name of the error class.
    pub fn kind(&self) -> &'static str {
        match self {
            DetectorError::MissingInput(_) => "missing_input",
            DetectorError::CollaboratorUnavailable(_) => "collaborator_unavailable",
            DetectorError::ParseFailure(_) => "parse_failure",
            DetectorError::TransportFailure(_) => "transport_failure",
            DetectorError::UnsupportedFormat(_) => "unsupported_format",
            DetectorError::TooLarge { .. } => "too_large",
            DetectorError::Timeout { .. } => "timeout",
            DetectorError::Io(_) => "io",
            DetectorError::Serialization(_) => "serialization",
            DetectorError::Internal(_) => "internal",
        }
    }
}

impl From<crate::manifest::ReadFailure> for DetectorError {
    fn from(err: crate::manifest::ReadFailure) -> Self {
        use crate::manifest::ReadFailure;
        match err {
            ReadFailure::Unavailable => DetectorError::CollaboratorUnavailable(err.to_string()),
            ReadFailure::NoManifest => DetectorError::MissingInput(err.to_string()),
            ReadFailure::Malformed(_) => DetectorError::ParseFailure(err.to_string()),
            ReadFailure::Timeout { timeout_secs } => DetectorError::Timeout {
                seconds: timeout_secs,
            },
            ReadFailure::Tool(_) => DetectorError::Internal(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for DetectorError {
    fn from(err: serde_json::Error) -> Self {
        DetectorError::Serialization(err.to_string())
    }
}

/// Result type alias for detector operations
pub type Result<T> = std::result::Result<T, DetectorError>;
