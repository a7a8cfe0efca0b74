//! Provenance detection for images and video.
//!
//! A file is checked by up to three tiers, in order: a remote verification
//! service, the embedded C2PA manifest (with vendor platform recognition),
//! and an image heuristic classifier. The first conclusive tier decides.

/// Error taxonomy
pub mod error;

/// Tracing subscriber setup
pub mod logging;

/// Async timeout wrapper
pub mod timeout;

/// Configuration
pub mod config;

/// Bounded reads, hashing and temp files
pub mod io;

pub mod media;

/// C2PA manifest model and reader
pub mod manifest;

/// Vendor platforms and their registry
pub mod platforms;

pub mod remote;

pub mod classifier;

pub mod inspect;

/// Orchestrator and result model
pub mod detector;

/// HTTP surface
pub mod server;

pub mod report;

pub use config::DetectorConfig;
pub use detector::{AnalysisResult, Confidence, Detector, Verdict};
pub use error::{DetectorError, Result};
pub use platforms::{PlatformExtractor, PlatformRegistry};
