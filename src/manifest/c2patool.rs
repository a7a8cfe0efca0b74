//! Manifest reader backed by the C2PA reference command-line tool.
//!
//! `c2patool <file>` prints the manifest store as JSON. The executable is
//! resolved once at construction; an adapter without one reports itself
//! unavailable instead of failing per call.

use super::{Manifest, ManifestRead, ManifestReader, ManifestStore, ValidationReport};
use crate::config::ManifestConfig;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

const TOOL_NAME: &str = "c2patool";

/// Why a manifest store could not be produced.
#[derive(Debug, Error)]
pub enum ReadFailure {
    /// The file carries no C2PA data; the common, expected case.
    #[error("no C2PA manifest found")]
    NoManifest,

    /// The tool printed something that is not a manifest store.
    #[error("malformed manifest store: {0}")]
    Malformed(String),

    /// The tool is not installed.
    #[error("c2patool not available")]
    Unavailable,

    /// Spawn failure or unexpected exit.
    #[error("c2patool failed: {0}")]
    Tool(String),

    /// The tool exceeded its time bound and was killed.
    #[error("c2patool timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },
}

impl ReadFailure {
    /// Expected failures are logged quietly; the rest are warnings.
    pub fn is_expected(&self) -> bool {
        matches!(self, ReadFailure::NoManifest | ReadFailure::Unavailable)
    }
}

/// `ManifestReader` driving an external `c2patool` process.
#[derive(Debug, Clone)]
pub struct C2paTool {
    executable: Option<PathBuf>,
    timeout: Duration,
}

impl C2paTool {
    /// Resolve the tool: explicit config path, then PATH lookup.
    pub fn new(config: &ManifestConfig) -> Self {
        let executable = config
            .tool_path
            .clone()
            .filter(|p| p.exists())
            .or_else(|| which::which(TOOL_NAME).ok());

        match &executable {
            Some(p) => debug!("Using {} at {:?}", TOOL_NAME, p),
            None => debug!("{} not found; manifest tier disabled", TOOL_NAME),
        }

        Self {
            executable,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Adapter with no backing tool.
    pub fn unavailable() -> Self {
        Self {
            executable: None,
            timeout: Duration::from_secs(0),
        }
    }

    pub fn executable(&self) -> Option<&Path> {
        self.executable.as_deref()
    }

    /// Run the tool and decode its manifest store.
    pub fn read_store(&self, path: &Path) -> Result<ManifestStore, ReadFailure> {
        let exe = self.executable.as_ref().ok_or(ReadFailure::Unavailable)?;

        let child = Command::new(exe)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ReadFailure::Tool(format!("spawn: {}", e)))?;

        let (status, stdout, stderr) = wait_with_timeout(child, self.timeout)?;

        if !status.success() {
            return Err(classify_exit(status, &stderr));
        }

        serde_json::from_str(&stdout).map_err(|e| ReadFailure::Malformed(e.to_string()))
    }

    fn read_logged(&self, path: &Path) -> Option<ManifestStore> {
        match self.read_store(path) {
            Ok(store) => Some(store),
            Err(e) if e.is_expected() => {
                debug!(file = ?path, "manifest read: {}", e);
                None
            }
            Err(e) => {
                warn!(file = ?path, "manifest read: {}", e);
                None
            }
        }
    }
}

impl ManifestReader for C2paTool {
    fn is_available(&self) -> bool {
        self.executable.is_some()
    }

    fn read_manifest(&self, path: &Path) -> Option<Manifest> {
        self.read_logged(path)?.active().cloned()
    }

    fn validate_signature(&self, path: &Path) -> (bool, Option<ValidationReport>) {
        match self.read_logged(path) {
            Some(store) => {
                let report = store.validation_report();
                (report.valid, Some(report))
            }
            None => (false, None),
        }
    }

    /// One tool run; manifest and report come from the same store.
    fn read(&self, path: &Path) -> ManifestRead {
        let Some(store) = self.read_logged(path) else {
            return ManifestRead::default();
        };
        let Some(manifest) = store.active().cloned() else {
            return ManifestRead::default();
        };
        let report = store.validation_report();
        ManifestRead {
            manifest: Some(manifest),
            signature_valid: report.valid,
            validation: Some(report),
        }
    }
}

/// Exit codes alone do not separate "no manifest" from real failures; the
/// tool's stderr wording does. A miss here only raises the log level, both
/// cases read as "no manifest".
fn classify_exit(status: ExitStatus, stderr: &str) -> ReadFailure {
    let lower = stderr.to_ascii_lowercase();
    let not_found = ["no claim found", "manifestnotfound", "jumbfnotfound", "no manifest"];
    if not_found.iter().any(|needle| lower.contains(needle)) {
        ReadFailure::NoManifest
    } else {
        ReadFailure::Tool(format!(
            "exit {}: {}",
            status.code().unwrap_or(-1),
            stderr.trim()
        ))
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<String> {
    std::thread::spawn(move || {
        let mut buf = String::new();
        if let Some(mut p) = pipe {
            let _ = p.read_to_string(&mut buf);
        }
        buf
    })
}

fn wait_with_timeout(
    mut child: Child,
    timeout: Duration,
) -> Result<(ExitStatus, String, String), ReadFailure> {
    // Pipes are drained on their own threads so a large store cannot fill
    // the pipe buffer and stall the child.
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());
    let start = Instant::now();

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ReadFailure::Timeout {
                        timeout_secs: timeout.as_secs(),
                    });
                }
                std::thread::sleep(Duration::from_millis(20));
            }
            Err(e) => return Err(ReadFailure::Tool(e.to_string())),
        }
    };

    let out = stdout.join().unwrap_or_default();
    let err = stderr.join().unwrap_or_default();
    Ok((status, out, err))
}
