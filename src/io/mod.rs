//! Bounded I/O utilities for media files.
//!
//! Raw bytes are read with an upper bound so a multi-gigabyte video cannot
//! exhaust memory during marker search, and uploaded bytes are handed to the
//! manifest tool through per-call temporary files that are removed on drop.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Resource limits for raw-byte reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IOLimits {
    pub max_read_bytes: u64,
}

impl Default for IOLimits {
    fn default() -> Self {
        Self {
            max_read_bytes: 256 * 1024 * 1024, // 256MB
        }
    }
}

impl From<&crate::config::IOConfig> for IOLimits {
    fn from(cfg: &crate::config::IOConfig) -> Self {
        Self {
            max_read_bytes: cfg.max_read_bytes,
        }
    }
}

/// A bounded reader that limits the amount of data read.
pub struct BoundedReader<R> {
    inner: R,
    bytes_read: u64,
    limit: u64,
}

impl<R: Read> BoundedReader<R> {
    pub fn new(reader: R, limit: u64) -> Self {
        Self {
            inner: reader,
            bytes_read: 0,
            limit,
        }
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }
}

impl<R: Read> Read for BoundedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.bytes_read >= self.limit {
            return Ok(0); // EOF
        }

        let remaining = self.limit - self.bytes_read;
        let max_to_read = std::cmp::min(buf.len() as u64, remaining) as usize;
        let n = self.inner.read(&mut buf[..max_to_read])?;
        self.bytes_read += n as u64;
        Ok(n)
    }
}

/// Raw file content plus whether the read stopped at the limit.
#[derive(Debug, Clone)]
pub struct RawContent {
    pub bytes: Vec<u8>,
    pub file_size: u64,
    pub truncated: bool,
}

/// Read up to `limits.max_read_bytes` of a file.
pub fn read_raw<P: AsRef<Path>>(path: P, limits: &IOLimits) -> io::Result<RawContent> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let file_size = file.metadata()?.len();

    let mut reader = BoundedReader::new(file, limits.max_read_bytes);
    let mut bytes = Vec::with_capacity(std::cmp::min(file_size, limits.max_read_bytes) as usize);
    reader.read_to_end(&mut bytes)?;

    let truncated = file_size > bytes.len() as u64;
    if truncated {
        warn!(
            "Marker scan of {:?} limited to {} of {} bytes",
            path,
            bytes.len(),
            file_size
        );
    }

    Ok(RawContent {
        bytes,
        file_size,
        truncated,
    })
}

/// Streaming SHA-256 of a whole file. Returns `(hex digest, size)`.
pub fn sha256_file<P: AsRef<Path>>(path: P) -> io::Result<(String, u64)> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    let mut total = 0u64;
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        total += n as u64;
    }
    Ok((hex::encode(hasher.finalize()), total))
}

/// Write bytes to a uniquely named temporary file.
///
/// The extension is preserved because the manifest tool picks its container
/// parser from it. The file is deleted when the returned handle drops, on
/// every exit path of the caller.
pub fn spill_to_temp(bytes: &[u8], extension: Option<&str>) -> io::Result<NamedTempFile> {
    let suffix = extension
        .map(|e| e.trim_start_matches('.'))
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default();

    let mut file = tempfile::Builder::new()
        .prefix("provenant_upload_")
        .suffix(&suffix)
        .tempfile()?;
    file.write_all(bytes)?;
    file.flush()?;
    debug!("Spilled {} bytes to {:?}", bytes.len(), file.path());
    Ok(file)
}
