//! Media kind classification.
//!
//! Uses the file extension to decide which fallback tier applies, and
//! `infer` / `mime_guess` to recover an extension for uploads that arrive
//! without a usable filename.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Video extensions; these never get a heuristic fallback.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "webm", "mkv", "flv", "wmv"];

/// Image extensions the heuristic classifier accepts.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Coarse media class used by the orchestrator's last tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
    Other,
}

impl MediaKind {
    /// Classify by lower-cased extension.
    pub fn from_path(path: &Path) -> Self {
        match lower_extension(path) {
            Some(ext) => Self::from_extension(&ext),
            None => MediaKind::Other,
        }
    }

    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            MediaKind::Video
        } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            MediaKind::Image
        } else {
            MediaKind::Other
        }
    }
}

/// Lower-cased extension of a path, without the dot.
pub fn lower_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Whether an extension names a known type that cannot be an image or a
/// video (documents, archives, text). Unknown and generic binary
/// extensions are not excluded.
pub fn is_non_media(ext: &str) -> bool {
    let ext = ext.trim_start_matches('.');
    if MediaKind::from_extension(ext) != MediaKind::Other {
        return false;
    }
    match mime_guess::from_ext(ext).first() {
        Some(mime) => {
            mime.type_() != mime_guess::mime::IMAGE
                && mime.type_() != mime_guess::mime::VIDEO
                && mime != mime_guess::mime::APPLICATION_OCTET_STREAM
        }
        None => false,
    }
}

/// Best extension for an uploaded payload.
///
/// Order: the client filename, then sniffed content, then the declared MIME
/// type.
pub fn upload_extension(filename: Option<&str>, mime: Option<&str>, bytes: &[u8]) -> Option<String> {
    if let Some(ext) = filename.and_then(|f| lower_extension(Path::new(f))) {
        return Some(ext);
    }

    if let Some(kind) = infer::get(bytes) {
        return Some(kind.extension().to_string());
    }

    let exts = mime.and_then(mime_guess::get_mime_extensions_str)?;
    exts.iter()
        .find(|e| MediaKind::from_extension(e) != MediaKind::Other)
        .or_else(|| exts.first())
        .map(|e| e.to_string())
}
