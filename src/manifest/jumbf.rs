//! Raw C2PA/JUMBF marker scan.
//!
//! Needs neither the manifest tool nor a valid signature: locates the box
//! markers in the file bytes and pulls the printable text around each one.

use memchr::memmem;
use serde::Serialize;

/// Box markers in search order. Only the first occurrence of each is kept.
pub const BOX_MARKERS: &[&str] = &["jumb", "c2pa", "urn:c2pa"];

/// Vendor and claim keywords looked for in the text around a marker.
pub const CONTEXT_KEYWORDS: &[&str] = &[
    "Google",
    "OpenAI",
    "Adobe",
    "Microsoft",
    "ChatGPT",
    "Firefly",
    "Designer",
    "Gemini",
    "claim_generator",
    "software",
    "issuer",
    "creator",
    "Media Processing",
];

const CONTEXT_BEFORE: usize = 100;
const CONTEXT_WINDOW: usize = 2000;
const MIN_TEXT_RUN: usize = 4;

/// One marker found in the raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerHit {
    pub marker: &'static str,
    pub offset: usize,
    pub keywords: Vec<&'static str>,
    /// Printable ASCII runs from the window around the marker.
    pub context: String,
}

pub fn scan(raw: &[u8]) -> Vec<MarkerHit> {
    BOX_MARKERS
        .iter()
        .filter_map(|&marker| {
            let offset = memmem::find(raw, marker.as_bytes())?;
            let start = offset.saturating_sub(CONTEXT_BEFORE);
            let end = start.saturating_add(CONTEXT_WINDOW).min(raw.len());
            let context = printable_text(&raw[start..end]);
            let keywords = CONTEXT_KEYWORDS
                .iter()
                .copied()
                .filter(|k| context.contains(k))
                .collect();
            Some(MarkerHit {
                marker,
                offset,
                keywords,
                context,
            })
        })
        .collect()
}

/// Runs of at least four printable ASCII bytes, space-joined.
fn printable_text(region: &[u8]) -> String {
    region
        .split(|b| !(0x20..=0x7e).contains(b))
        .filter(|run| run.len() >= MIN_TEXT_RUN)
        .map(String::from_utf8_lossy)
        .collect::<Vec<_>>()
        .join(" ")
}
