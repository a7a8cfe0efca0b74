//! Human-readable rendering of analysis results.
//!
//! The CLI prints these to stdout; `--json` bypasses them entirely.

use crate::detector::{AnalysisResult, CollaboratorStatus, Verdict};
use crate::inspect::ManifestDump;
use crate::media::MediaKind;
use crate::platforms::ExtractedMetadata;
use colored::Colorize;
use std::fmt::Write;
use std::path::Path;

const RULE_WIDTH: usize = 60;
const MAX_MARKERS: usize = 5;
const CONTEXT_PREVIEW_CHARS: usize = 500;

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn markers_line(metadata: &ExtractedMetadata) -> Option<String> {
    if metadata.detected_markers.is_empty() {
        return None;
    }
    let shown: Vec<&str> = metadata
        .detected_markers
        .iter()
        .take(MAX_MARKERS)
        .map(String::as_str)
        .collect();
    Some(shown.join(", "))
}

fn verdict_label(verdict: Verdict) -> colored::ColoredString {
    if verdict.is_ai() {
        verdict.as_str().red().bold()
    } else if verdict.is_human() {
        verdict.as_str().green().bold()
    } else {
        verdict.as_str().yellow().bold()
    }
}

/// Availability of the optional collaborators.
pub fn render_status(status: &CollaboratorStatus) -> String {
    let mark = |ok: bool| if ok { "available".green() } else { "not available".yellow() };
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", "C2PA reader:".cyan().bold(), mark(status.manifest_reader));
    let _ = writeln!(out, "{} {}", "AI classifier:".cyan().bold(), mark(status.classifier));
    let _ = writeln!(
        out,
        "{} {}",
        "Platforms:".cyan().bold(),
        status.platforms.join(", ")
    );
    out
}

fn render_metadata(out: &mut String, metadata: &ExtractedMetadata) {
    if let Some(markers) = markers_line(metadata) {
        let _ = writeln!(out, "   Detected: {}", markers);
    }
    let fields = [
        ("Software", &metadata.software),
        ("Generator", &metadata.generator),
        ("Organization", &metadata.organization),
        ("Certificate", &metadata.certificate),
        ("Creator", &metadata.creator),
        ("Author", &metadata.author),
    ];
    for (name, value) in fields {
        if let Some(v) = value {
            let _ = writeln!(out, "   {}: {}", name, v);
        }
    }
}

fn render_video_without_manifest(out: &mut String) {
    let _ = writeln!(out, "\n{}", "Video file".cyan().bold());
    let _ = writeln!(out, "   Manifest detection only, no classifier fallback for video");
    let _ = writeln!(out, "\n{}", "No C2PA metadata found".yellow());
    let _ = writeln!(out, "\n{} {}", "VERDICT:".bold(), verdict_label(Verdict::NoC2paFound));
    let _ = writeln!(out, "{}", rule());
}

/// Multi-line report for one analysis.
pub fn render(result: &AnalysisResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", rule());
    let _ = writeln!(out, "{} {}", "FILE:".bold(), result.file);
    let _ = writeln!(out, "{}", rule());

    if !result.exists {
        let _ = writeln!(out, "{}", "File not found".red().bold());
        return out;
    }

    if result.final_verdict == Verdict::NoC2paFound
        && MediaKind::from_path(Path::new(&result.file)) == MediaKind::Video
    {
        render_video_without_manifest(&mut out);
        return out;
    }

    if let Some(api) = &result.api {
        if api.status != crate::remote::RemoteStatus::ApiUnavailable {
            let _ = writeln!(out, "\n{} {}", "C2PA API:".cyan().bold(), api.status.as_str());
            if let Some(resp) = &api.response {
                if resp.ai_detected == Some(true) {
                    let _ = writeln!(out, "   {}", "AI generation detected".red().bold());
                }
                if let Some(p) = &resp.platform {
                    let _ = writeln!(out, "   Platform: {}", title_case(p));
                }
                if let Some(c) = &resp.company {
                    let _ = writeln!(out, "   Company: {}", c);
                }
                if let Some(md) = &resp.metadata {
                    render_metadata(&mut out, md);
                }
                match resp.signature_valid {
                    Some(true) => {
                        let _ = writeln!(out, "   Signature: {}", "valid".green());
                    }
                    Some(false) => {
                        let _ = writeln!(out, "   Signature: {}", "invalid or expired".red());
                    }
                    None => {}
                }
                if let Some(m) = &resp.message {
                    let _ = writeln!(out, "   Message: {}", m);
                }
            }
        }
    }

    if let Some(manifest) = &result.manifest {
        let _ = writeln!(out, "\n{} {}", "C2PA Embedded:".cyan().bold(), manifest.status);
        if let Some(found) = &manifest.inspection {
            let _ = writeln!(out, "   Platform: {}", title_case(&found.platform));
            let _ = writeln!(out, "   Company: {}", found.company);
            if let Some(markers) = markers_line(&found.metadata) {
                let _ = writeln!(out, "   Detected: {}", markers);
            }
            if found.ai_generated {
                let _ = writeln!(out, "   {}", "AI generation detected".red().bold());
            }
        }
        if let Some(e) = &manifest.error {
            let _ = writeln!(out, "   Error: {}", e);
        }
    }

    if let Some(detection) = &result.detection {
        let _ = writeln!(out, "\n{} {}", "AI Detection:".cyan().bold(), detection.status.as_str());
        if detection.score > 0.0 {
            let ai_pct = detection.score * 100.0;
            let _ = writeln!(out, "   AI: {:.1}% | Human: {:.1}%", ai_pct, 100.0 - ai_pct);
        }
    }

    let _ = writeln!(out, "\n{} {}", "VERDICT:".bold(), verdict_label(result.final_verdict));
    let _ = writeln!(out, "   Confidence: {}", result.confidence);
    let _ = writeln!(out, "{}", rule());
    out
}

/// Manual inspection output: store, validation, platform and raw markers.
pub fn render_dump(dump: &ManifestDump) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", rule());
    let _ = writeln!(out, "{} {}", "MANIFEST INSPECTION:".bold(), dump.file);
    let _ = writeln!(out, "{}", rule());

    match (dump.active_manifest(), &dump.store_error) {
        (Some(manifest), _) => {
            let _ = writeln!(out, "\n{}", "Active manifest:".cyan().bold());
            let json = serde_json::to_string_pretty(manifest).unwrap_or_default();
            let _ = writeln!(out, "{}", json);
        }
        (None, Some(err)) => {
            let _ = writeln!(out, "\n{} {}", "No manifest store:".yellow().bold(), err.detail);
        }
        (None, None) => {
            let _ = writeln!(out, "\n{}", "Manifest store has no active manifest".yellow());
        }
    }

    if let Some(report) = &dump.validation {
        let verdict = if report.valid {
            "valid".green()
        } else {
            "invalid".red()
        };
        let _ = writeln!(out, "\n{} {}", "Validation:".cyan().bold(), verdict);
        if let Some(state) = &report.state {
            let _ = writeln!(out, "   State: {}", state);
        }
        for status in &report.statuses {
            let _ = writeln!(out, "   Status: {}", status);
        }
    }

    let _ = writeln!(out, "\n{} {}", "Platform:".cyan().bold(), dump.platform);
    if !dump.platform_markers.is_empty() {
        let _ = writeln!(out, "   Markers: {}", dump.platform_markers.join(", "));
    }

    if dump.raw_markers.is_empty() {
        let _ = writeln!(out, "\n{}", "No C2PA/JUMBF markers found in file".yellow());
    } else {
        let _ = writeln!(
            out,
            "\n{} {}",
            "Raw C2PA markers:".cyan().bold(),
            dump.raw_markers.len()
        );
        for hit in &dump.raw_markers {
            let _ = writeln!(out, "\n   {} at offset {}", hit.marker.bold(), hit.offset);
            if hit.keywords.is_empty() {
                let _ = writeln!(out, "   No recognizable metadata near this marker");
            } else {
                let preview: String = hit.context.chars().take(CONTEXT_PREVIEW_CHARS).collect();
                let _ = writeln!(out, "   Keywords: {}", hit.keywords.join(", "));
                let _ = writeln!(out, "   Context: {}", preview);
            }
        }
    }
    let _ = writeln!(out, "{}", rule());
    out
}
