//! OpenAI products: ChatGPT, DALL·E, GPT-4 and Sora.
//!
//! Every OpenAI product that signs C2PA manifests is generative, so any
//! marker hit is enough to call the content AI.

use super::{ExtractedMetadata, PlatformExtractor, PlatformIdentity};
use crate::manifest::Manifest;
use serde_json::Value;

const MARKERS: &[&str] = &[
    "OpenAI",
    "ChatGPT",
    "GPT-4",
    "GPT-4o",
    "DALL-E",
    "DALL\u{b7}E",
    // OpenAI signs through Truepic.
    "Truepic",
    "Sora",
];

const AI_INDICATORS: &[&str] = &["trainedAlgorithmicMedia", "c2pa.ai_generated", "generativeType"];

const AI_KEYWORDS: &[&str] = &["chatgpt", "gpt", "dall-e", "dall\u{b7}e", "sora"];

pub struct OpenAiExtractor {
    identity: PlatformIdentity,
}

impl OpenAiExtractor {
    pub fn new() -> Self {
        Self {
            identity: PlatformIdentity::new("openai", "OpenAI", MARKERS, AI_INDICATORS),
        }
    }
}

impl Default for OpenAiExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// `softwareAgent` is a plain string in C2PA 1.x and `{name, version}` in 2.x.
fn software_agent(action: &Value) -> Option<String> {
    let agent = action.get("softwareAgent")?;
    agent
        .as_str()
        .or_else(|| agent.get("name").and_then(Value::as_str))
        .map(str::to_string)
}

impl PlatformExtractor for OpenAiExtractor {
    fn identity(&self) -> &PlatformIdentity {
        &self.identity
    }

    fn extract_metadata(&self, manifest: Option<&Manifest>, raw: &[u8]) -> ExtractedMetadata {
        let mut md = ExtractedMetadata::for_company(&self.identity.company);

        if let Some(m) = manifest {
            md.title = m.title.clone();

            if let Some(info) = m.first_generator() {
                md.generator = info.name.clone();
                md.software = info.name.clone();
                md.version = info.version.clone();
            }

            if let Some(sig) = &m.signature_info {
                md.certificate = sig.common_name.clone();
                md.organization = sig.organization.clone().or_else(|| sig.issuer.clone());
            }

            md.creator = m.creator.clone();
            md.author = m.author.clone();
            md.producer = m.producer.clone();

            for assertion in &m.assertions {
                let actions = assertion.data.get("actions").and_then(Value::as_array);
                for agent in actions.into_iter().flatten().filter_map(software_agent) {
                    if agent.contains("GPT") || agent.contains("DALL") {
                        md.software = Some(agent.clone());
                    }
                    md.model = Some(agent);
                }
                if let Some(kind) = assertion.data.get("generativeType") {
                    md.generative_type = Some(match kind.as_str() {
                        Some(s) => s.to_string(),
                        None => kind.to_string(),
                    });
                }
            }

            md.ai_indicator = self.identity.find_ai_indicator(m);
            md.assertions = m.assertion_labels();
        }

        let found = self.search_raw_data(raw);
        if !found.is_empty() {
            if found.iter().any(|m| m == "ChatGPT") {
                md.software.get_or_insert_with(|| "ChatGPT".to_string());
                md.generator.get_or_insert_with(|| "ChatGPT".to_string());
            }
            if found.iter().any(|m| m.contains("GPT-4")) {
                md.model.get_or_insert_with(|| "GPT-4".to_string());
            }
            if found.iter().any(|m| m.contains("DALL")) {
                md.software.get_or_insert_with(|| "DALL-E".to_string());
            }
            if found.iter().any(|m| m == "Truepic") {
                md.certificate.get_or_insert_with(|| "Truepic".to_string());
            }
            md.detected_markers = found;
        }

        md
    }

    fn is_ai_generated(&self, md: &ExtractedMetadata) -> bool {
        if !md.detected_markers.is_empty() {
            return true;
        }

        let software = ExtractedMetadata::lower(&md.software);
        let model = ExtractedMetadata::lower(&md.model);
        if AI_KEYWORDS
            .iter()
            .any(|k| software.contains(k) || model.contains(k))
        {
            return true;
        }

        md.ai_indicator.is_some()
    }
}
