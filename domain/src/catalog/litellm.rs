//! LiteLLM `/model/info` payload and provider classification.

use super::ModelCatalog;
use crate::endpoint::Endpoint;
use serde::Deserialize;

/// Provider tag of Claude models served through Vertex AI.
pub const VERTEX_AI_ANTHROPIC: &str = "vertex_ai-anthropic_models";

const EMBEDDING_MODE: &str = "embedding";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelInfoResponse {
    #[serde(default)]
    pub data: Vec<ModelInfoEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelInfoEntry {
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub model_info: Option<ModelInfoDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelInfoDetails {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub litellm_provider: Option<String>,
}

/// Endpoint a LiteLLM provider tag is listed under, if any.
pub fn classify_provider(provider: &str) -> Option<Endpoint> {
    match provider {
        "openai" => Some(Endpoint::OpenAI),
        "anthropic" | VERTEX_AI_ANTHROPIC => Some(Endpoint::Anthropic),
        "google" | "gemini" | "vertex_ai-language-models" => Some(Endpoint::Google),
        "bedrock" => Some(Endpoint::Bedrock),
        _ => None,
    }
}

/// Group gateway models by endpoint.
///
/// Embedding models and entries without a name or provider are skipped.
/// Every remaining model's provider tag is kept in `model_providers`, while
/// only classified models appear in an endpoint bucket. Empty buckets are
/// not emitted.
pub fn catalog_from_model_info(response: &ModelInfoResponse) -> ModelCatalog {
    let mut catalog = ModelCatalog::default();

    for entry in &response.data {
        let info = entry.model_info.as_ref();
        if info.and_then(|i| i.mode.as_deref()) == Some(EMBEDDING_MODE) {
            continue;
        }
        let (Some(name), Some(provider)) = (
            entry.model_name.as_deref().filter(|n| !n.is_empty()),
            info.and_then(|i| i.litellm_provider.as_deref())
                .filter(|p| !p.is_empty()),
        ) else {
            continue;
        };

        catalog
            .model_providers
            .insert(name.to_string(), provider.to_string());
        if let Some(endpoint) = classify_provider(provider) {
            catalog
                .endpoints
                .entry(endpoint.as_str().to_string())
                .or_default()
                .push(name.to_string());
        }
    }

    catalog
}
