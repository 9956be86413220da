//! Model catalog
//!
//! The catalog maps endpoint names to the models they serve. When models
//! come from a LiteLLM gateway it also records each model's upstream
//! provider, which the request router uses to reroute Vertex AI Claude
//! models.

pub mod litellm;

pub use litellm::{
    ModelInfoResponse, VERTEX_AI_ANTHROPIC, catalog_from_model_info, classify_provider,
};

use crate::endpoint::Endpoint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Models available per endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCatalog {
    #[serde(flatten)]
    pub endpoints: BTreeMap<String, Vec<String>>,
    /// Model name → gateway provider tag.
    #[serde(
        rename = "_modelProviders",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub model_providers: BTreeMap<String, String>,
}

impl ModelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, endpoint: &Endpoint, models: Vec<String>) {
        self.endpoints.insert(endpoint.as_str().to_string(), models);
    }

    pub fn models_for(&self, endpoint: &Endpoint) -> &[String] {
        self.endpoints
            .get(endpoint.as_str())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn provider_of(&self, model: &str) -> Option<&str> {
        self.model_providers.get(model).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty() && self.model_providers.is_empty()
    }

    pub fn model_count(&self) -> usize {
        self.endpoints.values().map(Vec::len).sum()
    }

    /// Merge `other` into `self`; entries from `other` win.
    pub fn merge(&mut self, other: ModelCatalog) {
        self.endpoints.extend(other.endpoints);
        self.model_providers.extend(other.model_providers);
    }
}

/// Endpoint a request should actually go to.
///
/// Claude models served through Vertex AI are listed under `anthropic` but
/// must be called through the Google endpoint.
pub fn reroute_endpoint(endpoint: &Endpoint, model: &str, catalog: &ModelCatalog) -> Endpoint {
    match endpoint {
        Endpoint::Anthropic if catalog.provider_of(model) == Some(VERTEX_AI_ANTHROPIC) => {
            Endpoint::Google
        }
        other => other.clone(),
    }
}

/// Built-in model list for an endpoint with credentials but no configured list.
pub fn default_models(endpoint: &Endpoint) -> &'static [&'static str] {
    match endpoint {
        Endpoint::OpenAI => &[
            "gpt-4o",
            "gpt-4o-mini",
            "gpt-4.1",
            "gpt-4.1-mini",
            "o3-mini",
            "o1",
            "gpt-4-turbo",
            "gpt-3.5-turbo",
        ],
        Endpoint::Anthropic => &[
            "claude-sonnet-4-20250514",
            "claude-opus-4-20250514",
            "claude-3-7-sonnet-latest",
            "claude-3-5-sonnet-latest",
            "claude-3-5-haiku-latest",
            "claude-3-opus-latest",
        ],
        Endpoint::Google => &[
            "gemini-2.5-pro",
            "gemini-2.5-flash",
            "gemini-2.0-flash",
            "gemini-1.5-pro",
        ],
        Endpoint::Bedrock => &[
            "anthropic.claude-3-5-sonnet-20240620-v1:0",
            "anthropic.claude-3-haiku-20240307-v1:0",
            "meta.llama3-1-70b-instruct-v1:0",
        ],
        Endpoint::AzureOpenAI | Endpoint::Custom(_) => &[],
    }
}
