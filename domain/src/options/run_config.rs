//! Shaping of the per-run LLM configuration handed to the agent runtime.

use super::client_options::ClientOptions;
use crate::endpoint::Endpoint;
use serde::Serialize;
use serde_json::{Map, Value};

const OPENROUTER: &str = "openrouter";

/// Custom providers that report usage on the final chunk instead of streaming it.
const USAGE_ONLY_PROVIDERS: &[&str] = &["xai", "ollama", "deepseek", "openrouter"];

/// Field of a streamed delta that carries reasoning text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasoningKey {
    ReasoningContent,
    Reasoning,
}

impl ReasoningKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasoningKey::ReasoningContent => "reasoning_content",
            ReasoningKey::Reasoning => "reasoning",
        }
    }
}

pub fn reasoning_key(
    endpoint: &Endpoint,
    base_url: Option<&str>,
    use_responses_api: bool,
) -> ReasoningKey {
    let openrouter = base_url.is_some_and(|url| url.contains(OPENROUTER))
        || endpoint.as_str().to_lowercase().contains(OPENROUTER);

    match endpoint {
        Endpoint::Google => ReasoningKey::Reasoning,
        _ if openrouter => ReasoningKey::Reasoning,
        Endpoint::OpenAI | Endpoint::AzureOpenAI if use_responses_api => ReasoningKey::Reasoning,
        _ => ReasoningKey::ReasoningContent,
    }
}

/// `streaming` (OpenAI/Google) or `stream` (Anthropic) in the model
/// parameters override the run default.
pub fn resolve_streaming(params: &Map<String, Value>, default: bool) -> bool {
    params
        .get("streaming")
        .and_then(Value::as_bool)
        .or_else(|| params.get("stream").and_then(Value::as_bool))
        .unwrap_or(default)
}

/// LLM configuration for one agent run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunLlmConfig {
    pub provider: Endpoint,
    pub streaming: bool,
    pub stream: bool,
    pub stream_usage: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub usage: bool,
    pub reasoning_key: ReasoningKey,
    pub model_parameters: Map<String, Value>,
}

pub fn build_run_config(
    endpoint: &Endpoint,
    options: &ClientOptions,
    default_streaming: bool,
) -> RunLlmConfig {
    let params = &options.model_options;
    let streaming = resolve_streaming(params, default_streaming);
    let use_responses_api = params
        .get("useResponsesApi")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let usage_only = match endpoint {
        Endpoint::Custom(name) => USAGE_ONLY_PROVIDERS.contains(&name.to_lowercase().as_str()),
        _ => false,
    };

    RunLlmConfig {
        provider: endpoint.clone(),
        streaming,
        stream: streaming,
        stream_usage: !usage_only,
        usage: usage_only,
        reasoning_key: reasoning_key(
            endpoint,
            options.reverse_proxy_url.as_deref(),
            use_responses_api,
        ),
        model_parameters: params.clone(),
    }
}
