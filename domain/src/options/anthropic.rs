//! Anthropic client configuration projected from resolved options.
//!
//! Model options use the chat UI's parameter names (`maxOutputTokens`,
//! `topP`, `topK`, `promptCache`, `thinkingBudget`, ...). Extended thinking
//! and prompt caching are enabled only for model families that support them.

use super::client_options::ClientOptions;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::LazyLock;

pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-latest";
pub const DEFAULT_MAX_OUTPUT_TOKENS: u64 = 8192;
pub const DEFAULT_THINKING_BUDGET: u64 = 2000;

const BETA_HEADER: &str = "anthropic-beta";
const WEB_SEARCH_TOOL_TYPE: &str = "web_search_20250305";

static CLAUDE_3_7: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"claude-3[-.]7").expect("valid pattern"));
static CLAUDE_3_5_SONNET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"claude-3[-.]5-sonnet").expect("valid pattern"));
static CLAUDE_SONNET_4: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"claude-sonnet-4").expect("valid pattern"));
static CLAUDE_4_PLUS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"claude-(?:sonnet|opus|haiku)-[4-9]|claude-[4-9]").expect("valid pattern")
});
static PROMPT_CACHE_FAMILIES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"claude-3[-.]7|claude-3[-.]5-(?:sonnet|haiku)|claude-3-(?:sonnet|haiku|opus)")
        .expect("valid pattern")
});

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThinkingConfig {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub budget_tokens: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvocationMetadata {
    pub user_id: Option<String>,
}

/// Extra fields sent with every Anthropic request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvocationKwargs {
    pub metadata: InvocationMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guardrails: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnthropicLlmConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub model: String,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
    pub max_tokens: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking: Option<ThinkingConfig>,
    #[serde(rename = "anthropicApiUrl", skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub default_headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    pub invocation_kwargs: InvocationKwargs,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnthropicTool {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub name: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnthropicConfig {
    pub llm_config: AnthropicLlmConfig,
    pub tools: Vec<AnthropicTool>,
}

pub fn supports_thinking(model: &str) -> bool {
    CLAUDE_3_7.is_match(model) || CLAUDE_4_PLUS.is_match(model)
}

pub fn supports_prompt_cache(model: &str) -> bool {
    if model.contains("claude-3-5-sonnet-latest") || model.contains("claude-3.5-sonnet-latest") {
        return false;
    }
    PROMPT_CACHE_FAMILIES.is_match(model) || CLAUDE_4_PLUS.is_match(model)
}

/// Beta headers enabling prompt caching for `model`.
pub fn claude_beta_headers(model: &str) -> BTreeMap<String, String> {
    let value = if CLAUDE_3_5_SONNET.is_match(model) {
        "max-tokens-3-5-sonnet-2024-07-15,prompt-caching-2024-07-31"
    } else if CLAUDE_3_7.is_match(model) {
        "token-efficient-tools-2025-02-19,output-128k-2025-02-19,prompt-caching-2024-07-31"
    } else if CLAUDE_SONNET_4.is_match(model) {
        "prompt-caching-2024-07-31,context-1m-2025-08-07"
    } else {
        "prompt-caching-2024-07-31"
    };
    BTreeMap::from([(BETA_HEADER.to_string(), value.to_string())])
}

/// Project resolved options onto the Anthropic client configuration.
pub fn anthropic_llm_config(options: &ClientOptions) -> AnthropicConfig {
    let params = &options.model_options;

    let thinking_requested = bool_param(params, "thinking").unwrap_or(true);
    let prompt_cache = bool_param(params, "promptCache").unwrap_or(true);
    let thinking_budget = u64_param(params, "thinkingBudget").unwrap_or(DEFAULT_THINKING_BUDGET);

    let model = params
        .get("model")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_MODEL)
        .to_string();
    let max_tokens = u64_param(params, "maxOutputTokens").unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS);

    let thinking = (thinking_requested && supports_thinking(&model)).then(|| ThinkingConfig {
        kind: "enabled",
        budget_tokens: if thinking_budget >= max_tokens {
            nine_tenths(max_tokens)
        } else {
            thinking_budget
        },
    });
    // Only claude-3.7 rejects topP/topK alongside extended thinking
    let sampling = thinking.is_none() || !CLAUDE_3_7.is_match(&model);

    let default_headers = if prompt_cache && supports_prompt_cache(&model) {
        claude_beta_headers(&model)
    } else {
        BTreeMap::new()
    };

    let mut tools = Vec::new();
    if bool_param(params, "web_search").unwrap_or(false) {
        tools.push(AnthropicTool {
            kind: WEB_SEARCH_TOOL_TYPE,
            name: "web_search",
        });
    }

    let llm_config = AnthropicLlmConfig {
        api_key: options.api_key.clone(),
        stream: bool_param(params, "stream").unwrap_or(true),
        temperature: params.get("temperature").and_then(Value::as_f64),
        stop_sequences: params.get("stop").and_then(|v| {
            v.as_array().map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
        }),
        max_tokens,
        top_p: params
            .get("topP")
            .and_then(Value::as_f64)
            .filter(|_| sampling),
        top_k: u64_param(params, "topK").filter(|_| sampling),
        thinking,
        base_url: options.reverse_proxy_url.clone(),
        default_headers,
        proxy: options.proxy.clone(),
        invocation_kwargs: InvocationKwargs {
            metadata: InvocationMetadata {
                user_id: params.get("user").and_then(Value::as_str).map(str::to_string),
            },
            guardrails: params.get("guardrails").filter(|v| !v.is_null()).cloned(),
        },
        model,
    };

    AnthropicConfig { llm_config, tools }
}

/// 90% of `n`, rounded down, without overflowing.
fn nine_tenths(n: u64) -> u64 {
    (u128::from(n) * 9 / 10) as u64
}

fn bool_param(params: &Map<String, Value>, key: &str) -> Option<bool> {
    params.get(key).and_then(Value::as_bool)
}

fn u64_param(params: &Map<String, Value>, key: &str) -> Option<u64> {
    params.get(key).and_then(Value::as_u64)
}
