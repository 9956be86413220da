//! Resolved per-request client configuration.

use crate::azure::AzureOptions;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// How a conversation that outgrows the context window is shortened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextStrategy {
    Summarize,
}

/// Final options handed to a provider client.
///
/// Every map is ordered, so two builds from the same inputs serialize to
/// identical bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reverse_proxy_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_header: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub default_query: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub azure: Option<AzureOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_convo: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_strategy: Option<ContextStrategy>,
    pub debug: bool,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub add_params: Map<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub drop_params: Vec<String>,
    pub force_prompt: bool,
    pub model_options: Map<String, Value>,
    pub use_legacy_content: bool,
}

impl ClientOptions {
    /// Model name carried in `model_options`.
    pub fn model(&self) -> Option<&str> {
        self.model_options.get("model").and_then(Value::as_str)
    }

    /// Copy with secrets masked, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.api_key = copy.api_key.as_deref().map(mask);
        copy.auth_header = copy.auth_header.as_deref().map(mask);
        if let Some(azure) = copy.azure.as_mut() {
            azure.api_key = azure.api_key.as_deref().map(mask);
        }
        if let Some(key) = copy.headers.get_mut("api-key") {
            *key = mask(key);
        }
        copy
    }
}

fn mask(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("{visible}****")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serializes_camel_case_and_skips_empty() {
        let mut options = ClientOptions {
            reverse_proxy_url: Some("https://x".to_string()),
            ..Default::default()
        };
        options.model_options.insert("model".to_string(), json!("gpt-4"));

        let value = serde_json::to_value(&options).unwrap();
        assert_eq!(value["reverseProxyUrl"], "https://x");
        assert_eq!(value["modelOptions"]["model"], "gpt-4");
        assert!(value.get("headers").is_none());
        assert!(value.get("apiKey").is_none());
        assert_eq!(options.model(), Some("gpt-4"));
    }

    #[test]
    fn test_redacted_masks_secrets() {
        let mut options = ClientOptions {
            api_key: Some("sk-1234567890".to_string()),
            auth_header: Some("short".to_string()),
            ..Default::default()
        };
        options
            .headers
            .insert("api-key".to_string(), "azure-secret-key".to_string());

        let redacted = options.redacted();
        assert_eq!(redacted.api_key.as_deref(), Some("sk-1****"));
        assert_eq!(redacted.auth_header.as_deref(), Some("****"));
        assert_eq!(redacted.headers["api-key"], "azur****");
    }
}
