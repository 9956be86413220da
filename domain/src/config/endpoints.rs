//! Endpoint configuration types (provider-neutral, serde-free).
//!
//! These types define the shape of `endpoints` settings without depending
//! on any serialization format. The infrastructure layer converts its file
//! representation into them.

use crate::azure::AzureEndpointConfig;
use crate::endpoint::Endpoint;
use std::collections::BTreeMap;

/// All configured endpoints.
#[derive(Debug, Clone, Default)]
pub struct EndpointsConfig {
    pub openai: Option<BaseEndpointConfig>,
    pub azure_openai: Option<AzureEndpointConfig>,
    pub anthropic: Option<BaseEndpointConfig>,
    pub google: Option<BaseEndpointConfig>,
    pub bedrock: Option<BaseEndpointConfig>,
    pub custom: Vec<CustomEndpointConfig>,
    /// Settings applied to every endpoint (`endpoints.all`).
    pub all: Option<AllEndpointsConfig>,
}

impl EndpointsConfig {
    /// Settings for a built-in endpoint, if configured.
    ///
    /// Azure has its own config type, and custom endpoints are looked up with
    /// [`EndpointsConfig::custom_endpoint`].
    pub fn base(&self, endpoint: &Endpoint) -> Option<&BaseEndpointConfig> {
        match endpoint {
            Endpoint::OpenAI => self.openai.as_ref(),
            Endpoint::Anthropic => self.anthropic.as_ref(),
            Endpoint::Google => self.google.as_ref(),
            Endpoint::Bedrock => self.bedrock.as_ref(),
            Endpoint::AzureOpenAI | Endpoint::Custom(_) => None,
        }
    }

    pub fn custom_endpoint(&self, name: &str) -> Option<&CustomEndpointConfig> {
        self.custom.iter().find(|c| c.endpoint().as_str() == name)
    }

    /// Stream rate from `endpoints.all`, which overrides per-endpoint values.
    pub fn global_stream_rate(&self) -> Option<u32> {
        self.all.as_ref().and_then(|a| a.stream_rate)
    }
}

/// Settings shared by the built-in endpoints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaseEndpointConfig {
    /// Default base URL when neither the user nor the environment sets one.
    pub base_url: Option<String>,
    /// Minimum delay between streamed tokens, in milliseconds.
    pub stream_rate: Option<u32>,
    pub title_model: Option<String>,
    /// Static model list replacing the built-in defaults.
    pub models: Vec<String>,
}

/// Settings applied to every endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllEndpointsConfig {
    pub stream_rate: Option<u32>,
}

/// Model listing settings of a custom endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomModelsConfig {
    /// Static list, also the fallback when a fetch fails or comes back empty.
    pub default: Vec<String>,
    /// Fetch the list from `{baseURL}/models`.
    pub fetch: bool,
    /// Append `?user=<id>` to the models request.
    pub user_id_query: bool,
}

impl CustomModelsConfig {
    pub fn is_configured(&self) -> bool {
        self.fetch || !self.default.is_empty()
    }
}

/// A named OpenAI-compatible endpoint (`endpoints.custom[]`).
///
/// `api_key` and `base_url` may hold `${ENV}` references or `user_provided`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomEndpointConfig {
    pub name: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub models: CustomModelsConfig,
    pub headers: BTreeMap<String, String>,
    pub direct_endpoint: bool,
    pub stream_rate: Option<u32>,
    pub title_model: Option<String>,
}

impl CustomEndpointConfig {
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::custom(&self.name)
    }

    /// Endpoints missing a name, key, URL or model settings are skipped when
    /// building the catalog.
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty()
            && self.api_key.as_deref().is_some_and(|k| !k.is_empty())
            && self.base_url.as_deref().is_some_and(|u| !u.is_empty())
            && self.models.is_configured()
    }
}
