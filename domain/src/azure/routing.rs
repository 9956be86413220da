//! Model → deployment group routing
//!
//! A requested model must resolve to exactly one configured group. There is
//! no fallback to the default Azure credentials: an unmapped model is an
//! error, so a request is never sent to the wrong deployment.

use super::{AzureEndpointConfig, AzureOptions};
use crate::config::EnvSettings;
use crate::core::error::ResolveError;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

const INSTANCE_PLACEHOLDER: &str = "${INSTANCE_NAME}";
const DEPLOYMENT_PLACEHOLDER: &str = "${DEPLOYMENT_NAME}";

/// Stream rate for models containing `gpt-4`.
pub const GPT4_STREAM_RATE: u32 = 30;
/// Stream rate for every other Azure model.
pub const DEFAULT_STREAM_RATE: u32 = 17;

/// Connection settings and parameter policy for one routed model.
#[derive(Debug, Clone, PartialEq)]
pub struct AzureRoute {
    pub group_name: String,
    pub azure_options: AzureOptions,
    pub base_url: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub serverless: bool,
    pub add_params: Map<String, Value>,
    pub drop_params: Vec<String>,
    pub force_prompt: bool,
}

/// Resolve the deployment group serving `model`.
///
/// `${ENV}` references in the group's key, instance, version and base URL
/// are expanded against `env`. Per-model deployment name and version win
/// over the group's.
pub fn map_model_to_azure_config(
    model: &str,
    config: &AzureEndpointConfig,
    env: &EnvSettings,
) -> Result<AzureRoute, ResolveError> {
    let unknown = || ResolveError::UnknownModelGroup {
        model: model.to_string(),
    };

    let mapping = config.model_group_map.get(model).ok_or_else(unknown)?;
    let group = config.group_map.get(&mapping.group).ok_or_else(unknown)?;

    let expand = |v: &Option<String>| v.as_deref().map(|s| env.expand(s));

    let api_version = mapping
        .version
        .as_ref()
        .or(group.version.as_ref())
        .map(|v| env.expand(v));

    let azure_options = if group.serverless {
        AzureOptions {
            api_key: expand(&group.api_key),
            api_version,
            ..Default::default()
        }
    } else {
        AzureOptions {
            api_key: expand(&group.api_key),
            instance_name: expand(&group.instance_name),
            deployment_name: mapping
                .deployment_name
                .as_ref()
                .or(group.deployment_name.as_ref())
                .map(|d| env.expand(d)),
            api_version,
        }
    };

    let base_url = group
        .base_url
        .as_deref()
        .map(|url| env.expand(&construct_azure_url(url, &azure_options)));

    Ok(AzureRoute {
        group_name: mapping.group.clone(),
        base_url,
        headers: group
            .headers
            .iter()
            .map(|(k, v)| (k.clone(), env.expand(v)))
            .collect(),
        serverless: group.serverless,
        add_params: group.add_params.clone(),
        drop_params: group.drop_params.clone(),
        force_prompt: group.force_prompt,
        azure_options,
    })
}

/// Substitute `${INSTANCE_NAME}` and `${DEPLOYMENT_NAME}` in a group base URL.
pub fn construct_azure_url(base_url: &str, options: &AzureOptions) -> String {
    base_url
        .replace(
            INSTANCE_PLACEHOLDER,
            options.instance_name.as_deref().unwrap_or_default(),
        )
        .replace(
            DEPLOYMENT_PLACEHOLDER,
            options.deployment_name.as_deref().unwrap_or_default(),
        )
}

/// Built-in stream rate for an Azure model.
pub fn default_stream_rate(model: &str) -> u32 {
    if model.contains("gpt-4") {
        GPT4_STREAM_RATE
    } else {
        DEFAULT_STREAM_RATE
    }
}

/// Configured stream rate, else the built-in default for `model`.
pub fn resolve_stream_rate(model: &str, config: &AzureEndpointConfig) -> u32 {
    config
        .stream_rate
        .unwrap_or_else(|| default_stream_rate(model))
}
