//! Azure OpenAI deployment groups
//!
//! Azure models are served from named groups of deployments. Each group
//! shares an instance (or a serverless base URL), API version, headers and a
//! parameter policy; `model_group_map` says which group serves which model.

pub mod routing;

pub use routing::{
    AzureRoute, default_stream_rate, map_model_to_azure_config, resolve_stream_rate,
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Credentials handed to the Azure OpenAI client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AzureOptions {
    #[serde(
        rename = "azureOpenAIApiKey",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub api_key: Option<String>,
    #[serde(
        rename = "azureOpenAIApiInstanceName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub instance_name: Option<String>,
    #[serde(
        rename = "azureOpenAIApiDeploymentName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub deployment_name: Option<String>,
    #[serde(
        rename = "azureOpenAIApiVersion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub api_version: Option<String>,
}

/// One deployment group (`groupMap[name]`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AzureGroup {
    pub api_key: Option<String>,
    pub instance_name: Option<String>,
    pub deployment_name: Option<String>,
    pub version: Option<String>,
    /// May contain `${INSTANCE_NAME}` / `${DEPLOYMENT_NAME}` placeholders.
    pub base_url: Option<String>,
    pub serverless: bool,
    pub headers: BTreeMap<String, String>,
    /// Parameters merged into every request's model options.
    pub add_params: Map<String, Value>,
    /// Parameter names removed from every request's model options.
    pub drop_params: Vec<String>,
    pub force_prompt: bool,
}

/// Which group serves a model, with optional per-model overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AzureModelMapping {
    pub group: String,
    pub deployment_name: Option<String>,
    pub version: Option<String>,
}

/// A model declared inside a group, before it is registered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AzureModelSpec {
    pub name: String,
    pub deployment_name: Option<String>,
    pub version: Option<String>,
}

impl AzureModelSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_deployment(mut self, deployment_name: impl Into<String>) -> Self {
        self.deployment_name = Some(deployment_name.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// The `azureOpenAI` endpoint configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AzureEndpointConfig {
    pub model_group_map: BTreeMap<String, AzureModelMapping>,
    pub group_map: BTreeMap<String, AzureGroup>,
    /// Every model served by some group, in registration order.
    pub model_names: Vec<String>,
    pub stream_rate: Option<u32>,
    pub title_convo: bool,
    pub title_model: Option<String>,
    pub title_method: Option<String>,
}

impl AzureEndpointConfig {
    /// Register a group and the models it serves.
    ///
    /// A model already claimed by an earlier group keeps its first mapping.
    /// A group name seen before is ignored along with its models, so models
    /// of the first definition never route to another group's credentials.
    pub fn with_group(
        mut self,
        name: impl Into<String>,
        group: AzureGroup,
        models: impl IntoIterator<Item = AzureModelSpec>,
    ) -> Self {
        let name = name.into();
        if self.group_map.contains_key(&name) {
            return self;
        }
        for spec in models {
            if self.model_group_map.contains_key(&spec.name) {
                continue;
            }
            self.model_names.push(spec.name.clone());
            self.model_group_map.insert(
                spec.name,
                AzureModelMapping {
                    group: name.clone(),
                    deployment_name: spec.deployment_name,
                    version: spec.version,
                },
            );
        }
        self.group_map.insert(name, group);
        self
    }
}
