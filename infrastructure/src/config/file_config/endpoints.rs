//! Endpoint configuration from TOML (`[endpoints]` section)

use super::azure::FileAzureConfig;
use chatrelay_domain::config::{
    AllEndpointsConfig, BaseEndpointConfig, CustomEndpointConfig, CustomModelsConfig,
    EndpointsConfig,
};
use chatrelay_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Settings of a built-in endpoint (`[endpoints.openai]`, `[endpoints.anthropic]`, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBaseEndpointConfig {
    pub base_url: Option<String>,
    /// Minimum delay between streamed tokens, in milliseconds.
    pub stream_rate: Option<u32>,
    pub title_model: Option<String>,
    /// Replaces the built-in model list.
    pub models: Vec<String>,
}

impl From<&FileBaseEndpointConfig> for BaseEndpointConfig {
    fn from(file: &FileBaseEndpointConfig) -> Self {
        Self {
            base_url: file.base_url.clone(),
            stream_rate: file.stream_rate,
            title_model: file.title_model.clone(),
            models: file.models.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCustomModelsConfig {
    pub default: Vec<String>,
    pub fetch: bool,
    pub user_id_query: bool,
}

/// `[[endpoints.custom]]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCustomEndpointConfig {
    pub name: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    /// Absent means the endpoint has no model settings and is skipped.
    pub models: Option<FileCustomModelsConfig>,
    pub headers: BTreeMap<String, String>,
    pub direct_endpoint: bool,
    pub stream_rate: Option<u32>,
    pub title_model: Option<String>,
}

impl FileCustomEndpointConfig {
    fn to_custom(&self) -> CustomEndpointConfig {
        let models = self.models.clone().unwrap_or_default();
        CustomEndpointConfig {
            name: self.name.trim().to_string(),
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            models: CustomModelsConfig {
                default: models.default,
                fetch: models.fetch,
                user_id_query: models.user_id_query,
            },
            headers: self.headers.clone(),
            direct_endpoint: self.direct_endpoint,
            stream_rate: self.stream_rate,
            title_model: self.title_model.clone(),
        }
    }

    fn validate(&self, index: usize) -> Vec<ConfigIssue> {
        let name = self.name.trim();
        if name.is_empty() {
            return vec![ConfigIssue::error(
                ConfigIssueCode::EmptyEndpointName,
                format!("endpoints.custom[{}]: name must not be empty", index),
            )];
        }

        let missing = |field: &str| {
            ConfigIssue::warning(
                ConfigIssueCode::MissingCustomField {
                    endpoint: name.to_string(),
                    field: field.to_string(),
                },
                format!(
                    "endpoints.custom '{}': missing {}, endpoint will be skipped",
                    name, field
                ),
            )
        };

        let mut issues = Vec::new();
        if self.api_key.as_deref().is_none_or(str::is_empty) {
            issues.push(missing("api_key"));
        }
        if self.base_url.as_deref().is_none_or(str::is_empty) {
            issues.push(missing("base_url"));
        }
        let has_models = self
            .models
            .as_ref()
            .is_some_and(|m| m.fetch || !m.default.is_empty());
        if !has_models {
            issues.push(missing("models"));
        }
        issues
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAllEndpointsConfig {
    /// Overrides every per-endpoint stream rate.
    pub stream_rate: Option<u32>,
}

/// Raw `[endpoints]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEndpointsConfig {
    pub openai: Option<FileBaseEndpointConfig>,
    pub azure_openai: Option<FileAzureConfig>,
    pub anthropic: Option<FileBaseEndpointConfig>,
    pub google: Option<FileBaseEndpointConfig>,
    pub bedrock: Option<FileBaseEndpointConfig>,
    pub custom: Vec<FileCustomEndpointConfig>,
    pub all: Option<FileAllEndpointsConfig>,
}

impl FileEndpointsConfig {
    pub fn to_endpoints_config(&self) -> EndpointsConfig {
        EndpointsConfig {
            openai: self.openai.as_ref().map(Into::into),
            azure_openai: self.azure_openai.as_ref().map(FileAzureConfig::to_azure_config),
            anthropic: self.anthropic.as_ref().map(Into::into),
            google: self.google.as_ref().map(Into::into),
            bedrock: self.bedrock.as_ref().map(Into::into),
            custom: self.custom.iter().map(FileCustomEndpointConfig::to_custom).collect(),
            all: self.all.as_ref().map(|a| AllEndpointsConfig {
                stream_rate: a.stream_rate,
            }),
        }
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues: Vec<ConfigIssue> = self
            .custom
            .iter()
            .enumerate()
            .flat_map(|(i, c)| c.validate(i))
            .collect();
        if let Some(azure) = &self.azure_openai {
            issues.extend(azure.validate());
        }
        issues
    }
}
