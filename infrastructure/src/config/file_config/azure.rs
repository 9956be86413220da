//! Azure OpenAI configuration from TOML (`[endpoints.azure_openai]`)
//!
//! ```toml
//! [endpoints.azure_openai]
//! title_convo = true
//!
//! [[endpoints.azure_openai.groups]]
//! group = "eastus"
//! api_key = "${AZURE_EASTUS_KEY}"
//! instance_name = "my-eastus"
//! version = "2024-02-15-preview"
//!
//! [endpoints.azure_openai.groups.models]
//! "gpt-4-turbo" = true
//! "gpt-4o" = { deployment_name = "gpt-4o-prod" }
//! ```

use chatrelay_domain::{AzureEndpointConfig, AzureGroup, AzureModelSpec, ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// A group's model entry: `true` to serve it with the group defaults, or a
/// table overriding the deployment name or API version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileAzureModel {
    Enabled(bool),
    Detailed {
        #[serde(default)]
        deployment_name: Option<String>,
        #[serde(default)]
        version: Option<String>,
    },
}

impl FileAzureModel {
    fn to_spec(&self, name: &str) -> Option<AzureModelSpec> {
        match self {
            FileAzureModel::Enabled(false) => None,
            FileAzureModel::Enabled(true) => Some(AzureModelSpec::new(name)),
            FileAzureModel::Detailed {
                deployment_name,
                version,
            } => Some(AzureModelSpec {
                name: name.to_string(),
                deployment_name: deployment_name.clone(),
                version: version.clone(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAzureGroup {
    pub group: String,
    pub api_key: Option<String>,
    pub instance_name: Option<String>,
    pub deployment_name: Option<String>,
    pub version: Option<String>,
    pub base_url: Option<String>,
    pub serverless: bool,
    pub headers: BTreeMap<String, String>,
    pub add_params: Map<String, Value>,
    pub drop_params: Vec<String>,
    pub force_prompt: bool,
    pub models: BTreeMap<String, FileAzureModel>,
}

impl FileAzureGroup {
    fn to_group(&self) -> AzureGroup {
        AzureGroup {
            api_key: self.api_key.clone(),
            instance_name: self.instance_name.clone(),
            deployment_name: self.deployment_name.clone(),
            version: self.version.clone(),
            base_url: self.base_url.clone(),
            serverless: self.serverless,
            headers: self.headers.clone(),
            add_params: self.add_params.clone(),
            drop_params: self.drop_params.clone(),
            force_prompt: self.force_prompt,
        }
    }

    fn specs(&self) -> Vec<AzureModelSpec> {
        self.models
            .iter()
            .filter_map(|(name, model)| model.to_spec(name))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAzureConfig {
    pub groups: Vec<FileAzureGroup>,
    pub stream_rate: Option<u32>,
    pub title_convo: bool,
    pub title_model: Option<String>,
    pub title_method: Option<String>,
}

impl FileAzureConfig {
    pub fn to_azure_config(&self) -> AzureEndpointConfig {
        let base = AzureEndpointConfig {
            stream_rate: self.stream_rate,
            title_convo: self.title_convo,
            title_model: self.title_model.clone(),
            title_method: self.title_method.clone(),
            ..Default::default()
        };
        self.groups.iter().fold(base, |config, group| {
            config.with_group(group.group.clone(), group.to_group(), group.specs())
        })
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        let mut claimed = BTreeSet::new();
        let mut names = BTreeSet::new();

        for group in &self.groups {
            let name = group.group.as_str();
            if !names.insert(name) {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::DuplicateAzureGroup {
                        group: name.to_string(),
                    },
                    format!("Azure group '{}' is defined more than once", name),
                ));
                continue;
            }

            let specs = group.specs();
            if specs.is_empty() {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::EmptyAzureGroup {
                        group: name.to_string(),
                    },
                    format!("Azure group '{}' serves no models", name),
                ));
            }

            for spec in specs {
                if !claimed.insert(spec.name.clone()) {
                    issues.push(ConfigIssue::warning(
                        ConfigIssueCode::DuplicateAzureModel {
                            model: spec.name.clone(),
                            group: name.to_string(),
                        },
                        format!(
                            "Azure model '{}' in group '{}' is already served by an earlier group",
                            spec.name, name
                        ),
                    ));
                }
            }

            if group.serverless {
                if group.base_url.as_deref().is_none_or(str::is_empty) {
                    issues.push(ConfigIssue::error(
                        ConfigIssueCode::MissingServerlessBaseUrl {
                            group: name.to_string(),
                        },
                        format!("Serverless Azure group '{}' needs a base_url", name),
                    ));
                }
            } else if group.instance_name.as_deref().is_none_or(str::is_empty) {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::MissingAzureInstance {
                        group: name.to_string(),
                    },
                    format!("Azure group '{}' needs an instance_name", name),
                ));
            }
        }

        issues
    }
}
