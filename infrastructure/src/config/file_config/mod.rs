//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into application types.

mod azure;
mod behavior;
mod endpoints;
mod output;

pub use azure::{FileAzureConfig, FileAzureGroup, FileAzureModel};
pub use behavior::{FileBehaviorConfig, FileGuardrailsConfig};
pub use endpoints::{
    FileAllEndpointsConfig, FileBaseEndpointConfig, FileCustomEndpointConfig,
    FileCustomModelsConfig, FileEndpointsConfig,
};
pub use output::{FileOutputConfig, FileOutputFormat};

use chatrelay_application::AppConfig;
use chatrelay_domain::{ConfigIssue, EnvSettings};
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Endpoint settings
    pub endpoints: FileEndpointsConfig,
    /// Timeouts and run defaults
    pub behavior: FileBehaviorConfig,
    /// Required gateway guardrails
    pub guardrails: FileGuardrailsConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        self.endpoints.validate()
    }

    /// Combine with an environment snapshot into the application config.
    pub fn to_app_config(&self, env: EnvSettings) -> AppConfig {
        let mut config = AppConfig::new(self.endpoints.to_endpoints_config(), env)
            .with_behavior(self.behavior.to_behavior());
        config.required_guardrails = self.guardrails.required.clone();
        config
    }
}
