//! Behavior and guardrail settings from TOML (`[behavior]`, `[guardrails]`)

use chatrelay_application::BehaviorConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBehaviorConfig {
    /// Upstream request timeout in seconds
    pub timeout_seconds: Option<u64>,
    /// Streaming default for runs whose model parameters don't say
    pub default_streaming: bool,
}

impl Default for FileBehaviorConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: None,
            default_streaming: true,
        }
    }
}

impl FileBehaviorConfig {
    pub fn to_behavior(&self) -> BehaviorConfig {
        BehaviorConfig {
            default_streaming: self.default_streaming,
            ..BehaviorConfig::from_timeout_seconds(self.timeout_seconds)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGuardrailsConfig {
    /// Guardrail names the gateway must offer
    pub required: Vec<String>,
}
