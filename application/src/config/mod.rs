//! Application-level configuration.
//!
//! [`AppConfig`] bundles the endpoint settings and environment snapshot every
//! use case reads, plus [`BehaviorConfig`] for runtime limits.

use chatrelay_domain::{EndpointsConfig, EnvSettings};
use std::time::Duration;

/// Timeout applied to upstream HTTP calls when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Application behavior configuration.
#[derive(Debug, Clone)]
pub struct BehaviorConfig {
    /// Maximum time to wait for an upstream response.
    pub timeout: Duration,
    /// Streaming default for agent runs when model parameters don't say.
    pub default_streaming: bool,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            default_streaming: true,
        }
    }
}

impl BehaviorConfig {
    /// Creates a BehaviorConfig from an optional timeout in seconds.
    ///
    /// If `seconds` is `None`, the default timeout is kept.
    pub fn from_timeout_seconds(seconds: Option<u64>) -> Self {
        Self {
            timeout: seconds.map(Duration::from_secs).unwrap_or(DEFAULT_TIMEOUT),
            ..Default::default()
        }
    }
}

/// Everything resolution reads, captured once at startup.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub endpoints: EndpointsConfig,
    pub env: EnvSettings,
    pub behavior: BehaviorConfig,
    /// Guardrails the gateway must offer.
    pub required_guardrails: Vec<String>,
}

impl AppConfig {
    pub fn new(endpoints: EndpointsConfig, env: EnvSettings) -> Self {
        Self {
            endpoints,
            env,
            ..Default::default()
        }
    }

    pub fn with_behavior(mut self, behavior: BehaviorConfig) -> Self {
        self.behavior = behavior;
        self
    }
}
