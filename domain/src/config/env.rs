//! Immutable snapshot of the process environment.
//!
//! Resolution never reads the environment directly; callers capture an
//! [`EnvSettings`] once and pass it in, so the same inputs always yield the
//! same options.

use crate::azure::AzureOptions;
use crate::core::string::non_empty;
use crate::endpoint::Endpoint;
use std::collections::BTreeMap;

/// Environment variable names understood by the resolver.
pub mod vars {
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    pub const AZURE_API_KEY: &str = "AZURE_API_KEY";
    pub const ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
    pub const GOOGLE_KEY: &str = "GOOGLE_KEY";
    pub const BEDROCK_AWS_SECRET_ACCESS_KEY: &str = "BEDROCK_AWS_SECRET_ACCESS_KEY";

    pub const OPENAI_REVERSE_PROXY: &str = "OPENAI_REVERSE_PROXY";
    pub const AZURE_OPENAI_BASEURL: &str = "AZURE_OPENAI_BASEURL";
    pub const ANTHROPIC_REVERSE_PROXY: &str = "ANTHROPIC_REVERSE_PROXY";
    pub const GOOGLE_REVERSE_PROXY: &str = "GOOGLE_REVERSE_PROXY";

    pub const AZURE_OPENAI_API_KEY: &str = "AZURE_OPENAI_API_KEY";
    pub const AZURE_OPENAI_API_INSTANCE_NAME: &str = "AZURE_OPENAI_API_INSTANCE_NAME";
    pub const AZURE_OPENAI_API_DEPLOYMENT_NAME: &str = "AZURE_OPENAI_API_DEPLOYMENT_NAME";
    pub const AZURE_OPENAI_API_VERSION: &str = "AZURE_OPENAI_API_VERSION";

    pub const LITELLM_URL: &str = "LITELLM_URL";
    pub const PROXY: &str = "PROXY";
    pub const OPENAI_SUMMARIZE: &str = "OPENAI_SUMMARIZE";
    pub const DEBUG_OPENAI: &str = "DEBUG_OPENAI";
}

/// Captured environment variables with typed accessors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSettings {
    vars: BTreeMap<String, String>,
}

impl EnvSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Value of a variable; empty values count as unset.
    pub fn get(&self, name: &str) -> Option<&str> {
        non_empty(self.vars.get(name).map(String::as_str))
    }

    /// `true`/`TRUE` style boolean flags.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.get(name)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
    }

    /// Credential variable configured for a built-in endpoint.
    ///
    /// Custom endpoints carry their credential in the endpoint config instead.
    pub fn credential_for(&self, endpoint: &Endpoint) -> Option<&str> {
        let name = match endpoint {
            Endpoint::OpenAI => vars::OPENAI_API_KEY,
            Endpoint::AzureOpenAI => vars::AZURE_API_KEY,
            Endpoint::Anthropic => vars::ANTHROPIC_API_KEY,
            Endpoint::Google => vars::GOOGLE_KEY,
            Endpoint::Bedrock => vars::BEDROCK_AWS_SECRET_ACCESS_KEY,
            Endpoint::Custom(_) => return None,
        };
        self.get(name)
    }

    /// Base URL override configured for a built-in endpoint.
    pub fn base_url_for(&self, endpoint: &Endpoint) -> Option<&str> {
        let name = match endpoint {
            Endpoint::OpenAI => vars::OPENAI_REVERSE_PROXY,
            Endpoint::AzureOpenAI => vars::AZURE_OPENAI_BASEURL,
            Endpoint::Anthropic => vars::ANTHROPIC_REVERSE_PROXY,
            Endpoint::Google => vars::GOOGLE_REVERSE_PROXY,
            Endpoint::Bedrock | Endpoint::Custom(_) => return None,
        };
        self.get(name)
    }

    /// LLM gateway URL used as the fallback base URL for every provider.
    pub fn gateway_url(&self) -> Option<&str> {
        self.get(vars::LITELLM_URL)
    }

    pub fn proxy(&self) -> Option<&str> {
        self.get(vars::PROXY)
    }

    /// Azure credentials from the legacy single-deployment variables.
    pub fn azure_credentials(&self) -> AzureOptions {
        AzureOptions {
            api_key: self.get(vars::AZURE_API_KEY).map(str::to_string),
            instance_name: self
                .get(vars::AZURE_OPENAI_API_INSTANCE_NAME)
                .map(str::to_string),
            deployment_name: self
                .get(vars::AZURE_OPENAI_API_DEPLOYMENT_NAME)
                .map(str::to_string),
            api_version: self.get(vars::AZURE_OPENAI_API_VERSION).map(str::to_string),
        }
    }

    /// Expand `${VAR}` and `$VAR` references against this snapshot.
    ///
    /// Unknown variables are left in place, so a value that is exactly
    /// `${MISSING}` comes back unchanged.
    pub fn expand(&self, value: &str) -> String {
        shellexpand::env_with_context_no_errors(value, |name| self.get(name)).into_owned()
    }
}
