//! Domain layer for chatrelay
//!
//! Pure types and functions for deciding, per chat request, which
//! credentials, base URL, headers and model parameters to use. Nothing in
//! this crate performs I/O; the environment is passed in as an
//! [`EnvSettings`] snapshot.
//!
//! # Core Concepts
//!
//! ## Endpoint
//!
//! A provider family (`openAI`, `azureOpenAI`, `anthropic`, `google`,
//! `bedrock`) or a named custom endpoint such as a LiteLLM gateway.
//!
//! ## Client options
//!
//! The merged configuration for one request, built from defaults, the
//! environment, endpoint settings, Azure group overrides and the request's
//! own model parameters.
//!
//! ## Model catalog
//!
//! Models available per endpoint, plus the gateway provider of each model
//! when the catalog was loaded from LiteLLM.

pub mod azure;
pub mod catalog;
pub mod config;
pub mod core;
pub mod credential;
pub mod endpoint;
pub mod guardrails;
pub mod options;
pub mod request;

pub use azure::{
    AzureEndpointConfig, AzureGroup, AzureModelMapping, AzureModelSpec, AzureOptions, AzureRoute,
    map_model_to_azure_config,
};
pub use catalog::{ModelCatalog, VERTEX_AI_ANTHROPIC, catalog_from_model_info, reroute_endpoint};
pub use config::{
    AllEndpointsConfig, BaseEndpointConfig, ConfigIssue, ConfigIssueCode, CustomEndpointConfig,
    CustomModelsConfig, EndpointsConfig, EnvSettings, Severity,
};
pub use core::error::{ErrorKind, ResolveError};
pub use credential::{
    CredentialInput, CredentialSource, ResolvedCredentials, UserKeyValues, check_user_key_expiry,
    resolve_credentials,
};
pub use endpoint::Endpoint;
pub use guardrails::{Guardrail, GuardrailValidation, validate_required_guardrails};
pub use options::{
    AnthropicConfig, ClientOptions, ClientOptionsInput, RunLlmConfig, anthropic_llm_config,
    build_client_options, build_run_config,
};
pub use request::{ChatRequest, RequestUser};
