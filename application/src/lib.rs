//! Application layer for chatrelay
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use config::{AppConfig, BehaviorConfig};
pub use ports::{
    config_store::{ConfigStore, ConfigStoreError},
    model_source::{FetchModelsRequest, ModelSource, UpstreamError},
    user_key_store::{UserKeyStore, UserKeyStoreError},
};
pub use use_cases::build_client_options::ClientOptionsUseCase;
pub use use_cases::guardrails::{GuardrailsError, GuardrailsUseCase};
pub use use_cases::load_models::{
    FetchReport, FetchState, LoadModelsError, LoadModelsRequest, LoadModelsUseCase, LoadReport,
};
pub use use_cases::prepare_run::{PrepareRunUseCase, RunConfig};
pub use use_cases::resolve_credentials::{
    CredentialError, CredentialResolution, ResolveCredentialsUseCase,
};
pub use use_cases::route_request::RequestRouter;
