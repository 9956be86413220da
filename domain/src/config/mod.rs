//! Endpoint configuration and environment snapshot.

pub mod endpoints;
pub mod env;
pub mod validation;

pub use endpoints::{
    AllEndpointsConfig, BaseEndpointConfig, CustomEndpointConfig, CustomModelsConfig,
    EndpointsConfig,
};
pub use env::EnvSettings;
pub use validation::{ConfigIssue, ConfigIssueCode, Severity};
