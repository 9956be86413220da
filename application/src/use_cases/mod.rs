//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod build_client_options;
pub mod guardrails;
pub mod load_models;
pub mod prepare_run;
pub mod resolve_credentials;
pub mod route_request;
