//! Client options: the merged per-request configuration and its
//! provider-specific projections.

pub mod anthropic;
pub mod builder;
pub mod client_options;
pub mod headers;
pub mod run_config;

pub use anthropic::{AnthropicConfig, AnthropicLlmConfig, anthropic_llm_config};
pub use builder::{ClientOptionsInput, build_client_options};
pub use client_options::{ClientOptions, ContextStrategy};
pub use headers::resolve_headers;
pub use run_config::{ReasoningKey, RunLlmConfig, build_run_config, reasoning_key, resolve_streaming};
