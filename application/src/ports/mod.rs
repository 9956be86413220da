//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod config_store;
pub mod model_source;
pub mod user_key_store;
