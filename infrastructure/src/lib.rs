//! Infrastructure layer for chatrelay
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod cache;
pub mod config;
pub mod http;
pub mod user_keys;

// Re-export commonly used types
pub use cache::InMemoryConfigStore;
pub use config::{
    ConfigLoader, ConfigSource, ConfigSourceKind, FileConfig, FileOutputConfig, FileOutputFormat,
};
pub use http::HttpModelSource;
pub use user_keys::InMemoryUserKeyStore;
