//! Config store port
//!
//! Key-value cache for derived configuration such as the model catalog.
//! Callers inject the store; there is no shared global instance.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Well-known cache keys.
pub mod cache_keys {
    /// Cached [`ModelCatalog`](chatrelay_domain::ModelCatalog).
    pub const MODELS_CONFIG: &str = "modelsConfig";
}

#[derive(Error, Debug)]
pub enum ConfigStoreError {
    #[error("Config store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, ConfigStoreError>;

    async fn set(&self, key: &str, value: Value) -> Result<(), ConfigStoreError>;

    async fn invalidate(&self, key: &str) -> Result<(), ConfigStoreError>;
}
