//! Process-local [`ConfigStore`]

use async_trait::async_trait;
use chatrelay_application::{ConfigStore, ConfigStoreError};
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::trace;

/// Cache entries live until invalidated or the process exits.
#[derive(Debug, Default)]
pub struct InMemoryConfigStore {
    entries: RwLock<HashMap<String, Value>>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl ConfigStore for InMemoryConfigStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, ConfigStoreError> {
        let value = self.entries.read().await.get(key).cloned();
        trace!("Config store get {} (hit: {})", key, value.is_some());
        Ok(value)
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), ConfigStoreError> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> Result<(), ConfigStoreError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
