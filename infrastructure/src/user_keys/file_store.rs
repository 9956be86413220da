//! [`UserKeyStore`] backed by memory, optionally seeded from a JSON file
//!
//! File layout, keyed by user id then endpoint wire name:
//!
//! ```json
//! { "u1": { "openAI": { "apiKey": "sk-..." }, "azureOpenAI": { "apiKey": "{\"azureOpenAIApiKey\":\"...\"}" } } }
//! ```

use async_trait::async_trait;
use chatrelay_application::{UserKeyStore, UserKeyStoreError};
use chatrelay_domain::{Endpoint, UserKeyValues};
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::RwLock;
use tracing::debug;

type KeyFile = HashMap<String, HashMap<String, UserKeyValues>>;

#[derive(Debug, Default)]
pub struct InMemoryUserKeyStore {
    keys: RwLock<HashMap<(String, String), UserKeyValues>>,
}

impl InMemoryUserKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn from_json_file(path: &Path) -> Result<Self, UserKeyStoreError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| UserKeyStoreError::Unavailable(format!("{}: {}", path.display(), e)))?;
        let file: KeyFile = serde_json::from_str(&content)
            .map_err(|e| UserKeyStoreError::Corrupt(format!("{}: {}", path.display(), e)))?;

        let keys: HashMap<_, _> = file
            .into_iter()
            .flat_map(|(user, endpoints)| {
                endpoints.into_iter().map(move |(endpoint, values)| {
                    let endpoint = Endpoint::from(endpoint.as_str()).to_string();
                    ((user.clone(), endpoint), values)
                })
            })
            .collect();
        debug!("Loaded {} user keys from {}", keys.len(), path.display());

        Ok(Self {
            keys: RwLock::new(keys),
        })
    }

    pub async fn insert(&self, user_id: &str, endpoint: &Endpoint, values: UserKeyValues) {
        self.keys
            .write()
            .await
            .insert((user_id.to_string(), endpoint.to_string()), values);
    }
}

#[async_trait]
impl UserKeyStore for InMemoryUserKeyStore {
    async fn get_user_key_values(
        &self,
        user_id: &str,
        endpoint: &Endpoint,
    ) -> Result<Option<UserKeyValues>, UserKeyStoreError> {
        Ok(self
            .keys
            .read()
            .await
            .get(&(user_id.to_string(), endpoint.to_string()))
            .cloned())
    }
}
