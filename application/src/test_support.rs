//! Port test doubles shared by the use case tests.

use crate::ports::config_store::{ConfigStore, ConfigStoreError};
use crate::ports::model_source::{FetchModelsRequest, ModelSource, UpstreamError};
use crate::ports::user_key_store::{UserKeyStore, UserKeyStoreError};
use async_trait::async_trait;
use chatrelay_domain::catalog::ModelInfoResponse;
use chatrelay_domain::{Endpoint, Guardrail, UserKeyValues};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
pub struct MockUserKeyStore {
    values: Mutex<HashMap<(String, String), UserKeyValues>>,
    pub calls: AtomicUsize,
}

impl MockUserKeyStore {
    pub fn with(self, user_id: &str, endpoint: &Endpoint, values: UserKeyValues) -> Self {
        self.values
            .lock()
            .unwrap()
            .insert((user_id.to_string(), endpoint.to_string()), values);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserKeyStore for MockUserKeyStore {
    async fn get_user_key_values(
        &self,
        user_id: &str,
        endpoint: &Endpoint,
    ) -> Result<Option<UserKeyValues>, UserKeyStoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .values
            .lock()
            .unwrap()
            .get(&(user_id.to_string(), endpoint.to_string()))
            .cloned())
    }
}

#[derive(Default)]
pub struct MockConfigStore {
    entries: Mutex<HashMap<String, Value>>,
    reject_writes: bool,
}

impl MockConfigStore {
    pub fn read_only() -> Self {
        Self {
            reject_writes: true,
            ..Default::default()
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }

    pub fn value(&self, key: &str) -> Option<Value> {
        self.entries.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl ConfigStore for MockConfigStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, ConfigStoreError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), ConfigStoreError> {
        if self.reject_writes {
            return Err(ConfigStoreError::Unavailable("read-only".to_string()));
        }
        self.entries.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> Result<(), ConfigStoreError> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Model source answering from canned per-URL responses.
#[derive(Default)]
pub struct MockModelSource {
    models: Mutex<HashMap<String, Result<Vec<String>, UpstreamError>>>,
    model_info: Mutex<Option<Result<ModelInfoResponse, UpstreamError>>>,
    guardrails: Mutex<Option<Result<Vec<Guardrail>, UpstreamError>>>,
    pub requests: Mutex<Vec<FetchModelsRequest>>,
    pub info_calls: AtomicUsize,
}

impl MockModelSource {
    pub fn with_models(self, base_url: &str, result: Result<Vec<&str>, UpstreamError>) -> Self {
        self.models.lock().unwrap().insert(
            base_url.to_string(),
            result.map(|m| m.into_iter().map(str::to_string).collect()),
        );
        self
    }

    pub fn with_model_info(self, result: Result<Value, UpstreamError>) -> Self {
        *self.model_info.lock().unwrap() =
            Some(result.map(|v| serde_json::from_value(v).unwrap()));
        self
    }

    pub fn with_guardrails(self, result: Result<Vec<Guardrail>, UpstreamError>) -> Self {
        *self.guardrails.lock().unwrap() = Some(result);
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelSource for MockModelSource {
    async fn fetch_models(&self, request: &FetchModelsRequest) -> Result<Vec<String>, UpstreamError> {
        self.requests.lock().unwrap().push(request.clone());
        self.models
            .lock()
            .unwrap()
            .get(&request.base_url)
            .cloned()
            .unwrap_or(Err(UpstreamError::Status { status: 404 }))
    }

    async fn fetch_model_info(
        &self,
        _base_url: &str,
        _authorization: Option<&str>,
    ) -> Result<ModelInfoResponse, UpstreamError> {
        self.info_calls.fetch_add(1, Ordering::SeqCst);
        self.model_info
            .lock()
            .unwrap()
            .clone()
            .unwrap_or(Err(UpstreamError::Network("unreachable".to_string())))
    }

    async fn fetch_guardrails(
        &self,
        _base_url: &str,
        _authorization: Option<&str>,
    ) -> Result<Vec<Guardrail>, UpstreamError> {
        self.guardrails
            .lock()
            .unwrap()
            .clone()
            .unwrap_or(Ok(Vec::new()))
    }
}
