//! User key store port
//!
//! Looks up credentials an end user stored for an endpoint.

use async_trait::async_trait;
use chatrelay_domain::{Endpoint, UserKeyValues};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UserKeyStoreError {
    #[error("User key store unavailable: {0}")]
    Unavailable(String),

    #[error("Stored key is corrupt: {0}")]
    Corrupt(String),
}

/// Store of user-provided keys, one entry per (user, endpoint).
#[async_trait]
pub trait UserKeyStore: Send + Sync {
    /// Stored values for `endpoint`, or `None` when the user has none.
    async fn get_user_key_values(
        &self,
        user_id: &str,
        endpoint: &Endpoint,
    ) -> Result<Option<UserKeyValues>, UserKeyStoreError>;
}
