//! Secret store abstraction
//!
//! Uniform interface over a persistent secret repository. Reference
//! adapters: [`memory::MemorySecretStore`] for tests and embedding, and a
//! key-vault REST adapter behind the `key-vault` feature.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::core::{SecretInfo, SecretValue, StoreError};

pub mod memory;

#[cfg(feature = "key-vault")]
pub mod key_vault;

/// Durable, confidential key-value repository with per-entry metadata.
///
/// Implementations must be safe for concurrent use; a `get_secret` that
/// happens-after a successful `update_secret` on the same key in the same
/// process observes the new metadata.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Identifier recorded in [`SecretInfo::store_id`]
    fn store_id(&self) -> &str;

    /// Fetch metadata for a secret; `Ok(None)` when absent, never an error
    async fn get_secret(&self, name: &str) -> Result<Option<SecretInfo>, StoreError>;

    /// Fetch the raw secret value; `Ok(None)` when absent
    async fn get_secret_value(&self, name: &str) -> Result<Option<SecretValue>, StoreError>;

    /// Create or overwrite a secret and return the newly-written metadata.
    ///
    /// An `Err` is a write failure the rotator must surface.
    async fn update_secret(
        &self,
        name: &str,
        value: SecretValue,
        expires_on: Option<DateTime<Utc>>,
        content_type: &str,
    ) -> Result<SecretInfo, StoreError>;
}
