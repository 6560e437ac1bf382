//! Cloud control-plane abstraction
//!
//! Read database server metadata, patch an administrator password, and work
//! the storage account two-slot key pattern. Transient control-plane
//! failures surface as `Ok(None)`/`Ok(false)`; the core treats them as
//! non-retryable at this layer and leaves retries to the driver.

use async_trait::async_trait;

use crate::core::{CloudError, KeySlot, SecretValue};

#[cfg(feature = "azure")]
pub mod arm;

/// Database server metadata needed to rotate its administrator
#[derive(Debug, Clone)]
pub struct DatabaseServerDetails {
    /// Fully-qualified DNS name of the server endpoint
    pub hostname: String,
    /// The server's real administrator login
    pub administrator_login: String,
}

/// One storage account access key as reported by the control plane
#[derive(Debug, Clone)]
pub struct StorageAccountKey {
    /// Key name as reported by the provider
    pub name: String,
    /// Key material
    pub value: SecretValue,
}

/// Extract the `key1`/`key2` pair, in that order, when both are present
pub fn key_pair(keys: &[StorageAccountKey]) -> Option<(&StorageAccountKey, &StorageAccountKey)> {
    let key1 = keys.iter().find(|key| key.name == KeySlot::Key1.as_str())?;
    let key2 = keys.iter().find(|key| key.name == KeySlot::Key2.as_str())?;
    Some((key1, key2))
}

/// Interface to the provider's resource-manager API.
///
/// Implementations must be safe for concurrent use. Update operations are
/// idempotent: replaying `update_database_admin_password` with the same
/// password must be safe.
#[async_trait]
pub trait CloudClient: Send + Sync {
    /// Fetch server metadata; `Ok(None)` on not-found or authorization
    /// failure
    async fn database_server_details(
        &self,
        resource_id: &str,
    ) -> Result<Option<DatabaseServerDetails>, CloudError>;

    /// Patch the server's administrator password, waiting for completion;
    /// `Ok(false)` when the control plane refused
    async fn update_database_admin_password(
        &self,
        resource_id: &str,
        password: &SecretValue,
    ) -> Result<bool, CloudError>;

    /// List the storage account's keys. A complete answer holds exactly the
    /// pair named `key1` and `key2`, in that order; a shorter list means one
    /// or both are missing.
    async fn storage_account_keys(
        &self,
        resource_id: &str,
    ) -> Result<Vec<StorageAccountKey>, CloudError>;

    /// Trigger server-side regeneration of one key slot and return the new
    /// key; `Ok(None)` on failure
    async fn regenerate_storage_account_key(
        &self,
        resource_id: &str,
        slot: KeySlot,
    ) -> Result<Option<StorageAccountKey>, CloudError>;
}
