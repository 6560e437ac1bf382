//! Storage account key strategy
//!
//! Works the provider's two-slot pattern: the stored credential names the
//! slot consumers are using, so rotation regenerates the OPPOSITE slot and
//! then makes it the stored one. Each rotation inverts which slot is hot,
//! and the previously-stored key stays valid throughout.

use async_trait::async_trait;
use std::sync::Arc;

use crate::cloud::{key_pair, CloudClient};
use crate::core::{
    CancellationToken, Clock, KeySlot, ResourceConfig, Result, RotationError, RotationFlags,
    SecretValue, StorageKeyCredential, CONTENT_TYPE_JSON,
};
use crate::rotation::rotator::RotationStrategy;
use crate::store::SecretStore;

/// Strategy tag for the storage-key rotator
pub const STORAGE_KEY_STRATEGY: &str = "azure/storage/account/key";

/// Alternates a storage account's two named access keys
pub struct StorageKeyRotator {
    cloud: Arc<dyn CloudClient>,
    clock: Arc<dyn Clock>,
}

impl StorageKeyRotator {
    /// Create the strategy with its control-plane client and clock
    pub fn new(cloud: Arc<dyn CloudClient>, clock: Arc<dyn Clock>) -> Self {
        Self { cloud, clock }
    }

    async fn rotate_slot(
        &self,
        resource: &ResourceConfig,
        store: &dyn SecretStore,
        slot: KeySlot,
        flags: &RotationFlags,
        token: &CancellationToken,
    ) -> Result<String> {
        let resource_id =
            resource
                .target_resource_id
                .as_deref()
                .ok_or(RotationError::MissingTargetResource {
                    name: resource.name.clone(),
                })?;

        let keys = self.cloud.storage_account_keys(resource_id).await?;
        if key_pair(&keys).is_none() {
            return Err(RotationError::KeyPairIncomplete {
                resource_id: resource_id.to_string(),
            });
        }

        if flags.what_if {
            return Ok(format!(
                "Would have regenerated '{slot}' for '{resource_id}'"
            ));
        }

        if token.is_cancelled() {
            return Err(RotationError::Cancelled {
                name: resource.name.clone(),
            });
        }

        let regenerated = self
            .cloud
            .regenerate_storage_account_key(resource_id, slot)
            .await?
            .filter(|key| key.name == slot.as_str())
            .ok_or_else(|| RotationError::KeyNotReturned {
                slot: slot.as_str().to_string(),
                resource_id: resource_id.to_string(),
            })?;

        // The old key material for this slot is gone; a store failure from
        // here on requires operator recovery.
        let credential = StorageKeyCredential {
            name: slot,
            value: regenerated.value,
        };
        let payload = credential.to_json()?;

        let expires_on = resource.expiration_from(self.clock.now());
        store
            .update_secret(
                &resource.name,
                SecretValue::new(payload),
                Some(expires_on),
                CONTENT_TYPE_JSON,
            )
            .await
            .map_err(|error| RotationError::recovery_required(&resource.name, &error))?;

        Ok(format!(
            "Regenerated '{slot}' for '{resource_id}'; stored as the active key, expires {expires_on}"
        ))
    }
}

#[async_trait]
impl RotationStrategy for StorageKeyRotator {
    fn strategy_type(&self) -> &'static str {
        STORAGE_KEY_STRATEGY
    }

    /// First-time provisioning always rotates `key1`
    async fn perform_initialization(
        &self,
        resource: &ResourceConfig,
        store: &dyn SecretStore,
        flags: &RotationFlags,
        token: &CancellationToken,
    ) -> Result<String> {
        self.rotate_slot(resource, store, KeySlot::Key1, flags, token)
            .await
    }

    /// Rotation targets the slot opposite the stored one, so the key in use
    /// by consumers stays valid while the other regenerates
    async fn perform_rotation(
        &self,
        resource: &ResourceConfig,
        store: &dyn SecretStore,
        flags: &RotationFlags,
        token: &CancellationToken,
    ) -> Result<String> {
        let raw = store
            .get_secret_value(&resource.name)
            .await?
            .ok_or_else(|| RotationError::StoredSecretMissing {
                name: resource.name.clone(),
            })?;

        let stored = StorageKeyCredential::from_json(raw.expose()).map_err(|error| {
            RotationError::StoredSecretMalformed {
                name: resource.name.clone(),
                reason: error.to_string(),
            }
        })?;

        self.rotate_slot(resource, store, stored.name.other(), flags, token)
            .await
    }
}
