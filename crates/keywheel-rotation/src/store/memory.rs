//! In-memory secret store for tests and embedding

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::{Clock, SecretInfo, SecretValue, StoreError, SystemClock};

use super::SecretStore;

struct StoredSecret {
    value: SecretValue,
    info: SecretInfo,
}

/// In-memory implementation of [`SecretStore`].
///
/// Concurrent map with per-key last-writer-wins semantics. Timestamps come
/// from the injected clock so tests can pin them.
pub struct MemorySecretStore {
    store_id: String,
    clock: Arc<dyn Clock>,
    entries: DashMap<String, StoredSecret>,
}

impl MemorySecretStore {
    /// Create a store using the wall clock
    pub fn new(store_id: impl Into<String>) -> Self {
        Self::with_clock(store_id, Arc::new(SystemClock))
    }

    /// Create a store with an injected clock
    pub fn with_clock(store_id: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store_id: store_id.into(),
            clock,
            entries: DashMap::new(),
        }
    }

    /// Number of stored secrets
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove all secrets
    pub fn clear(&self) {
        self.entries.clear();
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    fn store_id(&self) -> &str {
        &self.store_id
    }

    async fn get_secret(&self, name: &str) -> Result<Option<SecretInfo>, StoreError> {
        Ok(self.entries.get(name).map(|entry| entry.info.clone()))
    }

    async fn get_secret_value(&self, name: &str) -> Result<Option<SecretValue>, StoreError> {
        Ok(self.entries.get(name).map(|entry| entry.value.clone()))
    }

    async fn update_secret(
        &self,
        name: &str,
        value: SecretValue,
        expires_on: Option<DateTime<Utc>>,
        content_type: &str,
    ) -> Result<SecretInfo, StoreError> {
        let now = self.clock.now();
        let version = Uuid::new_v4().simple().to_string();

        let info = match self.entries.entry(name.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(mut entry) => {
                let info = SecretInfo {
                    content_type: content_type.to_string(),
                    expires_on,
                    updated_on: now,
                    version: Some(version),
                    ..entry.get().info.clone()
                };
                entry.insert(StoredSecret {
                    value,
                    info: info.clone(),
                });
                info
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                let info = SecretInfo {
                    id: format!("{}/{}", self.store_id, name),
                    name: name.to_string(),
                    content_type: content_type.to_string(),
                    enabled: true,
                    created_on: now,
                    expires_on,
                    updated_on: now,
                    store_id: self.store_id.clone(),
                    version: Some(version),
                };
                entry.insert(StoredSecret {
                    value,
                    info: info.clone(),
                });
                info
            }
        };

        Ok(info)
    }
}
