use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use crate::cloud::{CloudClient, DatabaseServerDetails, StorageAccountKey};
use crate::core::{
    Clock, CloudError, DatabaseError, KeySlot, SecretInfo, SecretValue, StoreError,
};
use crate::database::{ConnectionTarget, DatabaseClient};
use crate::store::memory::MemorySecretStore;
use crate::store::SecretStore;

/// Mock secret store with call counters and failure injection.
///
/// Wraps the in-memory reference store; reads and writes behave identically
/// until a `fail_next_*` switch is armed.
pub struct MockSecretStore {
    inner: MemorySecretStore,
    fail_on_get: AtomicBool,
    fail_on_update: AtomicBool,
    get_count: AtomicU32,
    update_count: AtomicU32,
}

impl MockSecretStore {
    /// Create a mock store on the wall clock
    pub fn new(store_id: impl Into<String>) -> Self {
        Self::from_inner(MemorySecretStore::new(store_id))
    }

    /// Create a mock store with an injected clock
    pub fn with_clock(store_id: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self::from_inner(MemorySecretStore::with_clock(store_id, clock))
    }

    fn from_inner(inner: MemorySecretStore) -> Self {
        Self {
            inner,
            fail_on_get: AtomicBool::new(false),
            fail_on_update: AtomicBool::new(false),
            get_count: AtomicU32::new(0),
            update_count: AtomicU32::new(0),
        }
    }

    /// Make the next metadata or value read fail
    pub fn fail_next_get(&self) {
        self.fail_on_get.store(true, Ordering::SeqCst);
    }

    /// Make the next write fail
    pub fn fail_next_update(&self) {
        self.fail_on_update.store(true, Ordering::SeqCst);
    }

    /// Number of read operations observed
    pub fn get_count(&self) -> u32 {
        self.get_count.load(Ordering::SeqCst)
    }

    /// Number of write operations observed
    pub fn update_count(&self) -> u32 {
        self.update_count.load(Ordering::SeqCst)
    }

    /// Seed a secret directly, bypassing the counters
    pub async fn seed(
        &self,
        name: &str,
        value: impl Into<String>,
        expires_on: Option<DateTime<Utc>>,
        content_type: &str,
    ) -> SecretInfo {
        self.inner
            .update_secret(name, SecretValue::new(value.into()), expires_on, content_type)
            .await
            .expect("memory store writes are infallible")
    }
}

#[async_trait]
impl SecretStore for MockSecretStore {
    fn store_id(&self) -> &str {
        self.inner.store_id()
    }

    async fn get_secret(&self, name: &str) -> Result<Option<SecretInfo>, StoreError> {
        self.get_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_on_get.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Unavailable("mock failure".to_string()));
        }
        self.inner.get_secret(name).await
    }

    async fn get_secret_value(&self, name: &str) -> Result<Option<SecretValue>, StoreError> {
        self.get_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_on_get.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Unavailable("mock failure".to_string()));
        }
        self.inner.get_secret_value(name).await
    }

    async fn update_secret(
        &self,
        name: &str,
        value: SecretValue,
        expires_on: Option<DateTime<Utc>>,
        content_type: &str,
    ) -> Result<SecretInfo, StoreError> {
        self.update_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_on_update.swap(false, Ordering::SeqCst) {
            return Err(StoreError::write_failed(name, "mock failure"));
        }
        self.inner
            .update_secret(name, value, expires_on, content_type)
            .await
    }
}

/// Mock control-plane client with configurable servers, keys, and failures
pub struct MockCloudClient {
    servers: DashMap<String, DatabaseServerDetails>,
    keys: DashMap<String, Vec<StorageAccountKey>>,
    queued_regenerations: Mutex<Vec<StorageAccountKey>>,
    last_password: Mutex<Option<SecretValue>>,
    reject_password_update: AtomicBool,
    fail_next_regenerate: AtomicBool,
    list_count: AtomicU32,
    password_update_count: AtomicU32,
    regenerate_count: AtomicU32,
}

impl MockCloudClient {
    /// Create an empty mock
    pub fn new() -> Self {
        Self {
            servers: DashMap::new(),
            keys: DashMap::new(),
            queued_regenerations: Mutex::new(Vec::new()),
            last_password: Mutex::new(None),
            reject_password_update: AtomicBool::new(false),
            fail_next_regenerate: AtomicBool::new(false),
            list_count: AtomicU32::new(0),
            password_update_count: AtomicU32::new(0),
            regenerate_count: AtomicU32::new(0),
        }
    }

    /// Register a database server resource
    pub fn add_server(
        &self,
        resource_id: impl Into<String>,
        hostname: impl Into<String>,
        administrator_login: impl Into<String>,
    ) {
        self.servers.insert(
            resource_id.into(),
            DatabaseServerDetails {
                hostname: hostname.into(),
                administrator_login: administrator_login.into(),
            },
        );
    }

    /// Register a storage account resource with its current key values
    pub fn add_storage_account(
        &self,
        resource_id: impl Into<String>,
        key1: impl Into<String>,
        key2: impl Into<String>,
    ) {
        self.keys.insert(
            resource_id.into(),
            vec![
                StorageAccountKey {
                    name: "key1".to_string(),
                    value: SecretValue::new(key1.into()),
                },
                StorageAccountKey {
                    name: "key2".to_string(),
                    value: SecretValue::new(key2.into()),
                },
            ],
        );
    }

    /// Register a storage account exposing an arbitrary (possibly
    /// incomplete) key list
    pub fn set_storage_keys(&self, resource_id: impl Into<String>, keys: Vec<StorageAccountKey>) {
        self.keys.insert(resource_id.into(), keys);
    }

    /// Queue the key the next regenerate call returns, regardless of the
    /// requested slot
    pub fn queue_regenerated_key(&self, name: impl Into<String>, value: impl Into<String>) {
        self.queued_regenerations
            .lock()
            .expect("mock lock poisoned")
            .push(StorageAccountKey {
                name: name.into(),
                value: SecretValue::new(value.into()),
            });
    }

    /// Refuse subsequent administrator password updates
    pub fn reject_password_updates(&self) {
        self.reject_password_update.store(true, Ordering::SeqCst);
    }

    /// Make the next regenerate call report failure
    pub fn fail_next_regenerate(&self) {
        self.fail_next_regenerate.store(true, Ordering::SeqCst);
    }

    /// The most recent administrator password accepted
    pub fn last_password(&self) -> Option<SecretValue> {
        self.last_password
            .lock()
            .expect("mock lock poisoned")
            .clone()
    }

    /// Number of key-list calls observed
    pub fn list_count(&self) -> u32 {
        self.list_count.load(Ordering::SeqCst)
    }

    /// Number of password patches observed
    pub fn password_update_count(&self) -> u32 {
        self.password_update_count.load(Ordering::SeqCst)
    }

    /// Number of regenerate calls observed
    pub fn regenerate_count(&self) -> u32 {
        self.regenerate_count.load(Ordering::SeqCst)
    }
}

impl Default for MockCloudClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CloudClient for MockCloudClient {
    async fn database_server_details(
        &self,
        resource_id: &str,
    ) -> Result<Option<DatabaseServerDetails>, CloudError> {
        Ok(self.servers.get(resource_id).map(|entry| entry.clone()))
    }

    async fn update_database_admin_password(
        &self,
        resource_id: &str,
        password: &SecretValue,
    ) -> Result<bool, CloudError> {
        self.password_update_count.fetch_add(1, Ordering::SeqCst);

        if self.reject_password_update.load(Ordering::SeqCst) {
            return Ok(false);
        }
        if !self.servers.contains_key(resource_id) {
            return Ok(false);
        }

        *self.last_password.lock().expect("mock lock poisoned") = Some(password.clone());
        Ok(true)
    }

    async fn storage_account_keys(
        &self,
        resource_id: &str,
    ) -> Result<Vec<StorageAccountKey>, CloudError> {
        self.list_count.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .keys
            .get(resource_id)
            .map(|entry| entry.clone())
            .unwrap_or_default())
    }

    async fn regenerate_storage_account_key(
        &self,
        resource_id: &str,
        slot: KeySlot,
    ) -> Result<Option<StorageAccountKey>, CloudError> {
        let count = self.regenerate_count.fetch_add(1, Ordering::SeqCst);

        if self.fail_next_regenerate.swap(false, Ordering::SeqCst) {
            return Ok(None);
        }
        if !self.keys.contains_key(resource_id) {
            return Ok(None);
        }

        let queued = self
            .queued_regenerations
            .lock()
            .expect("mock lock poisoned")
            .pop();
        let regenerated = queued.unwrap_or_else(|| StorageAccountKey {
            name: slot.as_str().to_string(),
            value: SecretValue::new(format!("{slot}-regenerated-{count}")),
        });

        if let Some(mut keys) = self.keys.get_mut(resource_id) {
            if let Some(existing) = keys.iter_mut().find(|key| key.name == regenerated.name) {
                existing.value = regenerated.value.clone();
            }
        }

        Ok(Some(regenerated))
    }
}

/// Mock database client recording every statement
pub struct MockDatabaseClient {
    statements: Mutex<Vec<String>>,
    connections: Mutex<Vec<String>>,
    fail_on_connect: AtomicBool,
    fail_on_execute: AtomicBool,
    verify_count: AtomicU32,
    execute_count: AtomicU32,
}

impl MockDatabaseClient {
    /// Create an empty mock
    pub fn new() -> Self {
        Self {
            statements: Mutex::new(Vec::new()),
            connections: Mutex::new(Vec::new()),
            fail_on_connect: AtomicBool::new(false),
            fail_on_execute: AtomicBool::new(false),
            verify_count: AtomicU32::new(0),
            execute_count: AtomicU32::new(0),
        }
    }

    /// Make the next connection attempt fail
    pub fn fail_next_connect(&self) {
        self.fail_on_connect.store(true, Ordering::SeqCst);
    }

    /// Make the next statement execution fail
    pub fn fail_next_execute(&self) {
        self.fail_on_execute.store(true, Ordering::SeqCst);
    }

    /// Every statement executed so far
    pub fn statements(&self) -> Vec<String> {
        self.statements.lock().expect("mock lock poisoned").clone()
    }

    /// `user@hostname` for every session opened so far
    pub fn connections(&self) -> Vec<String> {
        self.connections.lock().expect("mock lock poisoned").clone()
    }

    /// Number of connectivity checks observed
    pub fn verify_count(&self) -> u32 {
        self.verify_count.load(Ordering::SeqCst)
    }

    /// Number of statements executed
    pub fn execute_count(&self) -> u32 {
        self.execute_count.load(Ordering::SeqCst)
    }

    fn record_connection(&self, target: &ConnectionTarget) -> Result<(), DatabaseError> {
        if self.fail_on_connect.swap(false, Ordering::SeqCst) {
            return Err(DatabaseError::ConnectionFailed {
                hostname: target.hostname.clone(),
                reason: "mock failure".to_string(),
            });
        }
        self.connections
            .lock()
            .expect("mock lock poisoned")
            .push(format!("{}@{}", target.username, target.hostname));
        Ok(())
    }
}

impl Default for MockDatabaseClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    async fn verify_connectivity(&self, target: &ConnectionTarget) -> Result<(), DatabaseError> {
        self.verify_count.fetch_add(1, Ordering::SeqCst);
        self.record_connection(target)
    }

    async fn execute(
        &self,
        target: &ConnectionTarget,
        statement: &str,
    ) -> Result<(), DatabaseError> {
        self.execute_count.fetch_add(1, Ordering::SeqCst);
        self.record_connection(target)?;

        if self.fail_on_execute.swap(false, Ordering::SeqCst) {
            return Err(DatabaseError::StatementFailed("mock failure".to_string()));
        }

        self.statements
            .lock()
            .expect("mock lock poisoned")
            .push(statement.to_string());
        Ok(())
    }
}
