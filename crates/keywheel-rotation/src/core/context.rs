use std::collections::HashMap;
use std::sync::Arc;

use crate::store::SecretStore;

use super::value::SecretValue;

/// Immutable per-run state shared by all rotations in one driver run.
///
/// The strategy registry is held separately by the driver; this context
/// carries only the store map and the named cloud credentials. Mutable
/// per-invocation switches live in [`RotationFlags`].
#[derive(Default)]
pub struct OperationContext {
    stores: HashMap<String, Arc<dyn SecretStore>>,
    cloud_credentials: HashMap<String, SecretValue>,
}

impl OperationContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named secret store
    #[must_use]
    pub fn with_store(mut self, name: impl Into<String>, store: Arc<dyn SecretStore>) -> Self {
        self.stores.insert(name.into(), store);
        self
    }

    /// Add a named opaque cloud credential
    #[must_use]
    pub fn with_cloud_credential(
        mut self,
        name: impl Into<String>,
        credential: SecretValue,
    ) -> Self {
        self.cloud_credentials.insert(name.into(), credential);
        self
    }

    /// Resolve a store by the name a resource configuration refers to
    pub fn store(&self, name: &str) -> Option<Arc<dyn SecretStore>> {
        self.stores.get(name).cloned()
    }

    /// Resolve a cloud credential by name
    pub fn cloud_credential(&self, name: &str) -> Option<&SecretValue> {
        self.cloud_credentials.get(name)
    }

    /// Names of all configured stores
    pub fn store_names(&self) -> Vec<&str> {
        self.stores.keys().map(String::as_str).collect()
    }
}

/// Per-invocation switches, set once by the driver before dispatch
#[derive(Clone, Default)]
pub struct RotationFlags {
    /// Bypass the expiration check
    pub force: bool,

    /// Simulate: report success but perform no mutations
    pub what_if: bool,

    /// Operator-supplied value consumed by the manual strategy
    pub secret_value: Option<SecretValue>,
}

impl RotationFlags {
    /// Flags with everything off
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable the force switch
    #[must_use]
    pub fn force(mut self) -> Self {
        self.force = true;
        self
    }

    /// Enable what-if simulation
    #[must_use]
    pub fn what_if(mut self) -> Self {
        self.what_if = true;
        self
    }

    /// Provide the operator-supplied value for the manual strategy
    #[must_use]
    pub fn with_secret_value(mut self, value: SecretValue) -> Self {
        self.secret_value = Some(value);
        self
    }
}
