use thiserror::Error;

/// Error raised by secret-store adapters
#[derive(Error, Debug)]
pub enum StoreError {
    /// Transport-level failure talking to the store
    #[error("Secret store unreachable: {0}")]
    Unavailable(String),

    /// The store rejected the caller's credentials
    #[error("Secret store denied access: {0}")]
    AccessDenied(String),

    /// Write was rejected or did not complete
    #[error("Secret store write failed for '{name}': {reason}")]
    WriteFailed {
        /// Secret name
        name: String,
        /// The failure reason
        reason: String,
    },

    /// The store returned a response the adapter could not interpret
    #[error("Malformed secret store response: {0}")]
    MalformedResponse(String),
}

impl StoreError {
    /// Create a new "write failed" error
    pub fn write_failed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::WriteFailed {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Error raised by cloud control-plane adapters
#[derive(Error, Debug)]
pub enum CloudError {
    /// Transport-level failure talking to the control plane
    #[error("Control plane unreachable: {0}")]
    Unavailable(String),

    /// The control plane returned a response the adapter could not interpret
    #[error("Malformed control plane response: {0}")]
    MalformedResponse(String),
}

/// Error raised by database clients
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Connection to the database endpoint failed
    #[error("Database connection to '{hostname}' failed: {reason}")]
    ConnectionFailed {
        /// Target endpoint
        hostname: String,
        /// The failure reason
        reason: String,
    },

    /// The server rejected the statement
    #[error("Database statement failed: {0}")]
    StatementFailed(String),
}

/// Main error type for rotation strategies.
///
/// Every variant is an expected condition: the rotator base converts these
/// into [`RotationResult`](crate::core::RotationResult) verdicts rather than
/// propagating them. Only programmer errors (contract violations) and OS-RNG
/// failure escape as panics.
#[derive(Error, Debug)]
pub enum RotationError {
    /// The resource configuration violates a structural constraint
    #[error("Invalid resource configuration: {reason}")]
    InvalidConfiguration {
        /// The constraint violated
        reason: String,
    },

    /// Strategy requires a backing cloud resource but none is configured
    #[error("No target resource id configured for '{name}'")]
    MissingTargetResource {
        /// Resource name
        name: String,
    },

    /// Strategy requires database-user settings but none are configured
    #[error("No database user settings configured for '{name}'")]
    MissingDatabaseUser {
        /// Resource name
        name: String,
    },

    /// A configured store name does not resolve to a store instance
    #[error("Secret store '{store_name}' is not configured")]
    StoreNotConfigured {
        /// Store name from the resource configuration
        store_name: String,
    },

    /// A role identifier failed validation
    #[error("Invalid role identifier '{role}'")]
    InvalidRole {
        /// The offending role
        role: String,
    },

    /// The administrator credential secret is absent from the store
    #[error("Administrator credential secret '{secret_name}' not found")]
    AdminSecretMissing {
        /// Name of the secret expected to hold the credential
        secret_name: String,
    },

    /// The administrator credential secret did not parse as a credential record
    #[error("Administrator credential secret '{secret_name}' is malformed: {reason}")]
    AdminSecretMalformed {
        /// Name of the secret
        secret_name: String,
        /// Parse failure
        reason: String,
    },

    /// The stored secret value required by the strategy is absent
    #[error("Stored secret value for '{name}' not found")]
    StoredSecretMissing {
        /// Secret name
        name: String,
    },

    /// The stored secret value did not parse; the strategy refuses to guess
    #[error("Stored secret value for '{name}' is malformed, refusing to guess the active key: {reason}")]
    StoredSecretMalformed {
        /// Secret name
        name: String,
        /// Parse failure
        reason: String,
    },

    /// The control plane could not find the database server
    #[error("Database server '{resource_id}' not found or not accessible")]
    ServerNotFound {
        /// Backing resource id
        resource_id: String,
    },

    /// The control plane refused the administrator password update
    #[error("Control plane rejected the administrator password update for '{resource_id}'")]
    ControlPlaneRejected {
        /// Backing resource id
        resource_id: String,
    },

    /// The storage account did not expose both named keys
    #[error("Storage account '{resource_id}' did not return both 'key1' and 'key2'")]
    KeyPairIncomplete {
        /// Backing resource id
        resource_id: String,
    },

    /// Regeneration did not return the requested key
    #[error("Regeneration of '{slot}' for '{resource_id}' returned no matching key")]
    KeyNotReturned {
        /// Requested key name
        slot: String,
        /// Backing resource id
        resource_id: String,
    },

    /// Cancellation observed before the first external mutation
    #[error("Rotation of '{name}' cancelled before any mutation")]
    Cancelled {
        /// Resource name
        name: String,
    },

    /// Secret-store failure before any external mutation; safe to retry
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Control-plane failure before the store was touched; safe to retry
    #[error(transparent)]
    Cloud(#[from] CloudError),

    /// Database failure before the store was touched; safe to retry
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// Payload (de)serialization failure
    #[error("Credential payload serialization failed: {0}")]
    Serialization(String),

    /// The dangerous case: the backing resource accepted the new credential
    /// but the secret-store write failed afterwards. The stored secret no
    /// longer matches the live credential.
    #[error("Secret store update for '{name}' failed after the backing resource accepted the new credential; re-initialization will be required to recover: {reason}")]
    RecoveryRequired {
        /// Resource name
        name: String,
        /// The store failure
        reason: String,
    },
}

impl RotationError {
    /// Create a new "invalid role" error
    pub fn invalid_role(role: impl Into<String>) -> Self {
        Self::InvalidRole { role: role.into() }
    }

    /// Create a new "recovery required" error from a store failure observed
    /// after the external mutation succeeded
    pub fn recovery_required(name: impl Into<String>, cause: &StoreError) -> Self {
        Self::RecoveryRequired {
            name: name.into(),
            reason: cause.to_string(),
        }
    }

    /// Whether this verdict requires operator action outside the normal loop
    pub fn needs_operator_action(&self) -> bool {
        matches!(self, Self::RecoveryRequired { .. })
    }

    /// Get the error category for logging/metrics
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration { .. }
            | Self::MissingTargetResource { .. }
            | Self::MissingDatabaseUser { .. }
            | Self::StoreNotConfigured { .. }
            | Self::InvalidRole { .. }
            | Self::AdminSecretMissing { .. }
            | Self::AdminSecretMalformed { .. }
            | Self::StoredSecretMissing { .. }
            | Self::StoredSecretMalformed { .. } => "configuration",
            Self::ServerNotFound { .. } | Self::KeyPairIncomplete { .. } => "external_read",
            Self::ControlPlaneRejected { .. } | Self::KeyNotReturned { .. } => "external_write",
            Self::Cancelled { .. } => "cancelled",
            Self::Store(_) => "store",
            Self::Cloud(_) => "cloud",
            Self::Database(_) => "database",
            Self::Serialization(_) => "serialization",
            Self::RecoveryRequired { .. } => "recovery_required",
        }
    }
}

impl From<serde_json::Error> for RotationError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

/// Result type alias for strategy routines
pub type Result<T> = std::result::Result<T, RotationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_role_message() {
        let err = RotationError::invalid_role("bad name");
        assert!(err.to_string().contains("Invalid role"));
        assert!(err.to_string().contains("bad name"));
        assert_eq!(err.category(), "configuration");
    }

    #[test]
    fn test_recovery_required_message_names_reinitialization() {
        let cause = StoreError::write_failed("s1", "connection reset");
        let err = RotationError::recovery_required("s1", &cause);
        assert!(err.to_string().contains("re-initialization will be required"));
        assert!(err.needs_operator_action());
        assert_eq!(err.category(), "recovery_required");
    }

    #[test]
    fn test_store_error_is_transparent() {
        let err: RotationError = StoreError::Unavailable("timeout".into()).into();
        assert_eq!(err.to_string(), "Secret store unreachable: timeout");
        assert!(!err.needs_operator_action());
    }

    #[test]
    fn test_categories() {
        assert_eq!(
            RotationError::ServerNotFound {
                resource_id: "r".into()
            }
            .category(),
            "external_read"
        );
        assert_eq!(
            RotationError::ControlPlaneRejected {
                resource_id: "r".into()
            }
            .category(),
            "external_write"
        );
        assert_eq!(
            RotationError::Cancelled { name: "s".into() }.category(),
            "cancelled"
        );
    }
}
