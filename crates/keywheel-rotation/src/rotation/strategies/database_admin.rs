//! Database administrator strategy
//!
//! Patches the server's administrator password through the control plane,
//! then persists the credential record. No overlap: the previous password
//! stops working the moment the patch lands.

use async_trait::async_trait;
use std::sync::Arc;

use crate::cloud::CloudClient;
use crate::core::{
    CancellationToken, Clock, DatabaseCredential, ResourceConfig, Result, RotationError,
    RotationFlags, SecretValue, CONTENT_TYPE_JSON,
};
use crate::rotation::rotator::RotationStrategy;
use crate::store::SecretStore;
use crate::utils::generate_password;

/// Strategy tag for the administrator rotator
pub const DATABASE_ADMIN_STRATEGY: &str = "azure/postgresql/flexible-server/administrator";

const ADMIN_PASSWORD_LENGTH: usize = 16;

/// Rotates a managed database server's administrator password
pub struct DatabaseAdminRotator {
    cloud: Arc<dyn CloudClient>,
    clock: Arc<dyn Clock>,
}

impl DatabaseAdminRotator {
    /// Create the strategy with its control-plane client and clock
    pub fn new(cloud: Arc<dyn CloudClient>, clock: Arc<dyn Clock>) -> Self {
        Self { cloud, clock }
    }
}

#[async_trait]
impl RotationStrategy for DatabaseAdminRotator {
    fn strategy_type(&self) -> &'static str {
        DATABASE_ADMIN_STRATEGY
    }

    async fn perform_rotation(
        &self,
        resource: &ResourceConfig,
        store: &dyn SecretStore,
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

        let details = self
            .cloud
            .database_server_details(resource_id)
            .await?
            .ok_or_else(|| RotationError::ServerNotFound {
                resource_id: resource_id.to_string(),
            })?;

        let password = SecretValue::new(generate_password(ADMIN_PASSWORD_LENGTH));

        if flags.what_if {
            return Ok(format!(
                "Would have rotated the administrator password for '{resource_id}'"
            ));
        }

        if token.is_cancelled() {
            return Err(RotationError::Cancelled {
                name: resource.name.clone(),
            });
        }

        let accepted = self
            .cloud
            .update_database_admin_password(resource_id, &password)
            .await?;
        if !accepted {
            return Err(RotationError::ControlPlaneRejected {
                resource_id: resource_id.to_string(),
            });
        }

        // The server mutation has landed; from here on a store failure
        // leaves the stored credential stale.
        let credential = DatabaseCredential {
            hostname: details.hostname,
            username: details.administrator_login,
            password,
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
            "Rotated the administrator password for '{resource_id}'; credential expires {expires_on}"
        ))
    }
}
