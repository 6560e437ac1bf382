//! Database user strategy
//!
//! Provisions a fresh login on each rotation instead of mutating the
//! existing one. The previous user keeps working until the server's
//! `VALID UNTIL` retires it, which is what gives callers their grace
//! window.

use async_trait::async_trait;
use std::sync::Arc;

use crate::core::{
    CancellationToken, Clock, DatabaseCredential, ResourceConfig, Result, RotationError,
    RotationFlags, SecretValue, CONTENT_TYPE_JSON,
};
use crate::database::{
    create_user_statement, is_valid_identifier, ConnectionTarget, DatabaseClient,
};
use crate::rotation::rotator::RotationStrategy;
use crate::store::SecretStore;
use crate::utils::{generate_password, generate_username};

/// Strategy tag for the database-user rotator
pub const DATABASE_USER_STRATEGY: &str = "database/postgresql/user";

const USERNAME_LENGTH: usize = 16;
const USER_PASSWORD_LENGTH: usize = 24;

/// Creates expiring per-application database users
pub struct DatabaseUserRotator {
    database: Arc<dyn DatabaseClient>,
    clock: Arc<dyn Clock>,
}

impl DatabaseUserRotator {
    /// Create the strategy with its database client and clock
    pub fn new(database: Arc<dyn DatabaseClient>, clock: Arc<dyn Clock>) -> Self {
        Self { database, clock }
    }

    async fn admin_credential(
        &self,
        store: &dyn SecretStore,
        server_secret_name: &str,
    ) -> Result<DatabaseCredential> {
        let raw = store
            .get_secret_value(server_secret_name)
            .await?
            .ok_or_else(|| RotationError::AdminSecretMissing {
                secret_name: server_secret_name.to_string(),
            })?;

        DatabaseCredential::from_json(raw.expose()).map_err(|error| {
            RotationError::AdminSecretMalformed {
                secret_name: server_secret_name.to_string(),
                reason: error.to_string(),
            }
        })
    }
}

#[async_trait]
impl RotationStrategy for DatabaseUserRotator {
    fn strategy_type(&self) -> &'static str {
        DATABASE_USER_STRATEGY
    }

    async fn perform_rotation(
        &self,
        resource: &ResourceConfig,
        store: &dyn SecretStore,
        flags: &RotationFlags,
        token: &CancellationToken,
    ) -> Result<String> {
        let user_config =
            resource
                .database_user
                .as_ref()
                .ok_or(RotationError::MissingDatabaseUser {
                    name: resource.name.clone(),
                })?;

        for role in &user_config.roles {
            if !is_valid_identifier(role) {
                return Err(RotationError::invalid_role(role));
            }
        }

        let admin = self
            .admin_credential(store, &user_config.server_secret_name)
            .await?;

        let target = ConnectionTarget {
            hostname: user_config.hostname.clone(),
            username: admin.username,
            password: admin.password,
        };

        if flags.what_if {
            self.database.verify_connectivity(&target).await?;
            return Ok(format!(
                "Would have created a new database user on '{}'",
                user_config.hostname
            ));
        }

        if token.is_cancelled() {
            return Err(RotationError::Cancelled {
                name: resource.name.clone(),
            });
        }

        let username = generate_username(&user_config.name_prefix, USERNAME_LENGTH);
        let password = SecretValue::new(generate_password(USER_PASSWORD_LENGTH));
        let expires_on = resource.expiration_from(self.clock.now());

        let statement =
            create_user_statement(&username, &password, &user_config.roles, expires_on);
        self.database.execute(&target, &statement).await?;

        // The user now exists server-side; a store failure from here on
        // requires operator recovery.
        let credential = DatabaseCredential {
            hostname: user_config.hostname.clone(),
            username: username.clone(),
            password,
        };
        let payload = credential.to_json()?;

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
            "Created database user '{username}' on '{}'; valid until {expires_on}",
            user_config.hostname
        ))
    }
}
