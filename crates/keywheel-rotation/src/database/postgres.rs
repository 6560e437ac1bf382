//! PostgreSQL client implementation
//!
//! This module is only available with the `postgres` feature.

#![cfg(feature = "postgres")]

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgSslMode};
use sqlx::{ConnectOptions, Connection, Executor};
use tracing::debug;

use crate::core::DatabaseError;

use super::{ConnectionTarget, DatabaseClient};

/// PostgreSQL implementation of [`DatabaseClient`].
///
/// Opens one TLS-required connection per call against the maintenance
/// database; rotation executes exactly one statement per invocation.
pub struct PostgresDatabaseClient {
    database: String,
}

impl PostgresDatabaseClient {
    /// Create a client connecting to the `postgres` maintenance database
    pub fn new() -> Self {
        Self {
            database: "postgres".to_string(),
        }
    }

    /// Create a client connecting to a specific database
    pub fn with_database(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
        }
    }

    async fn connect(&self, target: &ConnectionTarget) -> Result<PgConnection, DatabaseError> {
        let options = PgConnectOptions::new()
            .host(&target.hostname)
            .username(&target.username)
            .password(target.password.expose())
            .database(&self.database)
            .ssl_mode(PgSslMode::Require);

        options
            .connect()
            .await
            .map_err(|e| DatabaseError::ConnectionFailed {
                hostname: target.hostname.clone(),
                reason: e.to_string(),
            })
    }
}

impl Default for PostgresDatabaseClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseClient for PostgresDatabaseClient {
    async fn verify_connectivity(&self, target: &ConnectionTarget) -> Result<(), DatabaseError> {
        debug!(hostname = %target.hostname, "Verifying database connectivity");
        let mut connection = self.connect(target).await?;
        connection
            .close()
            .await
            .map_err(|e| DatabaseError::ConnectionFailed {
                hostname: target.hostname.clone(),
                reason: e.to_string(),
            })
    }

    async fn execute(
        &self,
        target: &ConnectionTarget,
        statement: &str,
    ) -> Result<(), DatabaseError> {
        let mut connection = self.connect(target).await?;

        connection
            .execute(statement)
            .await
            .map_err(|e| DatabaseError::StatementFailed(e.to_string()))?;

        connection
            .close()
            .await
            .map_err(|e| DatabaseError::ConnectionFailed {
                hostname: target.hostname.clone(),
                reason: e.to_string(),
            })
    }
}
