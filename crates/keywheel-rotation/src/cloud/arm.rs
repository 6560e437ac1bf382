//! Resource-manager REST adapter
//!
//! Maps the [`CloudClient`] operations onto the provider's management API
//! with bearer-token authentication. Long-running password patches are
//! polled to completion via the async-operation header.

#![cfg(feature = "azure")]

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

use crate::core::{CloudError, KeySlot, SecretValue};

use super::{CloudClient, DatabaseServerDetails, StorageAccountKey};

const SERVER_API_VERSION: &str = "2023-06-01-preview";
const STORAGE_API_VERSION: &str = "2023-01-01";
const POLL_INTERVAL: Duration = Duration::from_secs(5);
const POLL_ATTEMPTS: u32 = 60;

/// Cloud client backed by the resource-manager REST API
pub struct ArmCloudClient {
    management_url: String,
    token: SecretValue,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct ServerResource {
    properties: ServerProperties,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerProperties {
    fully_qualified_domain_name: String,
    administrator_login: String,
}

#[derive(Deserialize)]
struct KeyList {
    keys: Vec<KeyEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyEntry {
    key_name: String,
    value: String,
}

#[derive(Deserialize)]
struct OperationStatus {
    status: String,
}

impl ArmCloudClient {
    /// Create a client against the default management endpoint
    pub fn new(token: SecretValue) -> Result<Self, CloudError> {
        Self::with_management_url("https://management.azure.com", token)
    }

    /// Create a client against a specific management endpoint
    pub fn with_management_url(
        management_url: impl Into<String>,
        token: SecretValue,
    ) -> Result<Self, CloudError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| CloudError::Unavailable(e.to_string()))?;

        Ok(Self {
            management_url: management_url.into(),
            token,
            http,
        })
    }

    fn resource_url(&self, resource_id: &str, suffix: &str, api_version: &str) -> String {
        format!(
            "{}{}{}?api-version={}",
            self.management_url, resource_id, suffix, api_version
        )
    }

    /// Follow the async-operation URL until it reports a terminal status
    async fn wait_for_completion(&self, operation_url: &str) -> Result<bool, CloudError> {
        for _ in 0..POLL_ATTEMPTS {
            tokio::time::sleep(POLL_INTERVAL).await;

            let response = self
                .http
                .get(operation_url)
                .bearer_auth(self.token.expose())
                .send()
                .await
                .map_err(|e| CloudError::Unavailable(e.to_string()))?;

            if !response.status().is_success() {
                return Ok(false);
            }

            let status = response
                .json::<OperationStatus>()
                .await
                .map_err(|e| CloudError::MalformedResponse(e.to_string()))?;

            match status.status.as_str() {
                "Succeeded" => return Ok(true),
                "Failed" | "Canceled" => return Ok(false),
                _ => continue,
            }
        }

        warn!(operation = %operation_url, "Async operation did not settle; treating as failed");
        Ok(false)
    }
}

#[async_trait]
impl CloudClient for ArmCloudClient {
    async fn database_server_details(
        &self,
        resource_id: &str,
    ) -> Result<Option<DatabaseServerDetails>, CloudError> {
        debug!(resource = %resource_id, "Fetching database server details");

        let response = self
            .http
            .get(self.resource_url(resource_id, "", SERVER_API_VERSION))
            .bearer_auth(self.token.expose())
            .send()
            .await
            .map_err(|e| CloudError::Unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => Ok(None),
            status if status.is_success() => {
                let server = response
                    .json::<ServerResource>()
                    .await
                    .map_err(|e| CloudError::MalformedResponse(e.to_string()))?;

                Ok(Some(DatabaseServerDetails {
                    hostname: server.properties.fully_qualified_domain_name,
                    administrator_login: server.properties.administrator_login,
                }))
            }
            status => Err(CloudError::Unavailable(format!(
                "GET {resource_id} returned {status}"
            ))),
        }
    }

    async fn update_database_admin_password(
        &self,
        resource_id: &str,
        password: &SecretValue,
    ) -> Result<bool, CloudError> {
        debug!(resource = %resource_id, "Patching administrator password");

        let body = json!({
            "properties": { "administratorLoginPassword": password.expose() }
        });

        let response = self
            .http
            .patch(self.resource_url(resource_id, "", SERVER_API_VERSION))
            .bearer_auth(self.token.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| CloudError::Unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::ACCEPTED => {
                let Some(operation_url) = response
                    .headers()
                    .get("azure-asyncoperation")
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_string)
                else {
                    return Ok(false);
                };
                self.wait_for_completion(&operation_url).await
            }
            _ => Ok(false),
        }
    }

    async fn storage_account_keys(
        &self,
        resource_id: &str,
    ) -> Result<Vec<StorageAccountKey>, CloudError> {
        let response = self
            .http
            .post(self.resource_url(resource_id, "/listKeys", STORAGE_API_VERSION))
            .bearer_auth(self.token.expose())
            .send()
            .await
            .map_err(|e| CloudError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Ok(Vec::new());
        }

        let list = response
            .json::<KeyList>()
            .await
            .map_err(|e| CloudError::MalformedResponse(e.to_string()))?;

        Ok(list
            .keys
            .into_iter()
            .map(|entry| StorageAccountKey {
                name: entry.key_name,
                value: SecretValue::new(entry.value),
            })
            .collect())
    }

    async fn regenerate_storage_account_key(
        &self,
        resource_id: &str,
        slot: KeySlot,
    ) -> Result<Option<StorageAccountKey>, CloudError> {
        debug!(resource = %resource_id, slot = %slot, "Regenerating storage account key");

        let body = json!({ "keyName": slot.as_str() });

        let response = self
            .http
            .post(self.resource_url(resource_id, "/regenerateKey", STORAGE_API_VERSION))
            .bearer_auth(self.token.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| CloudError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Ok(None);
        }

        let list = response
            .json::<KeyList>()
            .await
            .map_err(|e| CloudError::MalformedResponse(e.to_string()))?;

        Ok(list
            .keys
            .into_iter()
            .find(|entry| entry.key_name == slot.as_str())
            .map(|entry| StorageAccountKey {
                name: entry.key_name,
                value: SecretValue::new(entry.value),
            }))
    }
}
