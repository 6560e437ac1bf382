//! Key-vault REST adapter
//!
//! Speaks the vault's secrets API with bearer-token authentication. Reads
//! rely on the vault's strong-read guarantee; a `get_secret` after a
//! successful `update_secret` observes the new version.

#![cfg(feature = "key-vault")]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{SecretInfo, SecretValue, StoreError};

use super::SecretStore;

const API_VERSION: &str = "7.4";

/// Secret store backed by a key vault's REST API
pub struct KeyVaultSecretStore {
    vault_url: String,
    store_id: String,
    token: SecretValue,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct SecretBundle {
    id: String,
    value: Option<String>,
    #[serde(rename = "contentType", default)]
    content_type: Option<String>,
    attributes: SecretAttributes,
}

#[derive(Deserialize)]
struct SecretAttributes {
    #[serde(default)]
    enabled: bool,
    created: i64,
    updated: i64,
    #[serde(default)]
    exp: Option<i64>,
}

#[derive(Serialize)]
struct SetSecretRequest<'a> {
    value: &'a str,
    #[serde(rename = "contentType")]
    content_type: &'a str,
    attributes: SetSecretAttributes,
}

#[derive(Serialize)]
struct SetSecretAttributes {
    enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    exp: Option<i64>,
}

impl KeyVaultSecretStore {
    /// Create an adapter for one vault.
    ///
    /// `vault_url` is the vault base URL without a trailing slash; `token`
    /// is a bearer token scoped to the vault's data plane.
    pub fn new(
        vault_url: impl Into<String>,
        store_id: impl Into<String>,
        token: SecretValue,
    ) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(Self {
            vault_url: vault_url.into(),
            store_id: store_id.into(),
            token,
            http,
        })
    }

    fn secret_url(&self, name: &str) -> String {
        format!(
            "{}/secrets/{}?api-version={}",
            self.vault_url, name, API_VERSION
        )
    }

    async fn fetch_bundle(&self, name: &str) -> Result<Option<SecretBundle>, StoreError> {
        let response = self
            .http
            .get(self.secret_url(name))
            .bearer_auth(self.token.expose())
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => {
                Err(StoreError::AccessDenied(format!("GET {name}")))
            }
            status if status.is_success() => {
                let bundle = response
                    .json::<SecretBundle>()
                    .await
                    .map_err(|e| StoreError::MalformedResponse(e.to_string()))?;
                Ok(Some(bundle))
            }
            status => Err(StoreError::Unavailable(format!(
                "GET {name} returned {status}"
            ))),
        }
    }

    fn bundle_to_info(&self, name: &str, bundle: &SecretBundle) -> SecretInfo {
        // Version is the trailing path segment of the bundle id.
        let version = bundle
            .id
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .map(str::to_string);

        SecretInfo {
            id: bundle.id.clone(),
            name: name.to_string(),
            content_type: bundle.content_type.clone().unwrap_or_default(),
            enabled: bundle.attributes.enabled,
            created_on: epoch_to_datetime(bundle.attributes.created),
            expires_on: bundle.attributes.exp.map(epoch_to_datetime),
            updated_on: epoch_to_datetime(bundle.attributes.updated),
            store_id: self.store_id.clone(),
            version,
        }
    }
}

fn epoch_to_datetime(epoch: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(epoch, 0).single().unwrap_or_default()
}

#[async_trait]
impl SecretStore for KeyVaultSecretStore {
    fn store_id(&self) -> &str {
        &self.store_id
    }

    async fn get_secret(&self, name: &str) -> Result<Option<SecretInfo>, StoreError> {
        debug!(secret = %name, store = %self.store_id, "Fetching secret metadata");
        let bundle = self.fetch_bundle(name).await?;
        Ok(bundle.map(|bundle| self.bundle_to_info(name, &bundle)))
    }

    async fn get_secret_value(&self, name: &str) -> Result<Option<SecretValue>, StoreError> {
        let bundle = self.fetch_bundle(name).await?;
        Ok(bundle.and_then(|bundle| bundle.value.map(SecretValue::new)))
    }

    async fn update_secret(
        &self,
        name: &str,
        value: SecretValue,
        expires_on: Option<DateTime<Utc>>,
        content_type: &str,
    ) -> Result<SecretInfo, StoreError> {
        debug!(secret = %name, store = %self.store_id, "Writing secret");

        let body = SetSecretRequest {
            value: value.expose(),
            content_type,
            attributes: SetSecretAttributes {
                enabled: true,
                exp: expires_on.map(|expires_on| expires_on.timestamp()),
            },
        };

        let response = self
            .http
            .put(self.secret_url(name))
            .bearer_auth(self.token.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::write_failed(name, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::write_failed(
                name,
                format!("PUT returned {status}"),
            ));
        }

        let bundle = response
            .json::<SecretBundle>()
            .await
            .map_err(|e| StoreError::MalformedResponse(e.to_string()))?;

        Ok(self.bundle_to_info(name, &bundle))
    }
}
