//! Persisted credential payload formats
//!
//! Database-backed strategies persist small JSON records into the secret
//! store. Field names are lowercase and serialization is compact (no
//! surrounding whitespace), matching what downstream consumers parse.

use serde::{Deserialize, Serialize};

use super::value::SecretValue;

/// Content type for JSON credential payloads
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Content type for raw string secrets
pub const CONTENT_TYPE_TEXT: &str = "text/plain";

/// Credential for a database login, administrator or per-application user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseCredential {
    /// DNS name of the database endpoint
    pub hostname: String,
    /// Login name
    pub username: String,
    /// Login password
    pub password: SecretValue,
}

/// One of the two named storage account key slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeySlot {
    /// The slot named `key1`
    #[serde(rename = "key1")]
    Key1,
    /// The slot named `key2`
    #[serde(rename = "key2")]
    Key2,
}

impl KeySlot {
    /// The opposite slot; rotation alternates between the two
    pub const fn other(self) -> Self {
        match self {
            KeySlot::Key1 => KeySlot::Key2,
            KeySlot::Key2 => KeySlot::Key1,
        }
    }

    /// Wire name of the slot
    pub const fn as_str(self) -> &'static str {
        match self {
            KeySlot::Key1 => "key1",
            KeySlot::Key2 => "key2",
        }
    }
}

impl std::fmt::Display for KeySlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Currently-active storage account key as persisted in the store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageKeyCredential {
    /// Which slot holds the active key
    pub name: KeySlot,
    /// The key material
    pub value: SecretValue,
}

impl DatabaseCredential {
    /// Serialize to the compact persisted form
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse the persisted form
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

impl StorageKeyCredential {
    /// Serialize to the compact persisted form
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse the persisted form
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
