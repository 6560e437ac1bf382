use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::RotationError;
use super::time::days_duration;

fn default_expiration_days() -> f64 {
    90.0
}

fn default_content_type() -> String {
    super::payload::CONTENT_TYPE_TEXT.to_string()
}

fn default_name_prefix() -> String {
    "u".to_string()
}

/// Declarative description of one managed credential.
///
/// Immutable for the duration of a process; the driver deserializes these
/// from its configuration source and hands them to the registry unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Identifier of the secret within its store
    pub name: String,

    /// Tag selecting the rotation strategy
    pub strategy_type: String,

    /// Name of the target secret store in the context's store map
    pub store_name: String,

    /// Lifetime applied to a newly written secret, in 24-hour units
    #[serde(default = "default_expiration_days")]
    pub expiration_days: f64,

    /// Days before true expiration at which early rotation becomes eligible
    #[serde(default)]
    pub expiration_overlap_days: f64,

    /// MIME label stored alongside the value
    #[serde(default = "default_content_type")]
    pub content_type: String,

    /// Opaque identifier of the backing cloud resource, when one exists
    #[serde(default)]
    pub target_resource_id: Option<String>,

    /// Settings for the database-user strategy
    #[serde(default)]
    pub database_user: Option<DatabaseUserConfig>,
}

/// Settings consumed by the database-user strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseUserConfig {
    /// Prefix for generated usernames
    #[serde(default = "default_name_prefix")]
    pub name_prefix: String,

    /// Roles granted to the generated user, possibly empty
    #[serde(default)]
    pub roles: Vec<String>,

    /// Name of the secret, in the same store, holding the administrator
    /// credential as JSON
    pub server_secret_name: String,

    /// DNS name of the database endpoint
    pub hostname: String,
}

impl ResourceConfig {
    /// Expiration instant for a secret written now
    pub fn expiration_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + days_duration(self.expiration_days)
    }

    /// Check structural constraints the rest of the engine assumes.
    ///
    /// Drivers call this once at load time; strategies assume it passed.
    pub fn validate(&self) -> Result<(), RotationError> {
        if self.name.is_empty() {
            return Err(RotationError::InvalidConfiguration {
                reason: "resource name must not be empty".to_string(),
            });
        }
        if self.expiration_days <= 0.0 {
            return Err(RotationError::InvalidConfiguration {
                reason: format!("expiration_days must be positive, got {}", self.expiration_days),
            });
        }
        if self.expiration_overlap_days < 0.0 {
            return Err(RotationError::InvalidConfiguration {
                reason: format!(
                    "expiration_overlap_days must not be negative, got {}",
                    self.expiration_overlap_days
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_defaults_from_minimal_json() {
        let config: ResourceConfig = serde_json::from_str(
            r#"{"name":"s1","strategy_type":"manual/generic","store_name":"m"}"#,
        )
        .unwrap();

        assert_eq!(config.expiration_days, 90.0);
        assert_eq!(config.expiration_overlap_days, 0.0);
        assert_eq!(config.content_type, "text/plain");
        assert!(config.target_resource_id.is_none());
        assert!(config.database_user.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn test_database_user_defaults() {
        let config: DatabaseUserConfig = serde_json::from_str(
            r#"{"server_secret_name":"admin","hostname":"db.example.net"}"#,
        )
        .unwrap();

        assert_eq!(config.name_prefix, "u");
        assert!(config.roles.is_empty());
    }

    #[test]
    fn test_expiration_from() {
        let config: ResourceConfig = serde_json::from_str(
            r#"{"name":"s1","strategy_type":"manual/generic","store_name":"m"}"#,
        )
        .unwrap();

        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let expires = config.expiration_from(now);
        assert_eq!(expires, Utc.with_ymd_and_hms(2025, 8, 30, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_validate_rejects_bad_lifetimes() {
        let mut config: ResourceConfig = serde_json::from_str(
            r#"{"name":"s1","strategy_type":"manual/generic","store_name":"m"}"#,
        )
        .unwrap();

        config.expiration_days = 0.0;
        assert!(config.validate().is_err());

        config.expiration_days = 90.0;
        config.expiration_overlap_days = -1.0;
        assert!(config.validate().is_err());
    }
}
