use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata describing one stored secret.
///
/// Returned by store reads and writes; never carries the secret value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretInfo {
    /// Store-assigned identifier of this secret
    pub id: String,

    /// Secret name, unique within its store
    pub name: String,

    /// MIME label stored alongside the value
    pub content_type: String,

    /// Whether the secret is usable
    pub enabled: bool,

    /// When the secret was first written
    pub created_on: DateTime<Utc>,

    /// When the secret expires, if an expiration is set
    pub expires_on: Option<DateTime<Utc>>,

    /// When the secret was last written
    pub updated_on: DateTime<Utc>,

    /// Identifier of the store holding this secret
    pub store_id: String,

    /// Store-assigned version of the current value
    pub version: Option<String>,
}

impl SecretInfo {
    /// Days until expiration as a real number in 24-hour units; `None` when
    /// no expiration is set. Negative once the secret has expired.
    pub fn days_to_expiry(&self, now: DateTime<Utc>) -> Option<f64> {
        self.expires_on
            .map(|expires_on| (expires_on - now).num_milliseconds() as f64 / 86_400_000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn info(expires_on: Option<DateTime<Utc>>) -> SecretInfo {
        let created = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        SecretInfo {
            id: "mem/s1".into(),
            name: "s1".into(),
            content_type: "text/plain".into(),
            enabled: true,
            created_on: created,
            expires_on,
            updated_on: created,
            store_id: "mem".into(),
            version: None,
        }
    }

    #[test]
    fn test_days_to_expiry_none_without_expiration() {
        let now = Utc.with_ymd_and_hms(2025, 4, 30, 0, 0, 0).unwrap();
        assert_eq!(info(None).days_to_expiry(now), None);
    }

    #[test]
    fn test_days_to_expiry_fractional() {
        let now = Utc.with_ymd_and_hms(2025, 4, 30, 0, 0, 0).unwrap();
        let expires = Utc.with_ymd_and_hms(2025, 5, 30, 12, 0, 0).unwrap();
        let days = info(Some(expires)).days_to_expiry(now).unwrap();
        assert!((days - 30.5).abs() < 1e-9);
    }

    #[test]
    fn test_days_to_expiry_negative_after_expiry() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let expires = Utc.with_ymd_and_hms(2025, 5, 30, 0, 0, 0).unwrap();
        let days = info(Some(expires)).days_to_expiry(now).unwrap();
        assert!(days < 0.0);
    }
}
