//! Shared eligibility policy
//!
//! Decides, from a resource's configuration and the current state of its
//! secret, whether an initialization or rotation proceeds, is skipped, or is
//! forced. The eligibility read happens-before any other action a strategy
//! takes.

use chrono::{DateTime, Utc};

use crate::core::{ResourceConfig, RotationFlags, SecretInfo, StoreError};
use crate::store::SecretStore;

/// Outcome of an eligibility check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidacy {
    /// The operation should proceed
    Proceed,
    /// The operation should be skipped
    Skip(SkipReason),
}

/// Why an operation was skipped before any strategy work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Initialization requested but the secret already exists
    AlreadyInitialized,
    /// Rotation requested but the secret does not exist yet
    NotFound,
    /// The secret exists but has not entered its rotation window
    NotDue,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::AlreadyInitialized => {
                write!(f, "secret is already initialized; use force to overwrite")
            }
            SkipReason::NotFound => write!(f, "secret not found; initialization required"),
            SkipReason::NotDue => write!(f, "secret is not due for rotation"),
        }
    }
}

/// Whether a secret has entered its rotation window.
///
/// False when no expiration is set. Otherwise the days to expiry are
/// computed as a real number in 24-hour units and compared against the
/// overlap; exactly-equal rotates.
pub fn should_rotate(info: &SecretInfo, now: DateTime<Utc>, overlap_days: f64) -> bool {
    match info.days_to_expiry(now) {
        Some(days_to_expiry) => days_to_expiry <= overlap_days,
        None => false,
    }
}

/// Eligibility for `initialize`: skip when the secret already exists, unless
/// forced
pub async fn initialization_candidacy(
    resource: &ResourceConfig,
    store: &dyn SecretStore,
    flags: &RotationFlags,
) -> Result<Candidacy, StoreError> {
    let existing = store.get_secret(&resource.name).await?;

    if existing.is_some() && !flags.force {
        return Ok(Candidacy::Skip(SkipReason::AlreadyInitialized));
    }

    Ok(Candidacy::Proceed)
}

/// Eligibility for `rotate`: skip when absent; skip when present but not in
/// the rotation window, unless forced
pub async fn rotation_candidacy(
    resource: &ResourceConfig,
    store: &dyn SecretStore,
    flags: &RotationFlags,
    now: DateTime<Utc>,
) -> Result<Candidacy, StoreError> {
    let Some(info) = store.get_secret(&resource.name).await? else {
        return Ok(Candidacy::Skip(SkipReason::NotFound));
    };

    if !flags.force && !should_rotate(&info, now, resource.expiration_overlap_days) {
        return Ok(Candidacy::Skip(SkipReason::NotDue));
    }

    Ok(Candidacy::Proceed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Clock, FixedClock, SecretValue};
    use crate::store::memory::MemorySecretStore;
    use chrono::{Duration, TimeZone};
    use std::sync::Arc;

    fn resource(overlap_days: f64) -> ResourceConfig {
        let mut config: ResourceConfig = serde_json::from_str(
            r#"{"name":"s1","strategy_type":"manual/generic","store_name":"m"}"#,
        )
        .unwrap();
        config.expiration_overlap_days = overlap_days;
        config
    }

    fn info_expiring(expires_on: Option<DateTime<Utc>>) -> SecretInfo {
        let created = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        SecretInfo {
            id: "m/s1".into(),
            name: "s1".into(),
            content_type: "text/plain".into(),
            enabled: true,
            created_on: created,
            expires_on,
            updated_on: created,
            store_id: "m".into(),
            version: None,
        }
    }

    #[test]
    fn test_should_rotate_without_expiration() {
        let now = Utc.with_ymd_and_hms(2025, 4, 30, 0, 0, 0).unwrap();
        assert!(!should_rotate(&info_expiring(None), now, 0.0));
    }

    #[test]
    fn test_should_rotate_windows() {
        let expires = Utc.with_ymd_and_hms(2025, 5, 30, 0, 0, 0).unwrap();
        let info = info_expiring(Some(expires));

        // A month out with no overlap: not due
        let now = Utc.with_ymd_and_hms(2025, 4, 30, 0, 0, 0).unwrap();
        assert!(!should_rotate(&info, now, 0.0));

        // Same instant, 30-day overlap: due (tie rotates)
        assert!(should_rotate(&info, now, 30.0));

        // Past expiration: due
        let later = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        assert!(should_rotate(&info, later, 0.0));
    }

    #[test]
    fn test_should_rotate_exact_boundary() {
        let now = Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap();
        let info = info_expiring(Some(now + Duration::days(30)));
        assert!(should_rotate(&info, now, 30.0));
        assert!(!should_rotate(&info, now, 29.999));
    }

    #[tokio::test]
    async fn test_initialization_candidacy() {
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2025, 4, 30, 0, 0, 0).unwrap(),
        ));
        let store = MemorySecretStore::with_clock("m", clock);
        let config = resource(0.0);
        let flags = RotationFlags::new();

        // Empty store: proceed
        let candidacy = initialization_candidacy(&config, &store, &flags)
            .await
            .unwrap();
        assert_eq!(candidacy, Candidacy::Proceed);

        // Existing secret: skip
        store
            .update_secret("s1", SecretValue::new("v"), None, "text/plain")
            .await
            .unwrap();
        let candidacy = initialization_candidacy(&config, &store, &flags)
            .await
            .unwrap();
        assert_eq!(candidacy, Candidacy::Skip(SkipReason::AlreadyInitialized));

        // Force overrides
        let candidacy = initialization_candidacy(&config, &store, &RotationFlags::new().force())
            .await
            .unwrap();
        assert_eq!(candidacy, Candidacy::Proceed);
    }

    #[tokio::test]
    async fn test_rotation_candidacy_absent_is_not_found_even_forced() {
        let store = MemorySecretStore::new("m");
        let config = resource(0.0);
        let now = Utc.with_ymd_and_hms(2025, 4, 30, 0, 0, 0).unwrap();

        let candidacy = rotation_candidacy(&config, &store, &RotationFlags::new().force(), now)
            .await
            .unwrap();
        assert_eq!(candidacy, Candidacy::Skip(SkipReason::NotFound));
    }

    #[tokio::test]
    async fn test_rotation_candidacy_not_due_and_force() {
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2025, 4, 30, 0, 0, 0).unwrap(),
        ));
        let store = MemorySecretStore::with_clock("m", clock.clone());
        let config = resource(0.0);
        let expires = Utc.with_ymd_and_hms(2025, 5, 30, 0, 0, 0).unwrap();

        store
            .update_secret("s1", SecretValue::new("old"), Some(expires), "text/plain")
            .await
            .unwrap();

        let candidacy = rotation_candidacy(&config, &store, &RotationFlags::new(), clock.now())
            .await
            .unwrap();
        assert_eq!(candidacy, Candidacy::Skip(SkipReason::NotDue));

        let candidacy =
            rotation_candidacy(&config, &store, &RotationFlags::new().force(), clock.now())
                .await
                .unwrap();
        assert_eq!(candidacy, Candidacy::Proceed);
    }

    #[test]
    fn test_skip_reason_notes() {
        assert!(SkipReason::NotFound.to_string().contains("not found"));
        assert!(SkipReason::NotDue.to_string().contains("not due"));
        assert!(SkipReason::AlreadyInitialized
            .to_string()
            .contains("already initialized"));
    }
}
