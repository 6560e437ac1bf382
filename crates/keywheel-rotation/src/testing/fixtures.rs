//! Shared fixtures for rotation tests

use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;

use crate::core::{DatabaseUserConfig, FixedClock, ResourceConfig};

/// The instant most tests pin their clock to
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
}

/// A settable clock pinned at [`test_now`]
pub fn test_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(test_now()))
}

/// A resource with defaults for the given strategy and store
pub fn resource(name: &str, strategy_type: &str, store_name: &str) -> ResourceConfig {
    ResourceConfig {
        name: name.to_string(),
        strategy_type: strategy_type.to_string(),
        store_name: store_name.to_string(),
        expiration_days: 90.0,
        expiration_overlap_days: 0.0,
        content_type: "text/plain".to_string(),
        target_resource_id: None,
        database_user: None,
    }
}

/// A resource pointing at a backing cloud resource
pub fn cloud_resource(
    name: &str,
    strategy_type: &str,
    store_name: &str,
    target_resource_id: &str,
) -> ResourceConfig {
    let mut config = resource(name, strategy_type, store_name);
    config.target_resource_id = Some(target_resource_id.to_string());
    config
}

/// A resource configured for the database-user strategy
pub fn database_user_resource(
    name: &str,
    store_name: &str,
    server_secret_name: &str,
    hostname: &str,
    roles: &[&str],
) -> ResourceConfig {
    let mut config = resource(name, "database/postgresql/user", store_name);
    config.database_user = Some(DatabaseUserConfig {
        name_prefix: "u".to_string(),
        roles: roles.iter().map(|role| role.to_string()).collect(),
        server_secret_name: server_secret_name.to_string(),
        hostname: hostname.to_string(),
    });
    config
}
