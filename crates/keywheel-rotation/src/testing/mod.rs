//! Test doubles and fixtures
//!
//! Mocks mirror the production adapters with call counters and one-shot
//! failure injection so tests can drive every verdict path.

pub mod fixtures;
pub mod mocks;

pub use fixtures::{cloud_resource, database_user_resource, resource, test_clock, test_now};
pub use mocks::{MockCloudClient, MockDatabaseClient, MockSecretStore};
