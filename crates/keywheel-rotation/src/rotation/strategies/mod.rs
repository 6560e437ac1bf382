//! Built-in rotation strategies, one per credential kind

pub mod database_admin;
pub mod database_user;
pub mod manual;
pub mod storage_key;

pub use database_admin::{DatabaseAdminRotator, DATABASE_ADMIN_STRATEGY};
pub use database_user::{DatabaseUserRotator, DATABASE_USER_STRATEGY};
pub use manual::{ManualRotator, MANUAL_STRATEGY};
pub use storage_key::{StorageKeyRotator, STORAGE_KEY_STRATEGY};
