//! Core types, errors, and primitives

mod cancel;
mod config;
mod context;
mod error;
mod payload;
mod result;
mod secret;
mod time;
mod value;

pub use cancel::CancellationToken;
pub use config::{DatabaseUserConfig, ResourceConfig};
pub use context::{OperationContext, RotationFlags};
pub use error::{CloudError, DatabaseError, Result, RotationError, StoreError};
pub use payload::{
    DatabaseCredential, KeySlot, StorageKeyCredential, CONTENT_TYPE_JSON, CONTENT_TYPE_TEXT,
};
pub use result::RotationResult;
pub use secret::SecretInfo;
pub use time::{days_duration, Clock, FixedClock, SystemClock};
pub use value::SecretValue;
