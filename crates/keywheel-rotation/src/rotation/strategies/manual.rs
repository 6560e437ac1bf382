//! Manual/generic strategy: persist an operator-supplied value

use async_trait::async_trait;
use std::sync::Arc;

use crate::core::{
    CancellationToken, Clock, ResourceConfig, Result, RotationError, RotationFlags, SecretValue,
};
use crate::rotation::rotator::RotationStrategy;
use crate::store::SecretStore;

/// Strategy tag for the manual rotator
pub const MANUAL_STRATEGY: &str = "manual/generic";

/// Writes the operator-supplied value with a fresh expiration.
///
/// Performs no external I/O; initialization and rotation are identical. An
/// empty supplied value is accepted and stored as-is.
pub struct ManualRotator {
    clock: Arc<dyn Clock>,
}

impl ManualRotator {
    /// Create the strategy with an injected clock
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

#[async_trait]
impl RotationStrategy for ManualRotator {
    fn strategy_type(&self) -> &'static str {
        MANUAL_STRATEGY
    }

    async fn perform_rotation(
        &self,
        resource: &ResourceConfig,
        store: &dyn SecretStore,
        flags: &RotationFlags,
        token: &CancellationToken,
    ) -> Result<String> {
        let value = flags
            .secret_value
            .clone()
            .unwrap_or_else(|| SecretValue::new(""));

        if flags.what_if {
            return Ok(format!(
                "Would have stored the supplied value for '{}'",
                resource.name
            ));
        }

        if token.is_cancelled() {
            return Err(RotationError::Cancelled {
                name: resource.name.clone(),
            });
        }

        let expires_on = resource.expiration_from(self.clock.now());
        store
            .update_secret(
                &resource.name,
                value,
                Some(expires_on),
                &resource.content_type,
            )
            .await?;

        Ok(format!("Stored the supplied value; expires {expires_on}"))
    }
}
