//! Common rotation orchestration
//!
//! Strategies implement [`RotationStrategy`]; the [`initialize`] and
//! [`rotate`] free functions carry the shared template — resolve the store,
//! consult eligibility, dispatch, assemble the verdict. Every expected
//! failure becomes a [`RotationResult`]; nothing expected escapes as an
//! error.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::core::{
    CancellationToken, Clock, OperationContext, ResourceConfig, Result, RotationError,
    RotationFlags, RotationResult,
};
use crate::store::SecretStore;

use super::eligibility::{initialization_candidacy, rotation_candidacy, Candidacy};

/// One credential kind's rotation behavior.
///
/// Strategy routines return `Ok(note)` on success (including a what-if
/// simulation) and a [`RotationError`] for every expected failure; the
/// orchestration converts both into verdicts. Within a routine the external
/// mutation happens-before the secret-store write, and the what-if early
/// return happens-before any external mutation.
#[async_trait]
pub trait RotationStrategy: Send + Sync {
    /// Tag this strategy registers under
    fn strategy_type(&self) -> &'static str;

    /// Rotate the credential and persist the new value
    async fn perform_rotation(
        &self,
        resource: &ResourceConfig,
        store: &dyn SecretStore,
        flags: &RotationFlags,
        token: &CancellationToken,
    ) -> Result<String>;

    /// First-time provisioning; by default the same as rotation without the
    /// prior-expiration check
    async fn perform_initialization(
        &self,
        resource: &ResourceConfig,
        store: &dyn SecretStore,
        flags: &RotationFlags,
        token: &CancellationToken,
    ) -> Result<String> {
        self.perform_rotation(resource, store, flags, token).await
    }
}

enum Operation {
    Initialize,
    Rotate,
}

impl Operation {
    fn as_str(&self) -> &'static str {
        match self {
            Operation::Initialize => "initialize",
            Operation::Rotate => "rotate",
        }
    }
}

/// Initialize a resource's secret via its strategy
pub async fn initialize(
    strategy: &dyn RotationStrategy,
    resource: &ResourceConfig,
    context: &OperationContext,
    flags: &RotationFlags,
    clock: &dyn Clock,
    token: &CancellationToken,
) -> RotationResult {
    run(
        Operation::Initialize,
        strategy,
        resource,
        context,
        flags,
        clock,
        token,
    )
    .await
}

/// Rotate a resource's secret via its strategy
pub async fn rotate(
    strategy: &dyn RotationStrategy,
    resource: &ResourceConfig,
    context: &OperationContext,
    flags: &RotationFlags,
    clock: &dyn Clock,
    token: &CancellationToken,
) -> RotationResult {
    run(
        Operation::Rotate,
        strategy,
        resource,
        context,
        flags,
        clock,
        token,
    )
    .await
}

async fn run(
    operation: Operation,
    strategy: &dyn RotationStrategy,
    resource: &ResourceConfig,
    context: &OperationContext,
    flags: &RotationFlags,
    clock: &dyn Clock,
    token: &CancellationToken,
) -> RotationResult {
    let Some(store) = context.store(&resource.store_name) else {
        let error = RotationError::StoreNotConfigured {
            store_name: resource.store_name.clone(),
        };
        warn!(
            resource = %resource.name,
            strategy = %strategy.strategy_type(),
            "{error}"
        );
        return RotationResult::not_rotated(&resource.name, error.to_string());
    };

    let candidacy = match operation {
        Operation::Initialize => {
            initialization_candidacy(resource, store.as_ref(), flags).await
        }
        Operation::Rotate => {
            rotation_candidacy(resource, store.as_ref(), flags, clock.now()).await
        }
    };

    match candidacy {
        Ok(Candidacy::Proceed) => {}
        Ok(Candidacy::Skip(reason)) => {
            debug!(
                resource = %resource.name,
                strategy = %strategy.strategy_type(),
                operation = operation.as_str(),
                "Skipping: {reason}"
            );
            return RotationResult::not_rotated(&resource.name, reason.to_string());
        }
        Err(error) => {
            warn!(
                resource = %resource.name,
                store = %resource.store_name,
                "Eligibility read failed: {error}"
            );
            return RotationResult::not_rotated(&resource.name, error.to_string());
        }
    }

    let outcome = match operation {
        Operation::Initialize => {
            strategy
                .perform_initialization(resource, store.as_ref(), flags, token)
                .await
        }
        Operation::Rotate => {
            strategy
                .perform_rotation(resource, store.as_ref(), flags, token)
                .await
        }
    };

    match outcome {
        Ok(notes) => {
            info!(
                resource = %resource.name,
                strategy = %strategy.strategy_type(),
                operation = operation.as_str(),
                what_if = flags.what_if,
                "{notes}"
            );
            RotationResult::rotated(&resource.name, notes)
        }
        Err(error) => {
            if error.needs_operator_action() {
                warn!(
                    resource = %resource.name,
                    strategy = %strategy.strategy_type(),
                    category = error.category(),
                    "Rotation left the store out of sync: {error}"
                );
            } else {
                warn!(
                    resource = %resource.name,
                    strategy = %strategy.strategy_type(),
                    category = error.category(),
                    "Rotation did not complete: {error}"
                );
            }
            RotationResult::not_rotated(&resource.name, error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FixedClock, SecretValue};
    use crate::store::memory::MemorySecretStore;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    struct StaticStrategy;

    #[async_trait]
    impl RotationStrategy for StaticStrategy {
        fn strategy_type(&self) -> &'static str {
            "test/static"
        }

        async fn perform_rotation(
            &self,
            resource: &ResourceConfig,
            store: &dyn SecretStore,
            _flags: &RotationFlags,
            _token: &CancellationToken,
        ) -> Result<String> {
            store
                .update_secret(&resource.name, SecretValue::new("fresh"), None, "text/plain")
                .await?;
            Ok("rotated".to_string())
        }
    }

    fn fixture() -> (ResourceConfig, OperationContext, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
        ));
        let store = Arc::new(MemorySecretStore::with_clock("m", clock.clone()));
        let context = OperationContext::new().with_store("m", store);
        let resource: ResourceConfig = serde_json::from_str(
            r#"{"name":"s1","strategy_type":"test/static","store_name":"m"}"#,
        )
        .unwrap();
        (resource, context, clock)
    }

    #[tokio::test]
    async fn test_missing_store_is_a_verdict() {
        let (mut resource, context, clock) = fixture();
        resource.store_name = "absent".to_string();

        let verdict = rotate(
            &StaticStrategy,
            &resource,
            &context,
            &RotationFlags::new(),
            clock.as_ref(),
            &CancellationToken::new(),
        )
        .await;

        assert!(!verdict.was_rotated);
        assert!(verdict.notes.contains("not configured"));
    }

    #[tokio::test]
    async fn test_rotate_absent_secret_skips() {
        let (resource, context, clock) = fixture();

        let verdict = rotate(
            &StaticStrategy,
            &resource,
            &context,
            &RotationFlags::new(),
            clock.as_ref(),
            &CancellationToken::new(),
        )
        .await;

        assert!(!verdict.was_rotated);
        assert!(verdict.notes.contains("not found"));
    }

    #[tokio::test]
    async fn test_initialize_then_rotate_forced() {
        let (resource, context, clock) = fixture();
        let token = CancellationToken::new();

        let verdict = initialize(
            &StaticStrategy,
            &resource,
            &context,
            &RotationFlags::new(),
            clock.as_ref(),
            &token,
        )
        .await;
        assert!(verdict.was_rotated);

        // A second initialize skips
        let verdict = initialize(
            &StaticStrategy,
            &resource,
            &context,
            &RotationFlags::new(),
            clock.as_ref(),
            &token,
        )
        .await;
        assert!(!verdict.was_rotated);
        assert!(verdict.notes.contains("already initialized"));

        // No expiration on the stored secret: rotation is never due...
        let verdict = rotate(
            &StaticStrategy,
            &resource,
            &context,
            &RotationFlags::new(),
            clock.as_ref(),
            &token,
        )
        .await;
        assert!(!verdict.was_rotated);
        assert!(verdict.notes.contains("not due"));

        // ...unless forced
        let verdict = rotate(
            &StaticStrategy,
            &resource,
            &context,
            &RotationFlags::new().force(),
            clock.as_ref(),
            &token,
        )
        .await;
        assert!(verdict.was_rotated);
    }
}
